use async_trait::async_trait;
use command_class::{Behavior, Call, CommandClass, CommandError, Declaration, Dependencies, Inputs};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
struct User {
    name: String,
    email: String,
}

#[async_trait]
trait UserRepo: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Option<User>;
    async fn insert(&self, name: &str, email: &str, password: &str);
}

#[async_trait]
trait EmailService: Send + Sync {
    async fn send_signup_confirmation(&self, name: &str, email: &str);
}

#[derive(Default)]
struct InMemoryUserRepo {
    users: Mutex<HashMap<String, User>>,
}

#[async_trait]
impl UserRepo for InMemoryUserRepo {
    async fn find_by_email(&self, email: &str) -> Option<User> {
        self.users.lock().unwrap().get(email).cloned()
    }

    async fn insert(&self, name: &str, email: &str, _password: &str) {
        let user = User {
            name: name.to_string(),
            email: email.to_string(),
        };
        self.users.lock().unwrap().insert(email.to_string(), user);
    }
}

struct LogEmailService;

#[async_trait]
impl EmailService for LogEmailService {
    async fn send_signup_confirmation(&self, name: &str, email: &str) {
        info!(name, email, "signup confirmation sent");
    }
}

// 命令类型与其专属错误放在同一模块内
mod create_user {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    pub enum Error {
        #[error("invalid name")]
        InvalidName,
        #[error("invalid email")]
        InvalidEmail,
        #[error("invalid password")]
        InvalidPassword,
        #[error("email already exists")]
        EmailAlreadyExists,
        #[error(transparent)]
        Command(#[from] CommandError),
    }

    pub struct CreateUser;

    impl CreateUser {
        pub fn class() -> Result<CommandClass<Self>, CommandError> {
            CommandClass::new(
                Declaration::builder()
                    .name("create_user")
                    .dependencies(
                        Dependencies::new()
                            .with(
                                "user_repo",
                                Arc::new(InMemoryUserRepo::default()) as Arc<dyn UserRepo>,
                            )
                            .with(
                                "email_service",
                                Arc::new(LogEmailService) as Arc<dyn EmailService>,
                            ),
                    )
                    .inputs(["name", "email", "password"])
                    .behavior(CreateUser)
                    .build(),
            )
        }
    }

    #[async_trait]
    impl Behavior for CreateUser {
        type Output = ();
        type Error = Error;

        async fn call(&self, call: Call) -> Result<(), Error> {
            let name = call.input_str("name")?;
            let email = call.input_str("email")?;
            let password = call.input_str("password")?;

            validate(name, email, password)?;

            let user_repo = call.dependency::<Arc<dyn UserRepo>>("user_repo")?;
            if user_repo.find_by_email(email).await.is_some() {
                return Err(Error::EmailAlreadyExists);
            }
            user_repo.insert(name, email, password).await;

            call.dependency::<Arc<dyn EmailService>>("email_service")?
                .send_signup_confirmation(name, email)
                .await;
            Ok(())
        }
    }

    fn validate(name: &str, email: &str, password: &str) -> Result<(), Error> {
        if name.chars().count() <= 1 {
            return Err(Error::InvalidName);
        }
        if !email.contains('@') {
            return Err(Error::InvalidEmail);
        }
        if password.chars().count() <= 5 {
            return Err(Error::InvalidPassword);
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let class = create_user::CreateUser::class()?;

    // 每个实例持有自己的仓储
    let repo: Arc<dyn UserRepo> = Arc::new(InMemoryUserRepo::default());
    let signup = class.instantiate(Dependencies::new().with("user_repo", repo.clone()))?;

    let john = Inputs::new()
        .with("name", "John")
        .with("email", "john@gmail.com")
        .with("password", "secret");

    signup.call(john.clone()).await?;
    if let Some(user) = repo.find_by_email("john@gmail.com").await {
        info!(name = %user.name, email = %user.email, "user created");
    }

    // 重复注册 -> EmailAlreadyExists
    match signup.call(john).await {
        Err(create_user::Error::EmailAlreadyExists) => {
            info!("duplicate signup rejected as expected")
        }
        other => anyhow::bail!("unexpected result: {other:?}"),
    }

    // 输入校验失败
    let short_name = Inputs::new()
        .with("name", "x")
        .with("email", "x@y.z")
        .with("password", "secret");
    if let Err(err) = signup.call(short_name).await {
        info!(error = %err, "invalid signup rejected");
    }

    Ok(())
}
