use async_trait::async_trait;
use command_class::{Call, CommandClass, CommandError, Declaration, Dependencies, FnBehavior, Inputs};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[async_trait]
trait UserRepo: Send + Sync {
    async fn exists(&self, email: &str) -> bool;
    async fn insert(&self, email: &str);
}

#[derive(Default)]
struct InMemoryUserRepo {
    emails: Mutex<HashSet<String>>,
}

#[async_trait]
impl UserRepo for InMemoryUserRepo {
    async fn exists(&self, email: &str) -> bool {
        self.emails.lock().unwrap().contains(email)
    }

    async fn insert(&self, email: &str) {
        self.emails.lock().unwrap().insert(email.to_string());
    }
}

// 闭包形式的命令无法在自身内部定义错误类型，只能放在外部
#[derive(Debug, thiserror::Error)]
enum SignupError {
    #[error("invalid email: {0}")]
    InvalidEmail(String),
    #[error("email already exists: {0}")]
    EmailAlreadyExists(String),
    #[error(transparent)]
    Command(#[from] CommandError),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let repo: Arc<dyn UserRepo> = Arc::new(InMemoryUserRepo::default());

    let signup = CommandClass::new(
        Declaration::builder()
            .name("signup")
            .dependencies(Dependencies::new().with("user_repo", repo.clone()))
            .inputs(["email"])
            .behavior(FnBehavior::new(|call: Call| async move {
                let email = call.input::<String>("email")?;
                if !email.contains('@') {
                    return Err(SignupError::InvalidEmail(email));
                }

                let user_repo = call.dependency::<Arc<dyn UserRepo>>("user_repo")?;
                if user_repo.exists(&email).await {
                    return Err(SignupError::EmailAlreadyExists(email));
                }
                user_repo.insert(&email).await;
                Ok::<_, SignupError>(email)
            }))
            .build(),
    )?
    .instantiate_default();

    for email in ["john@gmail.com", "john@gmail.com", "bad_email"] {
        match signup.call(Inputs::new().with("email", email)).await {
            Ok(email) => info!(%email, "signed up"),
            Err(err) => info!(error = %err, "signup rejected"),
        }
    }

    Ok(())
}
