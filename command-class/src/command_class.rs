//! 命令类（Command Class）
//!
//! 由声明（`Declaration`：名称 + 默认依赖 + 输入名称 + 行为体）构造可复用的
//! `CommandClass`；每次实例化得到一个持有合并依赖的 `Command`，
//! 每次调用再创建一个新的 `Call` 交由行为体执行。
//!
//! 典型用法：
//! ```
//! use command_class::{Call, CommandClass, CommandError, Declaration, Dependencies, FnBehavior, Inputs};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), CommandError> {
//! let greet = CommandClass::new(
//!     Declaration::builder()
//!         .name("greet")
//!         .dependencies(Dependencies::new().with("greeting", String::from("hello")))
//!         .inputs(["name"])
//!         .behavior(FnBehavior::new(|call: Call| async move {
//!             let greeting = call.dependency::<String>("greeting")?;
//!             let name = call.input_str("name")?;
//!             Ok::<_, CommandError>(format!("{greeting}, {name}"))
//!         }))
//!         .build(),
//! )?;
//!
//! let cmd = greet.instantiate(Dependencies::new().with("greeting", String::from("hi")))?;
//! assert_eq!(cmd.call(Inputs::new().with("name", "John")).await?, "hi, John");
//! # Ok(())
//! # }
//! ```
use crate::{
    behavior::Behavior,
    call::Call,
    dependency::Dependencies,
    error::{CommandError, CommandResult},
    input::{InputNames, Inputs},
};
use bon::Builder;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tracing::{Instrument, debug, debug_span, warn};

/// 命令类的声明式描述
#[derive(Builder)]
pub struct Declaration<B> {
    /// 命令的稳定名称（用于日志与错误信息）
    #[builder(into)]
    name: String,
    /// 默认依赖，可在实例化时按名称覆盖
    #[builder(default)]
    dependencies: Dependencies,
    /// 每次调用都必须提供的输入名称
    #[builder(default, into)]
    inputs: InputNames,
    behavior: B,
}

struct Shared<B> {
    name: Arc<str>,
    defaults: Dependencies,
    inputs: InputNames,
    behavior: B,
}

/// 可复用的命令类型，通常在服务初始化时构造一次
pub struct CommandClass<B> {
    shared: Arc<Shared<B>>,
}

impl<B> Clone for CommandClass<B> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<B> fmt::Debug for CommandClass<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandClass")
            .field("name", &self.shared.name)
            .field("dependencies", &self.shared.defaults)
            .field("inputs", &self.shared.inputs)
            .finish_non_exhaustive()
    }
}

impl<B> CommandClass<B>
where
    B: Behavior,
{
    /// 由声明构造命令类
    ///
    /// 仅校验名称唯一：输入名称不可重复，且不可与依赖名称重叠。
    pub fn new(declaration: Declaration<B>) -> CommandResult<Self> {
        let Declaration {
            name,
            dependencies,
            inputs,
            behavior,
        } = declaration;

        let mut seen = BTreeSet::new();
        for input in inputs.iter() {
            if !seen.insert(input) || dependencies.contains(input) {
                return Err(CommandError::DuplicateName {
                    name: input.to_string(),
                });
            }
        }

        debug!(
            command = %name,
            dependencies = ?dependencies.names().collect::<Vec<_>>(),
            inputs = ?inputs.iter().collect::<Vec<_>>(),
            "command class defined"
        );

        Ok(Self {
            shared: Arc::new(Shared {
                name: Arc::from(name),
                defaults: dependencies,
                inputs,
                behavior,
            }),
        })
    }

    /// 以覆盖依赖创建命令实例；未覆盖的依赖使用默认值
    pub fn instantiate(&self, overrides: Dependencies) -> CommandResult<Command<B>> {
        let dependencies = self
            .shared
            .defaults
            .merged(&self.shared.name, overrides)
            .inspect_err(|err| {
                warn!(command = %self.shared.name, error = %err, "rejected dependency override")
            })?;

        Ok(Command {
            class: self.clone(),
            dependencies,
        })
    }

    /// 使用全部默认依赖创建命令实例
    pub fn instantiate_default(&self) -> Command<B> {
        Command {
            class: self.clone(),
            dependencies: self.shared.defaults.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    pub fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.shared.defaults.names()
    }

    pub fn input_names(&self) -> &InputNames {
        &self.shared.inputs
    }
}

/// 命令实例：持有合并后的依赖，对输入无状态
pub struct Command<B> {
    class: CommandClass<B>,
    dependencies: Dependencies,
}

impl<B> Clone for Command<B> {
    fn clone(&self) -> Self {
        Self {
            class: self.class.clone(),
            dependencies: self.dependencies.clone(),
        }
    }
}

impl<B> fmt::Debug for Command<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.class.shared.name)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

impl<B> Command<B>
where
    B: Behavior,
{
    /// 以给定输入调用命令
    ///
    /// 1. 校验输入名称与声明完全一致（缺失或多余均为使用错误）；
    /// 2. 创建本次调用的 `Call`；
    /// 3. 执行行为体，原样返回其结果或错误。
    pub async fn call(&self, inputs: Inputs) -> Result<B::Output, B::Error> {
        let call = self.prepare(inputs)?;
        let span = debug_span!("command", command = %call.command(), call_id = %call.id());

        call.run(&self.class.shared.behavior).instrument(span).await
    }

    /// 以结构体字段作为输入调用命令
    pub async fn call_with<T>(&self, inputs: &T) -> Result<B::Output, B::Error>
    where
        T: Serialize + ?Sized,
    {
        let inputs = Inputs::from_serialize(inputs)?;
        self.call(inputs).await
    }

    pub fn name(&self) -> &str {
        self.class.name()
    }

    pub fn dependencies(&self) -> &Dependencies {
        &self.dependencies
    }

    fn prepare(&self, inputs: Inputs) -> CommandResult<Call> {
        let shared = &self.class.shared;

        let missing = shared.inputs.iter().find(|name| !inputs.contains(name));
        if let Some(name) = missing {
            warn!(command = %shared.name, input = name, "missing input");
            return Err(CommandError::MissingInput {
                command: shared.name.to_string(),
                name: name.to_string(),
            });
        }

        let unexpected = inputs.names().find(|name| !shared.inputs.contains(name));
        if let Some(name) = unexpected {
            warn!(command = %shared.name, input = name, "unexpected input");
            return Err(CommandError::UnexpectedInput {
                command: shared.name.to_string(),
                name: name.to_string(),
            });
        }

        Ok(Call::new(
            Arc::clone(&shared.name),
            self.dependencies.clone(),
            inputs,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::FnBehavior;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, thiserror::Error)]
    enum EchoError {
        #[error(transparent)]
        Command(#[from] CommandError),
    }

    struct Echo;

    #[async_trait::async_trait]
    impl Behavior for Echo {
        type Output = (String, String);
        type Error = EchoError;

        async fn call(&self, call: Call) -> Result<Self::Output, EchoError> {
            let prefix = call.dependency::<String>("prefix")?.clone();
            let text = call.input::<String>("text")?;
            Ok((prefix, text))
        }
    }

    fn echo_class() -> CommandClass<Echo> {
        CommandClass::new(
            Declaration::builder()
                .name("echo")
                .dependencies(Dependencies::new().with("prefix", String::from(">")))
                .inputs(["text"])
                .behavior(Echo)
                .build(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn default_instance_uses_declared_dependencies() {
        let cmd = echo_class().instantiate_default();
        let out = cmd.call(Inputs::new().with("text", "hi")).await.unwrap();
        assert_eq!(out, (">".to_string(), "hi".to_string()));
    }

    #[tokio::test]
    async fn overrides_replace_defaults() {
        let cmd = echo_class()
            .instantiate(Dependencies::new().with("prefix", String::from("$")))
            .unwrap();
        let out = cmd.call(Inputs::new().with("text", "hi")).await.unwrap();
        assert_eq!(out.0, "$");
    }

    #[test]
    fn unknown_override_is_rejected() {
        let err = echo_class()
            .instantiate(Dependencies::new().with("prefx", String::from("$")))
            .unwrap_err();
        assert!(matches!(err, CommandError::UnknownDependency { .. }));
    }

    #[tokio::test]
    async fn missing_input_is_a_usage_error() {
        let cmd = echo_class().instantiate_default();
        let err = cmd.call(Inputs::new()).await.unwrap_err();
        match err {
            EchoError::Command(CommandError::MissingInput { command, name }) => {
                assert_eq!(command, "echo");
                assert_eq!(name, "text");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn unexpected_input_is_a_usage_error() {
        let cmd = echo_class().instantiate_default();
        let err = cmd
            .call(Inputs::new().with("text", "hi").with("loud", true))
            .await
            .unwrap_err();
        match err {
            EchoError::Command(CommandError::UnexpectedInput { name, .. }) => {
                assert_eq!(name, "loud")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn call_with_struct_inputs() {
        #[derive(Serialize)]
        struct EchoInput {
            text: String,
        }

        let cmd = echo_class().instantiate_default();
        let out = cmd
            .call_with(&EchoInput { text: "hey".into() })
            .await
            .unwrap();
        assert_eq!(out.1, "hey");
    }

    #[test]
    fn duplicate_input_names_are_rejected() {
        let err = CommandClass::new(
            Declaration::builder()
                .name("echo")
                .inputs(["text", "text"])
                .behavior(Echo)
                .build(),
        )
        .unwrap_err();
        match err {
            CommandError::DuplicateName { name } => assert_eq!(name, "text"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn inputs_and_dependencies_must_be_disjoint() {
        let err = CommandClass::new(
            Declaration::builder()
                .name("echo")
                .dependencies(Dependencies::new().with("text", 1_u8))
                .inputs(["text"])
                .behavior(Echo)
                .build(),
        )
        .unwrap_err();
        assert!(matches!(err, CommandError::DuplicateName { .. }));
    }

    #[test]
    fn exposes_declaration() {
        let class = echo_class();
        assert_eq!(class.name(), "echo");
        assert_eq!(class.dependency_names().collect::<Vec<_>>(), vec!["prefix"]);
        assert_eq!(class.input_names().iter().collect::<Vec<_>>(), vec!["text"]);
        let cmd = class.instantiate_default();
        assert_eq!(cmd.name(), "echo");
        assert!(cmd.dependencies().contains("prefix"));
    }

    // 每次调用都创建新的 Call，且行为体恰好执行一次
    #[tokio::test]
    async fn each_call_runs_behavior_once_with_a_fresh_record() {
        let runs = Arc::new(AtomicUsize::new(0));
        let ids = Arc::new(std::sync::Mutex::new(Vec::new()));

        let class = CommandClass::new(
            Declaration::builder()
                .name("count")
                .behavior(FnBehavior::new({
                    let runs = runs.clone();
                    let ids = ids.clone();
                    move |call: Call| {
                        let runs = runs.clone();
                        let ids = ids.clone();
                        async move {
                            runs.fetch_add(1, Ordering::SeqCst);
                            ids.lock().unwrap().push(call.id());
                            Ok::<_, CommandError>(())
                        }
                    }
                }))
                .build(),
        )
        .unwrap();

        let cmd = class.instantiate_default();
        cmd.call(Inputs::new()).await.unwrap();
        cmd.call(Inputs::new()).await.unwrap();

        assert_eq!(runs.load(Ordering::SeqCst), 2);
        let ids = ids.lock().unwrap();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
    }
}
