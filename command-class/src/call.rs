//! 调用记录（Call）
//!
//! 每次 `Command::call` 都会创建一个新的 `Call`：持有合并后的依赖快照与本次输入，
//! 随后被移交给行为体执行，执行结束即被丢弃，不会被复用或共享。
//!
use crate::{
    behavior::Behavior,
    dependency::Dependencies,
    error::{CommandError, CommandResult},
    input::Inputs,
};
use serde::de::DeserializeOwned;
use std::any::Any;
use std::sync::Arc;
use tracing::debug;
use ulid::Ulid;

/// 单次调用的不可变记录
///
/// 所有字段仅提供只读访问；行为体按名称读取依赖与输入。
/// 不实现 `Clone`：记录只能被执行一次。
///
/// ```compile_fail
/// fn assert_clone<T: Clone>() {}
/// assert_clone::<command_class::Call>();
/// ```
#[derive(Debug)]
pub struct Call {
    id: Ulid,
    command: Arc<str>,
    dependencies: Dependencies,
    inputs: Inputs,
}

impl Call {
    pub(crate) fn new(command: Arc<str>, dependencies: Dependencies, inputs: Inputs) -> Self {
        Self {
            id: Ulid::new(),
            command,
            dependencies,
            inputs,
        }
    }

    /// 本次调用的唯一标识
    pub fn id(&self) -> Ulid {
        self.id
    }

    /// 所属命令名称
    pub fn command(&self) -> &str {
        &self.command
    }

    /// 按名称与类型读取依赖
    ///
    /// 以 trait 对象注入的依赖需按其存入类型读取，例如 `call.dependency::<Arc<dyn UserRepo>>("user_repo")`。
    pub fn dependency<T>(&self, name: &str) -> CommandResult<&T>
    where
        T: Any,
    {
        self.dependencies
            .get(name)
            .ok_or_else(|| CommandError::UnknownDependency {
                command: self.command.to_string(),
                name: name.to_string(),
            })?
            .downcast_ref::<T>(name)
    }

    /// 按名称读取输入并反序列化为 `T`
    pub fn input<T>(&self, name: &str) -> CommandResult<T>
    where
        T: DeserializeOwned,
    {
        let value = self.raw_input(name)?;
        serde_json::from_value(value.clone()).map_err(|e| CommandError::InputType {
            name: name.to_string(),
            reason: e.to_string(),
        })
    }

    /// 按名称读取字符串输入（零拷贝）
    pub fn input_str(&self, name: &str) -> CommandResult<&str> {
        self.raw_input(name)?
            .as_str()
            .ok_or_else(|| CommandError::InputType {
                name: name.to_string(),
                reason: "expected a string".to_string(),
            })
    }

    /// 将全部输入整体反序列化为结构体
    pub fn inputs_as<T>(&self) -> CommandResult<T>
    where
        T: DeserializeOwned,
    {
        serde_json::from_value(self.inputs.to_object()).map_err(|e| CommandError::InvalidInputs {
            reason: e.to_string(),
        })
    }

    pub fn dependencies(&self) -> &Dependencies {
        &self.dependencies
    }

    pub fn inputs(&self) -> &Inputs {
        &self.inputs
    }

    /// 执行行为体；`Call` 在此被消耗，无法再次执行
    pub(crate) async fn run<B>(self, behavior: &B) -> Result<B::Output, B::Error>
    where
        B: Behavior,
    {
        debug!("invocation started");
        let out = behavior.call(self).await;
        match &out {
            Ok(_) => debug!("invocation finished"),
            Err(err) => debug!(error = %err, "invocation failed"),
        }
        out
    }

    fn raw_input(&self, name: &str) -> CommandResult<&serde_json::Value> {
        self.inputs
            .get(name)
            .ok_or_else(|| CommandError::UnknownInput {
                command: self.command.to_string(),
                name: name.to_string(),
            })
    }
}
