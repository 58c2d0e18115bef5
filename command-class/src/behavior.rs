//! 行为体（Behavior）
//!
//! 命令类的业务逻辑由集成方提供：
//! - 为自定义类型实现 [`Behavior`]，可在同一模块内定义专属错误类型；
//! - 或以异步闭包构造 [`FnBehavior`]，适合一次性的轻量命令。
//!
//! 行为体内部的校验/持久化/通知顺序完全由实现方决定，库不做任何编排。
//!
use crate::{call::Call, error::CommandError};
use async_trait::async_trait;
use std::error::Error;
use std::future::Future;
use std::marker::PhantomData;

/// 命令的行为体
///
/// - `Output`：调用成功时的返回值；
/// - `Error`：业务错误类型，需能吸收 [`CommandError`]（名称/类型不匹配等使用错误）。
#[async_trait]
pub trait Behavior: Send + Sync + 'static {
    type Output: Send + 'static;
    type Error: Error + From<CommandError> + Send + Sync + 'static;

    /// 执行一次调用；`call` 在执行后即被丢弃
    async fn call(&self, call: Call) -> Result<Self::Output, Self::Error>;
}

/// 以异步闭包作为行为体
///
/// ```
/// use command_class::behavior::FnBehavior;
/// use command_class::call::Call;
/// use command_class::error::CommandError;
///
/// let _echo = FnBehavior::new(|call: Call| async move {
///     let name = call.input::<String>("name")?;
///     Ok::<_, CommandError>(name)
/// });
/// ```
pub struct FnBehavior<F, Fut> {
    f: F,
    _marker: PhantomData<fn() -> Fut>,
}

impl<F, Fut> FnBehavior<F, Fut>
where
    F: Fn(Call) -> Fut,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<F, Fut, O, E> Behavior for FnBehavior<F, Fut>
where
    F: Fn(Call) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, E>> + Send + 'static,
    O: Send + 'static,
    E: Error + From<CommandError> + Send + Sync + 'static,
{
    type Output = O;
    type Error = E;

    async fn call(&self, call: Call) -> Result<O, E> {
        (self.f)(call).await
    }
}
