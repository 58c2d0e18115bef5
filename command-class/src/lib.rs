//! 命令类（command-class）
//!
//! 以声明式描述构造“命令对象”：
//! - 具名依赖（`dependency`）：每个依赖有默认实例，可在实例化时覆盖；
//! - 具名输入（`input`）：每次调用都必须完整提供；
//! - 行为体（`behavior`）：集成方提供的业务逻辑，通过 `Call` 按名称读取依赖与输入。
//!
//! 流程：启动时构造一次 `CommandClass` → 按需 `instantiate` 出 `Command` →
//! 每次 `call` 创建新的 `Call` 并交给行为体执行，结果或错误原样返回。
//!
//! 本 crate 不做依赖注入容器、校验框架或命令总线，只负责绑定与转发。
//!
pub mod behavior;
pub mod call;
pub mod command_class;
pub mod dependency;
pub mod error;
pub mod input;

pub use behavior::{Behavior, FnBehavior};
pub use call::Call;
pub use command_class::{Command, CommandClass, Declaration};
pub use dependency::{Dependencies, Dependency};
pub use error::{CommandError, CommandResult};
pub use input::{InputNames, Inputs};
