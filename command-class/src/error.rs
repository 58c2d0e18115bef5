//! 命令类统一错误定义
//!
//! 仅覆盖“库的使用错误”：声明冲突、依赖/输入名称不匹配、类型不匹配等。
//! 行为体（`Behavior`）内部产生的业务错误由集成方自行定义，
//! 并通过 `From<CommandError>` 吸收本类型，原样向调用方传播。
//!
use thiserror::Error;

/// 统一错误类型（使用错误最小集）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CommandError {
    // --- 声明 ---
    #[error("duplicate name: {name}")]
    DuplicateName { name: String },

    // --- 依赖 ---
    #[error("unknown dependency: command={command}, name={name}")]
    UnknownDependency { command: String, name: String },
    #[error("dependency type mismatch: name={name}, expected={expected}, found={found}")]
    DependencyType {
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    // --- 输入 ---
    #[error("missing input: command={command}, name={name}")]
    MissingInput { command: String, name: String },
    #[error("unexpected input: command={command}, name={name}")]
    UnexpectedInput { command: String, name: String },
    #[error("unknown input: command={command}, name={name}")]
    UnknownInput { command: String, name: String },
    #[error("input type mismatch: name={name}, reason={reason}")]
    InputType { name: String, reason: String },
    #[error("invalid inputs: {reason}")]
    InvalidInputs { reason: String },

    // --- 序列化 ---
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },
}

/// 统一 Result 类型别名
pub type CommandResult<T> = Result<T, CommandError>;
