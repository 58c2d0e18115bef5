//! 依赖集合（Dependency Set）
//!
//! 以名称为键保存命令所需的协作者（仓储、通知服务等）。
//! 值被类型擦除为 `Arc<dyn Any + Send + Sync>`，在使用点按具体类型取回；
//! 克隆集合只复制 `Arc`，协作者本身在实例之间共享。
//!
use crate::error::{CommandError, CommandResult};
use std::any::{Any, type_name};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// 单个依赖：类型擦除后的共享实例
#[derive(Clone)]
pub struct Dependency {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Dependency {
    pub fn new<T>(value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Self {
            value: Arc::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// 存入时的具体类型名（用于诊断）
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// 按具体类型取回引用，类型不符时返回 `DependencyType`
    pub fn downcast_ref<T>(&self, name: &str) -> CommandResult<&T>
    where
        T: Any,
    {
        self.value
            .downcast_ref::<T>()
            .ok_or_else(|| CommandError::DependencyType {
                name: name.to_string(),
                expected: type_name::<T>(),
                found: self.type_name,
            })
    }
}

impl fmt::Debug for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependency")
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// 名称 → 依赖 的映射
///
/// 既用于命令类声明时的默认值，也用于实例化时的覆盖值。
///
/// ```
/// use command_class::dependency::Dependencies;
///
/// let deps = Dependencies::new().with("greeting", String::from("hello"));
/// assert!(deps.contains("greeting"));
/// let greeting: &String = deps.get("greeting").unwrap().downcast_ref("greeting").unwrap();
/// assert_eq!(greeting, "hello");
/// ```
#[derive(Clone, Debug, Default)]
pub struct Dependencies {
    entries: BTreeMap<String, Dependency>,
}

impl Dependencies {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加（或替换）一个依赖，链式调用
    pub fn with<T>(mut self, name: impl Into<String>, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        self.insert(name, value);
        self
    }

    /// 插入（或替换）一个依赖，返回被替换的旧值
    pub fn insert<T>(&mut self, name: impl Into<String>, value: T) -> Option<Dependency>
    where
        T: Any + Send + Sync,
    {
        self.entries.insert(name.into(), Dependency::new(value))
    }

    pub fn get(&self, name: &str) -> Option<&Dependency> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// 依赖名称（按字典序）
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 以 `overrides` 覆盖当前集合，生成新的集合
    ///
    /// `overrides` 中出现未声明的名称时返回 `UnknownDependency`。
    pub(crate) fn merged(&self, command: &str, overrides: Dependencies) -> CommandResult<Self> {
        let mut entries = self.entries.clone();
        for (name, dep) in overrides.entries {
            match entries.get_mut(&name) {
                Some(slot) => *slot = dep,
                None => {
                    return Err(CommandError::UnknownDependency {
                        command: command.to_string(),
                        name,
                    });
                }
            }
        }
        Ok(Self { entries })
    }
}
