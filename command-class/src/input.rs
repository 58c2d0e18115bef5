//! 输入（Input）
//!
//! - `InputNames`：命令类声明时给出的有序输入名称；
//! - `Inputs`：每次调用时提供的输入值（名称 → `serde_json::Value`）。
//!
use crate::error::{CommandError, CommandResult};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// 声明的输入名称（保持声明顺序）
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputNames(Vec<String>);

impl InputNames {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for InputNames {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<const N: usize> From<[&str; N]> for InputNames {
    fn from(names: [&str; N]) -> Self {
        names.into_iter().collect()
    }
}

impl From<Vec<&str>> for InputNames {
    fn from(names: Vec<&str>) -> Self {
        names.into_iter().collect()
    }
}

impl From<Vec<String>> for InputNames {
    fn from(names: Vec<String>) -> Self {
        Self(names)
    }
}

/// 单次调用的输入值
///
/// ```
/// use command_class::input::Inputs;
///
/// let inputs = Inputs::new().with("name", "John").with("age", 42);
/// assert_eq!(inputs.get("name").and_then(|v| v.as_str()), Some("John"));
/// assert_eq!(inputs.len(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Inputs {
    values: BTreeMap<String, Value>,
}

impl Inputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加（或替换）一个输入值，链式调用
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(name.into(), value.into())
    }

    /// 由任意可序列化的结构体构造，字段名即输入名
    ///
    /// 序列化结果必须是 JSON 对象，否则返回 `InvalidInputs`。
    pub fn from_serialize<T>(value: &T) -> CommandResult<Self>
    where
        T: Serialize + ?Sized,
    {
        match serde_json::to_value(value)? {
            Value::Object(map) => Ok(Self {
                values: map.into_iter().collect(),
            }),
            other => Err(CommandError::InvalidInputs {
                reason: format!("expected an object, found {}", json_kind(&other)),
            }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 转为 JSON 对象（用于整体反序列化）
    pub(crate) fn to_object(&self) -> Value {
        Value::Object(
            self.values
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct SignUp<'a> {
        name: &'a str,
        email: &'a str,
        password: &'a str,
    }

    // 测试声明顺序被保留
    #[test]
    fn input_names_keep_declaration_order() {
        let names = InputNames::from(["name", "email", "password"]);
        assert_eq!(names.iter().collect::<Vec<_>>(), vec!["name", "email", "password"]);
        assert!(names.contains("email"));
        assert!(!names.contains("age"));
        assert_eq!(names.len(), 3);
    }

    // 测试由结构体构造输入
    #[test]
    fn from_serialize_uses_field_names() {
        let inputs = Inputs::from_serialize(&SignUp {
            name: "John",
            email: "john@gmail.com",
            password: "secret",
        })
        .unwrap();

        assert_eq!(inputs.len(), 3);
        assert_eq!(
            inputs.get("email").and_then(Value::as_str),
            Some("john@gmail.com")
        );
        assert_eq!(inputs.names().collect::<Vec<_>>(), vec!["email", "name", "password"]);
    }

    // 非对象无法作为输入
    #[test]
    fn from_serialize_rejects_non_objects() {
        let err = Inputs::from_serialize(&vec![1, 2, 3]).unwrap_err();
        match err {
            CommandError::InvalidInputs { reason } => assert!(reason.contains("array")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn insert_replaces_previous_value() {
        let mut inputs = Inputs::new().with("name", "x");
        let old = inputs.insert("name", "John");
        assert_eq!(old, Some(Value::from("x")));
        assert_eq!(inputs.get("name"), Some(&Value::from("John")));
    }
}
