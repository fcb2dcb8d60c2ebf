use std::collections::HashMap;

/// A JSON-like value, the document model of the in-memory strategy.
///
/// Integers and floats are kept apart so that `size`-style results print as
/// integers and numeric filters can compare exactly.
///
/// # Examples
///
/// ```
/// use gistql::Value;
///
/// let horse = Value::object([("name", Value::from("Fury"))]);
/// assert_eq!(horse.get("name"), Some(&Value::from("Fury")));
/// assert_eq!(horse.len(), Some(1));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Float(f64),
    Integer(i64),
    String(String),
    Array(Vec<Value>),
    Object(HashMap<String, Value>),
}

impl Value {
    /// Builds an object from key/value pairs.
    pub fn object<K: Into<String>>(members: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Object(members.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Member of an object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(obj) => obj.get(key),
            _ => None,
        }
    }

    /// Element of an array.
    pub fn index(&self, index: usize) -> Option<&Value> {
        match self {
            Value::Array(arr) => arr.get(index),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Length of a string (in characters), array or object.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::String(s) => Some(s.chars().count()),
            Value::Array(arr) => Some(arr.len()),
            Value::Object(obj) => Some(obj.len()),
            _ => None,
        }
    }

    /// `Some(true)` for a zero-length string, array or object, `None` for
    /// values that have no length.
    pub fn is_empty(&self) -> Option<bool> {
        self.len().map(|len| len == 0)
    }

    /// Identity of an element: the `id` member of an object, or the scalar
    /// itself rendered as text.
    pub fn identity(&self) -> Option<String> {
        match self {
            Value::Object(obj) => obj.get("id").and_then(Value::identity),
            Value::String(s) => Some(s.clone()),
            Value::Integer(n) => Some(n.to_string()),
            Value::Float(n) => Some(n.to_string()),
            Value::Boolean(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Float(_) | Value::Integer(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        i64::try_from(n).map(Value::Integer).unwrap_or(Value::Float(n as f64))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(arr: Vec<Value>) -> Self {
        Value::Array(arr)
    }
}

#[test]
fn test_identity_of_elements() {
    let obj = Value::object([("id", Value::from("a1")), ("name", Value::from("x"))]);
    assert_eq!(obj.identity().as_deref(), Some("a1"));
    assert_eq!(Value::Integer(3).identity().as_deref(), Some("3"));
    assert_eq!(Value::Null.identity(), None);
}

#[test]
fn test_string_length_counts_characters() {
    assert_eq!(Value::from("Zoë").len(), Some(3));
    assert_eq!(Value::Integer(12).len(), None);
}
