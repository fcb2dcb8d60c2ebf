//! Post-fetch transforms of projected fields.
//!
//! Transforms never take part in filtering. They run left to right on the
//! value fetched for a field and may change its output key (`rename`) or
//! where it lands in the output (`hoist`).

use std::collections::HashMap;

use crate::{ast::Transform, value::Value};

/// A field value on its way into the output object.
#[derive(Debug, Clone, PartialEq)]
pub struct Shaped {
    pub key: String,
    pub value: Value,
    /// Object values merge their members into the enclosing output
    pub hoisted: bool,
}

impl Shaped {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Shaped {
            key: key.into(),
            value,
            hoisted: false,
        }
    }

    /// Applies `transforms` in order.
    pub fn transform(mut self, transforms: &[Transform]) -> Self {
        for transform in transforms {
            match transform {
                Transform::Rename(alias) => self.key = alias.clone(),
                Transform::Hoist(name) => {
                    self.hoisted = true;
                    if let Some(name) = name {
                        self.key = name.clone();
                    }
                }
                other => self.value = apply(other, self.value),
            }
        }
        self
    }

    /// Writes the value into `target`.
    pub fn emit(self, target: &mut HashMap<String, Value>) {
        match self.value {
            Value::Object(members) if self.hoisted => target.extend(members),
            value => {
                target.insert(self.key, value);
            }
        }
    }
}

/// Applies one value transform. `rename` and `hoist` leave the value as is.
pub fn apply(transform: &Transform, value: Value) -> Value {
    match transform {
        Transform::Rename(_) | Transform::Hoist(_) => value,
        Transform::Size => Value::from(value.len().unwrap_or(0)),
        Transform::Ids => map_elements(value, |element| {
            element.identity().map(Value::String).unwrap_or(Value::Null)
        }),
        Transform::IdObjects => map_elements(value, |element| match element.identity() {
            Some(id) => Value::object([("id", Value::String(id))]),
            None => Value::Null,
        }),
        Transform::Pluck(property) => {
            let property = property.as_deref().unwrap_or("id");
            map_elements(value, |element| element.get(property).cloned().unwrap_or(Value::Null))
        }
        Transform::IsEmpty => Value::Boolean(is_empty(&value)),
        Transform::IsNotEmpty => Value::Boolean(!is_empty(&value)),
        Transform::Member(id) => Value::Boolean(has_member(&value, id)),
        Transform::NotMember(id) => Value::Boolean(!has_member(&value, id)),
    }
}

/// Arrays map element-wise, null stays null, anything else is one element.
fn map_elements(value: Value, f: impl Fn(&Value) -> Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(f).collect()),
        Value::Null => Value::Null,
        single => f(&single),
    }
}

fn is_empty(value: &Value) -> bool {
    value.is_null() || value.is_empty() == Some(true)
}

fn has_member(value: &Value, id: &str) -> bool {
    value
        .as_array()
        .is_some_and(|items| items.iter().any(|item| item.identity().as_deref() == Some(id)))
}
