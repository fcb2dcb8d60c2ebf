//! Property access over candidate documents.
//!
//! The in-memory strategy never inspects documents directly; it goes through
//! [`ValueAccessor`], so any keyed document model can be filtered.

use std::borrow::Cow;

use crate::value::Value;

/// Read access to one candidate.
pub trait ValueAccessor {
    /// The entry key or object identity (`_`).
    fn key(&self) -> &str;

    /// The root value (`.`).
    fn value(&self) -> &Value;

    /// The value at a dotted path below the root.
    ///
    /// Named segments read object members and fan out over arrays; numeric
    /// segments select array elements. `None` means absent.
    fn get(&self, path: &[String]) -> Option<Cow<'_, Value>> {
        self.find(path).map(|found| found.value)
    }

    /// Like [`get`](Self::get), also telling whether the value was gathered
    /// from the elements of a collection.
    fn find(&self, path: &[String]) -> Option<Found<'_>> {
        locate(self.value(), path)
    }

    fn exists(&self, path: &[String]) -> bool {
        self.get(path).is_some()
    }
}

/// A keyed document, as kept by the document store.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub key: String,
    pub value: Value,
}

impl Entry {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Entry {
            key: key.into(),
            value,
        }
    }
}

impl ValueAccessor for Entry {
    fn key(&self) -> &str {
        &self.key
    }

    fn value(&self) -> &Value {
        &self.value
    }
}

/// A value found at a path.
#[derive(Debug, Clone, PartialEq)]
pub struct Found<'v> {
    pub value: Cow<'v, Value>,
    /// The path fanned out over an array. `value` is then an array holding
    /// one item per element, `null` where the element lacks the member.
    pub fanned_out: bool,
}

/// Walks `path` from `root`.
pub fn lookup<'v>(root: &'v Value, path: &[String]) -> Option<Cow<'v, Value>> {
    locate(root, path).map(|found| found.value)
}

pub fn locate<'v>(root: &'v Value, path: &[String]) -> Option<Found<'v>> {
    let Some((segment, rest)) = path.split_first() else {
        return Some(Found {
            value: Cow::Borrowed(root),
            fanned_out: false,
        });
    };

    match root {
        Value::Object(obj) => locate(obj.get(segment)?, rest),
        Value::Array(arr) => match segment.parse::<usize>() {
            Ok(index) => locate(arr.get(index)?, rest),
            Err(_) => {
                let mut items = Vec::new();
                for element in arr {
                    match locate(element, path) {
                        Some(Found {
                            value: Cow::Owned(Value::Array(nested)),
                            fanned_out: true,
                        }) => items.extend(nested),
                        Some(found) => items.push(found.value.into_owned()),
                        None => items.push(Value::Null),
                    }
                }
                Some(Found {
                    value: Cow::Owned(Value::Array(items)),
                    fanned_out: true,
                })
            }
        },
        _ => None,
    }
}
