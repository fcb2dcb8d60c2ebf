//! Comparison semantics of the filter operators over [`Value`]s.
//!
//! A [`Matcher`] is compiled once per filter and then tested against any
//! number of candidates; it holds no per-candidate state.

use std::cmp::Ordering;

use regex::Regex;
use rust_decimal::{Decimal, prelude::FromPrimitive};

use crate::{
    ast::{Anchor, FilterNode, Literal, OpKind, Operator},
    error::{FilterErrorReason, FilterSyntaxError},
    value::Value,
};

#[derive(Debug, Clone)]
pub struct Matcher {
    operator: Operator,
    literals: Vec<Literal>,
    pattern: Option<Regex>,
}

impl Matcher {
    pub fn new(filter: &FilterNode) -> Result<Self, FilterSyntaxError> {
        let literals = filter.value.literals().to_vec();
        let pattern = match (filter.operator.kind, literals.first()) {
            (
                OpKind::Like {
                    case_insensitive,
                    anchor,
                },
                Some(literal),
            ) => Some(like_regex(literal.as_str(), case_insensitive, anchor).map_err(|_| {
                FilterSyntaxError::new(
                    filter.to_string(),
                    FilterErrorReason::InvalidValue {
                        value: literal.text.clone(),
                        expected: "pattern",
                    },
                )
            })?),
            _ => None,
        };
        Ok(Matcher {
            operator: filter.operator,
            literals,
            pattern,
        })
    }

    /// Tests a property value; `None` means the property is absent.
    ///
    /// Negation is the complement of the positive test, except that an
    /// absent or null property is neither `empty` nor `!empty`.
    pub fn test(&self, actual: Option<&Value>) -> bool {
        let positive = self.positive(actual);
        if !self.operator.negated {
            return positive;
        }
        if self.operator.kind == OpKind::Empty && actual.is_none_or(Value::is_null) {
            return false;
        }
        !positive
    }

    /// Tests the items a path gathered from the elements of a collection.
    /// The operator holds when it holds for any item; negation is the
    /// complement of that.
    pub fn test_each(&self, items: &[Value]) -> bool {
        let positive = items.iter().any(|item| self.positive(Some(item)));
        positive != self.operator.negated
    }

    fn positive(&self, actual: Option<&Value>) -> bool {
        let actual = match (self.operator.kind, actual) {
            (OpKind::Null, None | Some(Value::Null)) => return true,
            (OpKind::Null, Some(_)) => return false,
            (_, None | Some(Value::Null)) => return false,
            (_, Some(value)) => value,
        };

        match self.operator.kind {
            OpKind::Null => false,
            OpKind::Empty => actual.is_empty() == Some(true),
            OpKind::In => self.literals.iter().any(|lit| contains(actual, lit)),
            kind => {
                let Some(literal) = self.literals.first() else {
                    return false;
                };
                if let Some(size) = length_overload(kind, actual, literal) {
                    return size;
                }
                match actual {
                    Value::Array(items) => items.iter().any(|item| self.scalar(kind, item, literal)),
                    _ => self.scalar(kind, actual, literal),
                }
            }
        }
    }

    fn scalar(&self, kind: OpKind, actual: &Value, literal: &Literal) -> bool {
        match kind {
            OpKind::IEq => text(actual)
                .is_some_and(|t| fold(&t) == fold(literal.as_str())),
            OpKind::Like {
                case_insensitive, ..
            } => match (&self.pattern, text(actual)) {
                (Some(pattern), Some(t)) if case_insensitive => pattern.is_match(&fold(&t)),
                (Some(pattern), Some(t)) => pattern.is_match(&t),
                _ => false,
            },
            _ => order(actual, literal).is_some_and(|ord| satisfies(kind, ord)),
        }
    }
}

/// The single case fold used by `ieq` and the `i*like` family.
pub fn fold(text: &str) -> String {
    text.to_lowercase()
}

/// An integer literal compared with a string or array compares its length.
/// Arrays only reach here when the property itself holds the array.
fn length_overload(kind: OpKind, actual: &Value, literal: &Literal) -> Option<bool> {
    if !kind.is_comparison() {
        return None;
    }
    let expected = literal.as_integer()?;
    let len = match actual {
        Value::String(_) | Value::Array(_) => actual.len()?,
        _ => return None,
    };
    let len = i64::try_from(len).ok()?;
    Some(satisfies(kind, len.cmp(&expected)))
}

fn satisfies(kind: OpKind, ord: Ordering) -> bool {
    match kind {
        OpKind::Eq => ord == Ordering::Equal,
        OpKind::Lt => ord == Ordering::Less,
        OpKind::Le => ord != Ordering::Greater,
        OpKind::Gt => ord == Ordering::Greater,
        OpKind::Ge => ord != Ordering::Less,
        _ => false,
    }
}

/// Typed ordering of a value against a literal; `None` when they are not
/// comparable.
pub fn order(actual: &Value, literal: &Literal) -> Option<Ordering> {
    match actual {
        Value::Integer(n) => Some(Decimal::from(*n).cmp(&literal.as_decimal()?)),
        Value::Float(n) => Some(Decimal::from_f64(*n)?.cmp(&literal.as_decimal()?)),
        Value::Boolean(b) => Some(b.cmp(&literal.as_bool()?)),
        Value::String(s) => Some(s.as_str().cmp(literal.as_str())),
        Value::Object(_) => Some(actual.identity()?.as_str().cmp(literal.as_str())),
        Value::Null | Value::Array(_) => None,
    }
}

/// `in` membership: exact typed equality, element-wise for arrays.
fn contains(actual: &Value, literal: &Literal) -> bool {
    match actual {
        Value::Array(items) => items.iter().any(|item| contains(item, literal)),
        _ => order(actual, literal) == Some(Ordering::Equal),
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::Object(_) | Value::Array(_) | Value::Null => None,
        _ => value.identity(),
    }
}

/// Compiles a `like` pattern: `*` matches any run, `?` one character.
/// Without wildcards `like` and `ilike` match anywhere in the text. Prefix
/// and suffix patterns are plain text.
pub fn like_regex(
    pattern: &str,
    case_insensitive: bool,
    anchor: Anchor,
) -> Result<Regex, regex::Error> {
    let pattern = if case_insensitive {
        fold(pattern)
    } else {
        pattern.to_string()
    };
    let has_wildcards = anchor == Anchor::Anywhere && pattern.contains(['*', '?']);

    let mut body = String::with_capacity(pattern.len() + 8);
    for ch in pattern.chars() {
        match ch {
            '*' if has_wildcards => body.push_str(".*"),
            '?' if has_wildcards => body.push('.'),
            c => body.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }

    let source = match anchor {
        Anchor::Anywhere if has_wildcards => format!("(?s)^{body}$"),
        Anchor::Anywhere => format!("(?s){body}"),
        Anchor::Start => format!("(?s)^{body}"),
        Anchor::End => format!("(?s){body}$"),
    };
    Regex::new(&source)
}
