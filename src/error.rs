//! Error types of the expression engine.
//!
//! Parsing is all-or-nothing: the first error aborts the whole request before
//! anything is evaluated. Every error is surfaced to the caller as a
//! CONFLICT-class [`ErrorReport`].

use serde::Serialize;
use thiserror::Error;

use crate::ast::Operator;

/// A fields expression that does not follow the grammar.
///
/// Positions are 0-based character offsets into the original expression.
/// Expected symbols are stored as they are shown, quoted where they are
/// literal text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldsSyntaxError {
    #[error(
        "Illegal fields expression. Expected {} at position {position} but found {found}",
        join_expected(expected)
    )]
    Unexpected {
        position: usize,
        expected: Vec<&'static str>,
        found: String,
    },

    /// A `[` or `(` that is never closed, reported where it was opened
    #[error("Illegal fields expression. Unclosed `{open}` at position {position}")]
    Unclosed { position: usize, open: char },

    /// A `]` or `)` without a matching opener
    #[error("Illegal fields expression. Unexpected `{close}` at position {position}")]
    Unbalanced { position: usize, close: char },

    #[error("Illegal fields expression. Unknown transformation `{name}` at position {position}")]
    UnknownTransform { position: usize, name: String },

    #[error("Field not supported: `:{preset}`")]
    UnsupportedField { preset: String },
}

impl FieldsSyntaxError {
    pub fn position(&self) -> Option<usize> {
        match self {
            FieldsSyntaxError::Unexpected { position, .. }
            | FieldsSyntaxError::Unclosed { position, .. }
            | FieldsSyntaxError::Unbalanced { position, .. }
            | FieldsSyntaxError::UnknownTransform { position, .. } => Some(*position),
            FieldsSyntaxError::UnsupportedField { .. } => None,
        }
    }
}

/// `` `,`, `[` or `]` ``
fn join_expected(expected: &[&str]) -> String {
    match expected {
        [] => "nothing".to_string(),
        [only] => only.to_string(),
        [init @ .., last] => format!("{} or {}", init.join(", "), last),
    }
}

/// Why a single filter was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterErrorReason {
    #[error("key filters cannot be used with unary operators")]
    KeyWithUnaryOperator,

    #[error("unknown operator `{0}`")]
    UnknownOperator(String),

    #[error("malformed array literal `{0}`, expected `[value,value,...]`")]
    MalformedArray(String),

    #[error("binary operator `{0}` requires a value")]
    MissingValue(Operator),

    #[error("unary operator `{0}` does not take a value")]
    UnexpectedValue(Operator),

    #[error("operator `{0}` can only be used with a single value")]
    TooManyValues(Operator),

    #[error("missing property")]
    MissingProperty,

    #[error("missing operator")]
    MissingOperator,

    #[error("illegal property path `{0}`")]
    IllegalProperty(String),

    #[error("operator `{operator}` cannot be used on `{property}`")]
    UnsupportedOperator { operator: Operator, property: String },

    #[error("value `{value}` is not a valid {expected}")]
    InvalidValue {
        value: String,
        expected: &'static str,
    },
}

/// A filter clause that failed to parse or validate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Illegal filter `{raw}`: {reason}")]
pub struct FilterSyntaxError {
    pub raw: String,
    pub reason: FilterErrorReason,
}

impl FilterSyntaxError {
    pub fn new(raw: impl Into<String>, reason: FilterErrorReason) -> Self {
        FilterSyntaxError {
            raw: raw.into(),
            reason,
        }
    }
}

/// A path the backend does not know. Raised by the query-building strategy
/// and never ignored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown property `{path}`")]
pub struct UnknownProperty {
    pub path: String,
}

impl UnknownProperty {
    pub fn new(path: impl Into<String>) -> Self {
        UnknownProperty { path: path.into() }
    }
}

/// Any failure of the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error(transparent)]
    Fields(#[from] FieldsSyntaxError),

    #[error(transparent)]
    Filter(#[from] FilterSyntaxError),

    #[error(transparent)]
    UnknownProperty(#[from] UnknownProperty),

    #[error("Illegal value `{value}` for parameter `{name}`")]
    IllegalParameter { name: &'static str, value: String },
}

pub type Result<T, E = QueryError> = std::result::Result<T, E>;

/// The structured conflict a caller turns into a response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub http_status: &'static str,
    pub http_status_code: u16,
    pub status: &'static str,
    pub message: String,
}

impl From<&QueryError> for ErrorReport {
    fn from(error: &QueryError) -> Self {
        ErrorReport {
            http_status: "Conflict",
            http_status_code: 409,
            status: "ERROR",
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_set_rendering() {
        let err = FieldsSyntaxError::Unexpected {
            position: 7,
            expected: vec!["`,`", "`[`", "`]`"],
            found: "`'`".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Illegal fields expression. Expected `,`, `[` or `]` at position 7 but found `'`"
        );
    }

    #[test]
    fn key_filter_message() {
        let err = FilterSyntaxError::new("_:null", FilterErrorReason::KeyWithUnaryOperator);
        assert_eq!(
            err.to_string(),
            "Illegal filter `_:null`: key filters cannot be used with unary operators"
        );
    }

    #[test]
    fn every_error_is_a_conflict() {
        let err = QueryError::from(UnknownProperty::new("foo.bar"));
        let report = ErrorReport::from(&err);
        assert_eq!(report.http_status_code, 409);
        assert_eq!(report.message, "Unknown property `foo.bar`");
    }
}
