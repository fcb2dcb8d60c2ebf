use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

/// A literal value written in a filter.
///
/// Literals keep their text. What type they stand for is decided when they
/// meet a property value (or a typed backend column), which is what allows
/// `name:eq:4` to compare lengths while `age:eq:4` compares numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal {
    pub text: String,
}

impl Literal {
    pub fn new(text: impl Into<String>) -> Self {
        Literal { text: text.into() }
    }

    /// A pure integer: optional `-` followed by ASCII digits only.
    pub fn as_integer(&self) -> Option<i64> {
        let digits = self.text.strip_prefix('-').unwrap_or(&self.text);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        self.text.parse().ok()
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        Decimal::from_str(self.text.trim())
            .or_else(|_| Decimal::from_scientific(self.text.trim()))
            .ok()
    }

    pub fn as_bool(&self) -> Option<bool> {
        if self.text.eq_ignore_ascii_case("true") {
            Some(true)
        } else if self.text.eq_ignore_ascii_case("false") {
            Some(false)
        } else {
            None
        }
    }

    pub fn is_null(&self) -> bool {
        self.text == "null"
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// The value part of a filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FilterValue {
    /// Unary operators
    None,
    /// `name:eq:Paul`
    Single(Literal),
    /// `_:in:[cat,dog]`
    List(Vec<Literal>),
}

impl FilterValue {
    pub fn literals(&self) -> &[Literal] {
        match self {
            FilterValue::None => &[],
            FilterValue::Single(literal) => std::slice::from_ref(literal),
            FilterValue::List(literals) => literals,
        }
    }

    pub fn single(&self) -> Option<&Literal> {
        match self {
            FilterValue::Single(literal) => Some(literal),
            _ => None,
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::None => Ok(()),
            FilterValue::Single(literal) => f.write_str(&literal.text),
            FilterValue::List(literals) => {
                let items: Vec<&str> = literals.iter().map(Literal::as_str).collect();
                write!(f, "[{}]", items.join(","))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_shape() {
        assert_eq!(Literal::new("4").as_integer(), Some(4));
        assert_eq!(Literal::new("-12").as_integer(), Some(-12));
        assert_eq!(Literal::new("4.0").as_integer(), None);
        assert_eq!(Literal::new("+4").as_integer(), None);
        assert_eq!(Literal::new("").as_integer(), None);
        assert_eq!(Literal::new("-").as_integer(), None);
    }

    #[test]
    fn decimal_shape() {
        assert_eq!(Literal::new("2.50").as_decimal(), Decimal::from_str("2.5").ok());
        assert_eq!(Literal::new("abc").as_decimal(), None);
    }
}
