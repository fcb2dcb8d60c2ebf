use std::fmt;

/// Where a `like` pattern must match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// `like`, `ilike`: anywhere (or the whole text when wildcards are used)
    Anywhere,
    /// `$like`, `$ilike`, `startsWith`
    Start,
    /// `like$`, `ilike$`, `endsWith`
    End,
}

/// Comparison performed by a filter, without its negation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// Equal (`eq`)
    Eq,
    /// Case-insensitive equal (`ieq`)
    IEq,
    /// Less than (`lt`)
    Lt,
    /// Less than or equal (`le`, `lte`)
    Le,
    /// Greater than (`gt`)
    Gt,
    /// Greater than or equal (`ge`, `gte`)
    Ge,
    /// Pattern match (`like`, `ilike`, `$like`, `like$`, `startsWith`, `endsWith`, ...)
    Like {
        case_insensitive: bool,
        anchor: Anchor,
    },
    /// Membership in an array literal (`in`)
    In,
    /// Zero-length string or collection (`empty`)
    Empty,
    /// Absent or null (`null`)
    Null,
}

impl OpKind {
    /// Unary operators take no value.
    pub fn is_unary(self) -> bool {
        matches!(self, OpKind::Empty | OpKind::Null)
    }

    /// Operators that compare order or equality, the ones subject to the
    /// length overload for integer literals.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            OpKind::Eq | OpKind::Lt | OpKind::Le | OpKind::Gt | OpKind::Ge
        )
    }

    pub fn is_like(self) -> bool {
        matches!(self, OpKind::Like { .. })
    }

    /// Whether the value is a bracketed list rather than a single literal.
    pub fn is_multi_valued(self) -> bool {
        matches!(self, OpKind::In)
    }
}

/// A filter operator: a comparison and whether it is negated (`!`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Operator {
    pub kind: OpKind,
    pub negated: bool,
}

impl Operator {
    pub fn new(kind: OpKind) -> Self {
        Operator {
            kind,
            negated: false,
        }
    }

    pub fn negate(self) -> Self {
        Operator {
            kind: self.kind,
            negated: !self.negated,
        }
    }

    /// Parses an operator name as written in a filter, including a leading
    /// `!` and `$` anchors (`!$ilike`, `like$`).
    pub fn parse(text: &str) -> Option<Self> {
        let (negated, name) = match text.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let base = match name.to_ascii_lowercase().as_str() {
            "eq" => Operator::new(OpKind::Eq),
            "ieq" => Operator::new(OpKind::IEq),
            "ne" | "neq" => Operator::new(OpKind::Eq).negate(),
            "lt" => Operator::new(OpKind::Lt),
            "le" | "lte" => Operator::new(OpKind::Le),
            "gt" => Operator::new(OpKind::Gt),
            "ge" | "gte" => Operator::new(OpKind::Ge),
            "like" => like(false, Anchor::Anywhere),
            "ilike" => like(true, Anchor::Anywhere),
            "$like" => like(false, Anchor::Start),
            "$ilike" | "startswith" => like(true, Anchor::Start),
            "like$" => like(false, Anchor::End),
            "ilike$" | "endswith" => like(true, Anchor::End),
            "in" => Operator::new(OpKind::In),
            "empty" => Operator::new(OpKind::Empty),
            "null" => Operator::new(OpKind::Null),
            _ => return None,
        };
        Some(if negated { base.negate() } else { base })
    }
}

fn like(case_insensitive: bool, anchor: Anchor) -> Operator {
    Operator::new(OpKind::Like {
        case_insensitive,
        anchor,
    })
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            f.write_str("!")?;
        }
        let name = match self.kind {
            OpKind::Eq => "eq",
            OpKind::IEq => "ieq",
            OpKind::Lt => "lt",
            OpKind::Le => "le",
            OpKind::Gt => "gt",
            OpKind::Ge => "ge",
            OpKind::Like {
                case_insensitive,
                anchor,
            } => match (case_insensitive, anchor) {
                (false, Anchor::Anywhere) => "like",
                (true, Anchor::Anywhere) => "ilike",
                (false, Anchor::Start) => "$like",
                (true, Anchor::Start) => "$ilike",
                (false, Anchor::End) => "like$",
                (true, Anchor::End) => "ilike$",
            },
            OpKind::In => "in",
            OpKind::Empty => "empty",
            OpKind::Null => "null",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_to_the_same_operator() {
        assert_eq!(Operator::parse("ne"), Operator::parse("!eq"));
        assert_eq!(Operator::parse("neq"), Operator::parse("!eq"));
        assert_eq!(Operator::parse("lte"), Operator::parse("le"));
        assert_eq!(Operator::parse("startsWith"), Operator::parse("$ilike"));
        assert_eq!(Operator::parse("endsWith"), Operator::parse("ilike$"));
        assert_eq!(Operator::parse("!ne"), Operator::parse("eq"));
    }

    #[test]
    fn unknown_operator() {
        assert_eq!(Operator::parse("between"), None);
        assert_eq!(Operator::parse("!"), None);
    }
}
