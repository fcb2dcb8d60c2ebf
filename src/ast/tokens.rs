/// Kind of a lexical token.
///
/// Both grammars share one token set; whether a token is legal is decided by
/// the parser that consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Field, property, operator or transform name
    ///
    /// Starts with a letter or `_`, continues with letters, digits, `_` or `-`.
    ///
    /// # Examples
    /// ```text
    /// name
    /// _
    /// not-member
    /// startsWith
    /// ```
    Identifier,

    /// Unsigned integer or decimal
    ///
    /// # Examples
    /// ```text
    /// 0
    /// 42
    /// 3.5
    /// ```
    Number,

    /// Single- or double-quoted text, kept with its quotes in `Token::text`
    String,

    /// Path separator / root value (`.`)
    Dot,

    /// List separator (`,`)
    Comma,

    /// Filter segment separator, preset marker (`:`)
    Colon,

    /// Opens a nested field list or an array literal (`[`)
    LBracket,

    /// Closes a nested field list or an array literal (`]`)
    RBracket,

    /// Opens a nested field list or transform arguments (`(`)
    LParen,

    /// Closes a nested field list or transform arguments (`)`)
    RParen,

    /// Exclusion or operator negation (`!`)
    Bang,

    /// Exclusion (`-`)
    Minus,

    /// Transform marker (`~`)
    Tilde,

    /// Prefix/suffix anchor in `$like`, `like$`
    Dollar,

    /// Reserved anchor symbol (`^`)
    Caret,

    /// All properties (`*`)
    Star,

    /// Any character without a rule of its own
    Other,

    /// End of input
    Eof,
}

/// A token with its source text and byte offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: usize,
}
