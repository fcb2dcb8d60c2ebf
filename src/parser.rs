//! Recursive-descent parsers for the fields and filter languages.
//!
//! Both grammars share the [`Lexer`]. A [`Parser`] is a cursor over one
//! tokenized input and lives only for the duration of a single parse, so
//! nothing is shared between requests.

mod fields;
mod filter;

pub use fields::parse_fields;
pub use filter::{parse_filter, parse_list};

use crate::{
    ast::{Token, TokenKind},
    lexer::Lexer,
};

pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    index: usize,
    eof: Token,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Parser {
            source,
            tokens: Lexer::tokenize(source),
            index: 0,
            eof: Token {
                kind: TokenKind::Eof,
                text: String::new(),
                position: source.len(),
            },
        }
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.index).unwrap_or(&self.eof)
    }

    fn peek(&self, offset: usize) -> &Token {
        self.tokens.get(self.index + offset).unwrap_or(&self.eof)
    }

    fn advance(&mut self) {
        if self.index < self.tokens.len() {
            self.index += 1;
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    /// Character offset of a token, the unit error messages are reported in.
    fn char_position(&self, token: &Token) -> usize {
        self.source
            .get(..token.position)
            .map(|prefix| prefix.chars().count())
            .unwrap_or(token.position)
    }
}

/// Splits `text` on `separator` where it is not inside `[...]`, `(...)` or a
/// quoted string. Pieces are returned untrimmed; an empty input yields no
/// pieces.
pub fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut pieces = Vec::new();
    if text.is_empty() {
        return pieces;
    }
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (offset, ch) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '\'' | '"' => quote = Some(ch),
            '[' | '(' => depth += 1,
            ']' | ')' => depth = depth.saturating_sub(1),
            c if c == separator && depth == 0 => {
                pieces.push(&text[start..offset]);
                start = offset + c.len_utf8();
            }
            _ => {}
        }
    }
    pieces.push(&text[start..]);
    pieces
}

#[test]
fn test_split_top_level() {
    assert_eq!(
        split_top_level("name:eq:a,_:in:[x,y],code:eq:'1,2'", ','),
        vec!["name:eq:a", "_:in:[x,y]", "code:eq:'1,2'"]
    );
    assert!(split_top_level("", ',').is_empty());
    assert_eq!(split_top_level("a,,b", ','), vec!["a", "", "b"]);
}

#[test]
fn test_char_position_counts_characters() {
    let parser = Parser::new("é,name");
    let token = parser.peek(2).clone();
    assert_eq!(token.position, 3);
    assert_eq!(parser.char_position(&token), 2);
}
