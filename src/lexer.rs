use std::borrow::Cow;

use crate::ast::{Token, TokenKind};

/// Tokenizer shared by the fields and filter grammars.
///
/// The lexer never fails. Characters it has no rule for become
/// [`TokenKind::Other`] tokens so the parsers can report them in grammar
/// terms ("Expected `,`, `[` or `]` ... but found `'`").
pub struct Lexer {
    input: Vec<(usize, char)>,
    len: usize,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.char_indices().collect(),
            len: input.len(),
            position: 0,
        }
    }

    /// Convenience: tokenize a whole string, ending with an `Eof` token.
    pub fn tokenize(input: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(input);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).map(|(_, c)| *c)
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).map(|(_, c)| *c)
    }

    /// Byte offset of the char at `index`, or the input length past the end.
    fn offset(&self, index: usize) -> usize {
        self.input.get(index).map(|(o, _)| *o).unwrap_or(self.len)
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn slice(&self, start: usize, end: usize) -> String {
        self.input[start..end].iter().map(|(_, c)| *c).collect()
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            text: self.slice(start, self.position),
            position: self.offset(start),
        }
    }

    fn read_identifier(&mut self, start: usize) -> Token {
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' || ch == '-' {
                self.advance();
            } else {
                break;
            }
        }
        self.token(TokenKind::Identifier, start)
    }

    fn read_number(&mut self, start: usize) -> Token {
        let mut is_float = false;
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                self.advance();
            } else if ch == '.'
                && !is_float
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                is_float = true;
                self.advance();
            } else {
                break;
            }
        }
        self.token(TokenKind::Number, start)
    }

    /// Reads a quoted string. Without a closing quote the opening quote is
    /// returned on its own as an `Other` token and lexing resumes after it.
    fn read_string(&mut self, start: usize, quote: char) -> Token {
        let mut cursor = start + 1;
        while let Some((_, ch)) = self.input.get(cursor) {
            match *ch {
                c if c == quote => {
                    self.position = cursor + 1;
                    return self.token(TokenKind::String, start);
                }
                '\\' => cursor += 2,
                _ => cursor += 1,
            }
        }
        self.advance();
        self.token(TokenKind::Other, start)
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        let start = self.position;

        let kind = match self.current_char() {
            None => {
                return Token {
                    kind: TokenKind::Eof,
                    text: String::new(),
                    position: self.len,
                };
            }
            Some(ch) if ch.is_alphabetic() || ch == '_' => return self.read_identifier(start),
            Some(ch) if ch.is_ascii_digit() => return self.read_number(start),
            Some(q @ ('"' | '\'')) => return self.read_string(start, q),
            Some('.') => TokenKind::Dot,
            Some(',') => TokenKind::Comma,
            Some(':') => TokenKind::Colon,
            Some('[') => TokenKind::LBracket,
            Some(']') => TokenKind::RBracket,
            Some('(') => TokenKind::LParen,
            Some(')') => TokenKind::RParen,
            Some('!') => TokenKind::Bang,
            Some('-') => TokenKind::Minus,
            Some('~') => TokenKind::Tilde,
            Some('$') => TokenKind::Dollar,
            Some('^') => TokenKind::Caret,
            Some('*') => TokenKind::Star,
            Some(_) => TokenKind::Other,
        };
        self.advance();
        self.token(kind, start)
    }
}

impl Token {
    /// The literal value of the token: strings lose their quotes and escapes,
    /// everything else is returned as written.
    pub fn literal(&self) -> Cow<'_, str> {
        if self.kind != TokenKind::String {
            return Cow::Borrowed(&self.text);
        }
        let inner = &self.text[1..self.text.len() - 1];
        if !inner.contains('\\') {
            return Cow::Borrowed(inner);
        }
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(ch) = chars.next() {
            if ch == '\\' {
                match chars.next() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(other) => out.push(other),
                    None => out.push('\\'),
                }
            } else {
                out.push(ch);
            }
        }
        Cow::Owned(out)
    }

    /// How the token is shown in error messages.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of input".to_string(),
            _ => format!("`{}`", self.text),
        }
    }

    /// Byte offset just past the token.
    pub fn end(&self) -> usize {
        self.position + self.text.len()
    }
}

#[test]
fn test_positions_are_byte_offsets() {
    let tokens = Lexer::tokenize("é,name");
    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[1].position, 2);
    assert_eq!(tokens[2].position, 3);
    assert_eq!(tokens[3].kind, TokenKind::Eof);
    assert_eq!(tokens[3].position, 7);
}

#[test]
fn test_unterminated_quote_is_other() {
    let tokens = Lexer::tokenize("illegal'");
    assert_eq!(tokens[0].text, "illegal");
    assert_eq!(tokens[1].kind, TokenKind::Other);
    assert_eq!(tokens[1].text, "'");
    assert_eq!(tokens[1].position, 7);
}

#[test]
fn test_string_literal_unescapes() {
    let tokens = Lexer::tokenize(r#"'a\'b'"#);
    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].literal(), "a'b");
}
