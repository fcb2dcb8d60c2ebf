use tracing::trace;

use super::Parser;
use crate::{
    ast::{FieldNode, Token, TokenKind, Transform},
    error::FieldsSyntaxError,
};

/// What may follow a completed field.
const AFTER_FIELD: &[&str] = &["`,`", "`[`", "`]`"];
const FIELD_NAME: &[&str] = &["field name"];
const TRANSFORM_NAME: &[&str] = &["transformation name"];
const ARGUMENT: &[&str] = &["argument", "`)`"];

/// Parses a complete fields expression.
///
/// An empty expression is legal and selects nothing but the key.
pub fn parse_fields(input: &str) -> Result<Vec<FieldNode>, FieldsSyntaxError> {
    let mut parser = Parser::new(input);
    let fields = parser.parse_field_list(None)?;
    trace!(input, fields = fields.len(), "parsed fields expression");
    Ok(fields)
}

impl Parser<'_> {
    fn unexpected(&self, expected: &[&'static str]) -> FieldsSyntaxError {
        let token = self.current();
        FieldsSyntaxError::Unexpected {
            position: self.char_position(token),
            expected: expected.to_vec(),
            found: token.describe(),
        }
    }

    fn unclosed(&self, opener: &Token) -> FieldsSyntaxError {
        FieldsSyntaxError::Unclosed {
            position: self.char_position(opener),
            open: opener.text.chars().next().unwrap_or('('),
        }
    }

    /// `fieldList := (item | ':' preset)? (',' (item | ':' preset)?)*`
    ///
    /// `opener` is the bracket that started a nested list; the closing token
    /// is left for the caller to consume.
    fn parse_field_list(
        &mut self,
        opener: Option<&Token>,
    ) -> Result<Vec<FieldNode>, FieldsSyntaxError> {
        let mut fields = Vec::new();

        loop {
            match self.current().kind {
                TokenKind::Comma => {
                    self.advance();
                    continue;
                }
                TokenKind::Eof => {
                    return match opener {
                        Some(open) => Err(self.unclosed(open)),
                        None => Ok(implicit_all(fields)),
                    };
                }
                TokenKind::RBracket | TokenKind::RParen => {
                    return match opener {
                        Some(_) => Ok(fields),
                        None => Err(FieldsSyntaxError::Unbalanced {
                            position: self.char_position(self.current()),
                            close: self.current().text.chars().next().unwrap_or(']'),
                        }),
                    };
                }
                _ => {}
            }

            let item = if self.check(TokenKind::Colon) {
                self.parse_preset()?
            } else {
                // exclusions only apply to the top-level `*`
                self.parse_item(opener.is_none())?
            };
            fields.push(item);

            match self.current().kind {
                TokenKind::Comma
                | TokenKind::Eof
                | TokenKind::RBracket
                | TokenKind::RParen => {}
                _ => return Err(self.unexpected(AFTER_FIELD)),
            }
        }
    }

    /// `item := ('!'|'-')? name transforms children?`
    fn parse_item(&mut self, allow_exclusion: bool) -> Result<FieldNode, FieldsSyntaxError> {
        let excluded =
            allow_exclusion && matches!(self.current().kind, TokenKind::Bang | TokenKind::Minus);
        if excluded {
            self.advance();
        }

        let mut node = self.parse_name()?;
        node.excluded = excluded;

        // The innermost node of `a.0.b` owns the transforms written after it.
        let tail = innermost(&mut node);
        tail.transforms = self.parse_transforms()?;
        tail.children = self.parse_children()?;

        Ok(node)
    }

    fn parse_preset(&mut self) -> Result<FieldNode, FieldsSyntaxError> {
        self.advance();
        let token = self.current();
        match token.kind {
            TokenKind::Identifier if token.text.eq_ignore_ascii_case("all") => {
                self.advance();
                Ok(FieldNode::new(FieldNode::ALL))
            }
            TokenKind::Identifier => Err(FieldsSyntaxError::UnsupportedField {
                preset: token.text.clone(),
            }),
            _ => Err(self.unexpected(&["preset name"])),
        }
    }

    /// A field name. A number with a fraction (`eats.0.1` lexes `0.1`) is
    /// a chain of index selections.
    fn parse_name(&mut self) -> Result<FieldNode, FieldsSyntaxError> {
        let token = self.current();
        let node = match token.kind {
            TokenKind::Identifier => FieldNode::new(token.text.clone()),
            TokenKind::String => FieldNode::new(token.literal().into_owned()),
            TokenKind::Star => FieldNode::new(FieldNode::ALL),
            TokenKind::Dot => FieldNode::new(FieldNode::ROOT),
            TokenKind::Number => {
                let mut segments = token.text.rsplit('.');
                let mut node = FieldNode::new(segments.next().unwrap_or_default());
                for segment in segments {
                    node = FieldNode::new(segment).with_child(node);
                }
                node
            }
            _ => return Err(self.unexpected(FIELD_NAME)),
        };
        self.advance();
        Ok(node)
    }

    /// `transforms := (('~' | '::') transform)*`
    fn parse_transforms(&mut self) -> Result<Vec<Transform>, FieldsSyntaxError> {
        let mut transforms = Vec::new();
        loop {
            if self.check(TokenKind::Tilde) {
                self.advance();
            } else if self.check(TokenKind::Colon) && self.peek(1).kind == TokenKind::Colon {
                self.advance();
                self.advance();
            } else {
                return Ok(transforms);
            }
            transforms.push(self.parse_transform()?);
        }
    }

    /// `transform := identifier ('(' arg (',' arg)* ')')?`
    fn parse_transform(&mut self) -> Result<Transform, FieldsSyntaxError> {
        if !self.check(TokenKind::Identifier) {
            return Err(self.unexpected(TRANSFORM_NAME));
        }
        let name_token = self.current().clone();
        self.advance();

        let mut args = Vec::new();
        if self.check(TokenKind::LParen) {
            let opener = self.current().clone();
            self.advance();
            let mut arg = String::new();
            loop {
                let token = self.current();
                match token.kind {
                    TokenKind::RParen => {
                        if !arg.is_empty() || !args.is_empty() {
                            args.push(std::mem::take(&mut arg));
                        }
                        self.advance();
                        break;
                    }
                    TokenKind::Comma => {
                        args.push(std::mem::take(&mut arg));
                        self.advance();
                    }
                    TokenKind::Eof | TokenKind::RBracket => return Err(self.unclosed(&opener)),
                    TokenKind::LParen | TokenKind::LBracket | TokenKind::Other => {
                        return Err(self.unexpected(ARGUMENT));
                    }
                    _ => {
                        arg.push_str(&token.literal());
                        self.advance();
                    }
                }
            }
        }

        Transform::from_parts(&name_token.text, args).ok_or_else(|| {
            FieldsSyntaxError::UnknownTransform {
                position: self.char_position(&name_token),
                name: name_token.text.clone(),
            }
        })
    }

    /// `children := '[' fieldList ']' | '(' fieldList ')' | '.' field`
    fn parse_children(&mut self) -> Result<Vec<FieldNode>, FieldsSyntaxError> {
        match self.current().kind {
            TokenKind::LBracket | TokenKind::LParen => {
                let opener = self.current().clone();
                self.advance();
                let children = self.parse_field_list(Some(&opener))?;
                // parse_field_list only returns on a closer; either one will do
                self.advance();
                Ok(children)
            }
            TokenKind::Dot => {
                self.advance();
                Ok(vec![self.parse_item(false)?])
            }
            _ => Ok(Vec::new()),
        }
    }
}

/// `!code` alone removes `code` from an implicit `*`.
fn implicit_all(mut fields: Vec<FieldNode>) -> Vec<FieldNode> {
    if fields.iter().any(|f| f.excluded) && !fields.iter().any(FieldNode::is_all) {
        fields.insert(0, FieldNode::new(FieldNode::ALL));
    }
    fields
}

fn innermost(node: &mut FieldNode) -> &mut FieldNode {
    if node.children.len() == 1 {
        innermost(&mut node.children[0])
    } else {
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_dot_chain() {
        let fields = parse_fields("eats.0~hoist(food)").unwrap();
        assert_eq!(
            fields,
            vec![FieldNode::new("eats").with_child(
                FieldNode::new("0").with_transform(Transform::Hoist(Some("food".into())))
            )]
        );
    }

    #[test]
    fn fractional_number_is_an_index_chain() {
        let fields = parse_fields("matrix.0.1").unwrap();
        assert_eq!(
            fields,
            vec![FieldNode::new("matrix").with_child(FieldNode::new("0").with_child(FieldNode::new("1")))]
        );
    }

    #[test]
    fn unclosed_transform_reports_the_paren() {
        let err = parse_fields("name~rename(x").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Illegal fields expression. Unclosed `(` at position 11"
        );
    }
}
