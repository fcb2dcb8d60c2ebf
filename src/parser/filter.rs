use tracing::trace;

use super::split_top_level;
use crate::{
    ast::{FilterNode, FilterValue, GroupId, Literal, OpKind, Operator, PropertyPath, TokenKind},
    error::{FilterErrorReason, FilterSyntaxError},
    lexer::Lexer,
};

/// Parses one filter clause, `property:operator[:value]`.
///
/// `group` is supplied by the caller with any `N:` prefix already removed.
/// Everything after the second `:` is the value, taken verbatim.
pub fn parse_filter(raw: &str, group: GroupId) -> Result<FilterNode, FilterSyntaxError> {
    let fail = |reason| FilterSyntaxError::new(raw, reason);

    let mut parts = raw.splitn(3, ':');
    let property = parts.next().unwrap_or_default().trim();
    let operator = parts.next().map(str::trim);
    let value = parts.next().filter(|v| !v.is_empty());

    if property.is_empty() {
        return Err(fail(FilterErrorReason::MissingProperty));
    }
    let operator_text = match operator {
        Some(text) if !text.is_empty() => text,
        _ => return Err(fail(FilterErrorReason::MissingOperator)),
    };

    let property = parse_property(property).map_err(fail)?;
    let operator = Operator::parse(operator_text)
        .ok_or_else(|| fail(FilterErrorReason::UnknownOperator(operator_text.to_string())))?;
    let value = parse_value(&property, operator, value).map_err(fail)?;

    trace!(raw, %operator, "parsed filter");
    Ok(FilterNode {
        group,
        property,
        operator,
        value,
    })
}

/// `_`, `.` or a dotted path of names and indices.
fn parse_property(text: &str) -> Result<PropertyPath, FilterErrorReason> {
    match text {
        "_" => return Ok(PropertyPath::Key),
        "." => return Ok(PropertyPath::Root),
        _ => {}
    }

    let illegal = || FilterErrorReason::IllegalProperty(text.to_string());
    let mut segments = Vec::new();
    let mut expect_name = true;

    for token in Lexer::tokenize(text) {
        match (token.kind, expect_name) {
            (TokenKind::Identifier | TokenKind::String, true) => {
                segments.push(token.literal().into_owned());
                expect_name = false;
            }
            // `0.1` lexes as a single number
            (TokenKind::Number, true) => {
                segments.extend(token.text.split('.').map(str::to_string));
                expect_name = false;
            }
            (TokenKind::Dot, false) => expect_name = true,
            (TokenKind::Eof, false) => return Ok(PropertyPath::Path(segments)),
            _ => return Err(illegal()),
        }
    }
    Err(illegal())
}

fn parse_value(
    property: &PropertyPath,
    operator: Operator,
    value: Option<&str>,
) -> Result<FilterValue, FilterErrorReason> {
    if operator.kind.is_unary() {
        if property.is_key() {
            return Err(FilterErrorReason::KeyWithUnaryOperator);
        }
        return match value {
            Some(_) => Err(FilterErrorReason::UnexpectedValue(operator)),
            None => Ok(FilterValue::None),
        };
    }

    let value = value.ok_or(FilterErrorReason::MissingValue(operator))?;

    if operator.kind == OpKind::In {
        return parse_list(value)
            .map(FilterValue::List)
            .ok_or_else(|| FilterErrorReason::MalformedArray(value.to_string()));
    }

    if looks_like_list(value) {
        let mut items =
            parse_list(value).ok_or_else(|| FilterErrorReason::MalformedArray(value.to_string()))?;
        return match items.len() {
            1 => Ok(FilterValue::Single(items.remove(0))),
            _ => Err(FilterErrorReason::TooManyValues(operator)),
        };
    }

    Ok(FilterValue::Single(Literal::new(value)))
}

fn looks_like_list(value: &str) -> bool {
    let value = value.trim();
    value.starts_with('[') && value.ends_with(']')
}

/// Parses an array literal, `[a, 'b,c', d]`.
///
/// Items are trimmed and may be quoted. Returns `None` when the text is not a
/// single well-formed bracketed list.
pub fn parse_list(value: &str) -> Option<Vec<Literal>> {
    let inner = value.trim().strip_prefix('[')?.strip_suffix(']')?;
    if inner.trim().is_empty() {
        return Some(Vec::new());
    }

    let mut items = Vec::new();
    for item in split_top_level(inner, ',') {
        let item = item.trim();
        if item.contains(['[', ']']) && !is_quoted(item) {
            return None;
        }
        items.push(Literal::new(unquote(item)?));
    }
    Some(items)
}

fn is_quoted(item: &str) -> bool {
    item.len() >= 2
        && ((item.starts_with('\'') && item.ends_with('\''))
            || (item.starts_with('"') && item.ends_with('"')))
}

fn unquote(item: &str) -> Option<String> {
    if !item.starts_with(['\'', '"']) {
        return Some(item.to_string());
    }
    let tokens = Lexer::tokenize(item);
    match tokens.as_slice() {
        [string, eof] if string.kind == TokenKind::String && eof.kind == TokenKind::Eof => {
            Some(string.literal().into_owned())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_keeps_colons() {
        let filter = parse_filter("time:eq:12:30", GroupId::Default).unwrap();
        assert_eq!(filter.value, FilterValue::Single(Literal::new("12:30")));
    }

    #[test]
    fn quoted_list_items() {
        let items = parse_list("[ a , 'b,c' ]").unwrap();
        assert_eq!(items, vec![Literal::new("a"), Literal::new("b,c")]);
        assert_eq!(parse_list("[a,'b]"), None);
        assert_eq!(parse_list("a,b"), None);
    }
}
