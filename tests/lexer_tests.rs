// tests/lexer_tests.rs

use gistql::ast::{Token, TokenKind};
use gistql::lexer::Lexer;
use pretty_assertions::assert_eq;

fn kinds(input: &str) -> Vec<TokenKind> {
    Lexer::tokenize(input).into_iter().map(|t| t.kind).collect()
}

// ============================================================================
// Single Character Tokens
// ============================================================================

#[test]
fn test_single_char_tokens() {
    let test_cases = vec![
        (".", TokenKind::Dot),
        (",", TokenKind::Comma),
        (":", TokenKind::Colon),
        ("[", TokenKind::LBracket),
        ("]", TokenKind::RBracket),
        ("(", TokenKind::LParen),
        (")", TokenKind::RParen),
        ("!", TokenKind::Bang),
        ("-", TokenKind::Minus),
        ("~", TokenKind::Tilde),
        ("$", TokenKind::Dollar),
        ("^", TokenKind::Caret),
        ("*", TokenKind::Star),
        ("#", TokenKind::Other),
    ];

    for (input, expected) in test_cases {
        assert_eq!(kinds(input), vec![expected, TokenKind::Eof], "input: {input}");
    }
}

#[test]
fn test_empty_input_is_just_eof() {
    let tokens = Lexer::tokenize("");
    assert_eq!(
        tokens,
        vec![Token {
            kind: TokenKind::Eof,
            text: String::new(),
            position: 0,
        }]
    );
}

// ============================================================================
// Identifiers and Numbers
// ============================================================================

#[test]
fn test_identifiers_allow_dashes_and_underscores() {
    let tokens = Lexer::tokenize("not-member _ user_name");
    let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["not-member", "_", "user_name", ""]);
    assert!(tokens[..3].iter().all(|t| t.kind == TokenKind::Identifier));
}

#[test]
fn test_leading_dash_is_a_minus() {
    assert_eq!(
        kinds("-code"),
        vec![TokenKind::Minus, TokenKind::Identifier, TokenKind::Eof]
    );
}

#[test]
fn test_numbers_take_one_fraction() {
    let tokens = Lexer::tokenize("0.1.2");
    assert_eq!(tokens[0].kind, TokenKind::Number);
    assert_eq!(tokens[0].text, "0.1");
    assert_eq!(tokens[1].kind, TokenKind::Dot);
    assert_eq!(tokens[2].text, "2");
}

#[test]
fn test_trailing_dot_is_not_a_fraction() {
    assert_eq!(
        kinds("eats.0."),
        vec![
            TokenKind::Identifier,
            TokenKind::Dot,
            TokenKind::Number,
            TokenKind::Dot,
            TokenKind::Eof
        ]
    );
}

// ============================================================================
// Strings
// ============================================================================

#[test]
fn test_both_quote_styles() {
    let tokens = Lexer::tokenize(r#"'first name' "last name""#);
    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].literal(), "first name");
    assert_eq!(tokens[1].kind, TokenKind::String);
    assert_eq!(tokens[1].literal(), "last name");
}

#[test]
fn test_string_keeps_quotes_in_text() {
    let tokens = Lexer::tokenize("'a,b'");
    assert_eq!(tokens[0].text, "'a,b'");
    assert_eq!(tokens[0].literal(), "a,b");
}

#[test]
fn test_unterminated_quote_resumes_after_it() {
    let tokens = Lexer::tokenize("a'b");
    assert_eq!(
        tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
        vec![
            TokenKind::Identifier,
            TokenKind::Other,
            TokenKind::Identifier,
            TokenKind::Eof
        ]
    );
    assert_eq!(tokens[1].position, 1);
    assert_eq!(tokens[2].position, 2);
}

// ============================================================================
// Expressions
// ============================================================================

#[test]
fn test_fields_expression() {
    assert_eq!(
        kinds("group[id,name~rename(label)]"),
        vec![
            TokenKind::Identifier,
            TokenKind::LBracket,
            TokenKind::Identifier,
            TokenKind::Comma,
            TokenKind::Identifier,
            TokenKind::Tilde,
            TokenKind::Identifier,
            TokenKind::LParen,
            TokenKind::Identifier,
            TokenKind::RParen,
            TokenKind::RBracket,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_whitespace_is_skipped() {
    let tokens = Lexer::tokenize("  name ,\tcode ");
    assert_eq!(tokens.len(), 4);
    assert_eq!(tokens[0].position, 2);
    assert_eq!(tokens[2].position, 9);
    assert_eq!(tokens[3].position, 14);
}

#[test]
fn test_describe_for_messages() {
    let tokens = Lexer::tokenize("illegal'");
    assert_eq!(tokens[1].describe(), "`'`");
    assert_eq!(tokens[2].describe(), "end of input");
}
