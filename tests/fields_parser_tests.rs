// tests/fields_parser_tests.rs

use gistql::ast::{FieldNode, Transform};
use gistql::error::FieldsSyntaxError;
use gistql::parse_fields;
use pretty_assertions::assert_eq;

fn parse(input: &str) -> Vec<FieldNode> {
    parse_fields(input).unwrap_or_else(|e| panic!("{input}: {e}"))
}

fn message(input: &str) -> String {
    parse_fields(input).unwrap_err().to_string()
}

// ============================================================================
// Field Lists
// ============================================================================

#[test]
fn test_simple_list() {
    assert_eq!(
        parse("name,code"),
        vec![FieldNode::new("name"), FieldNode::new("code")]
    );
}

#[test]
fn test_empty_expression_selects_nothing() {
    assert_eq!(parse(""), vec![]);
    assert_eq!(parse(" , ,"), vec![]);
}

#[test]
fn test_reserved_names() {
    assert_eq!(
        parse("_,.,*"),
        vec![
            FieldNode::new(FieldNode::KEY),
            FieldNode::new(FieldNode::ROOT),
            FieldNode::new(FieldNode::ALL),
        ]
    );
}

#[test]
fn test_all_preset() {
    assert_eq!(parse(":all,!code"), vec![
        FieldNode::new("*"),
        FieldNode::new("code").excluded(),
    ]);
}

#[test]
fn test_other_presets_are_unsupported() {
    let err = parse_fields(":simple").unwrap_err();
    assert_eq!(err, FieldsSyntaxError::UnsupportedField { preset: "simple".into() });
    assert_eq!(err.to_string(), "Field not supported: `:simple`");
}

#[test]
fn test_quoted_names() {
    assert_eq!(parse("'first name'"), vec![FieldNode::new("first name")]);
}

// ============================================================================
// Exclusion
// ============================================================================

#[test]
fn test_both_exclusion_markers() {
    assert_eq!(
        parse("*,!code,-name"),
        vec![
            FieldNode::new("*"),
            FieldNode::new("code").excluded(),
            FieldNode::new("name").excluded(),
        ]
    );
}

#[test]
fn test_exclusion_without_all_implies_all() {
    assert_eq!(
        parse("!code,name"),
        vec![
            FieldNode::new("*"),
            FieldNode::new("code").excluded(),
            FieldNode::new("name"),
        ]
    );
    assert_eq!(parse("name"), vec![FieldNode::new("name")]);
}

#[test]
fn test_exclusion_only_at_the_top_level() {
    let err = parse_fields("a[!b]").unwrap_err();
    assert!(matches!(err, FieldsSyntaxError::Unexpected { position: 2, .. }), "{err:?}");
    assert_eq!(parse_fields("a(-b)").unwrap_err().position(), Some(2));
}

#[test]
fn test_presets_inside_brackets() {
    assert_eq!(
        parse("group[:all]"),
        vec![FieldNode::new("group").with_child(FieldNode::new("*"))]
    );
}

// ============================================================================
// Nesting
// ============================================================================

#[test]
fn test_brackets_and_parens_are_interchangeable() {
    let expected = vec![
        FieldNode::new("group")
            .with_child(FieldNode::new("id"))
            .with_child(FieldNode::new("name")),
    ];
    assert_eq!(parse("group[id,name]"), expected);
    assert_eq!(parse("group(id,name)"), expected);
    assert_eq!(parse("group[id,name)"), expected);
}

#[test]
fn test_dotted_path_nests() {
    assert_eq!(
        parse("owner.group.name"),
        vec![FieldNode::new("owner").with_child(
            FieldNode::new("group").with_child(FieldNode::new("name"))
        )]
    );
}

#[test]
fn test_deep_nesting() {
    assert_eq!(
        parse("a[b[c,d],e]"),
        vec![FieldNode::new("a")
            .with_child(
                FieldNode::new("b")
                    .with_child(FieldNode::new("c"))
                    .with_child(FieldNode::new("d"))
            )
            .with_child(FieldNode::new("e"))]
    );
}

#[test]
fn test_index_children() {
    let fields = parse("eats.0");
    assert_eq!(fields[0].index_child().map(|(i, _)| i), Some(0));
}

// ============================================================================
// Transforms
// ============================================================================

#[test]
fn test_transform_markers() {
    let expected = vec![FieldNode::new("users").with_transform(Transform::Size)];
    assert_eq!(parse("users~size"), expected);
    assert_eq!(parse("users::size"), expected);
}

#[test]
fn test_transforms_chain_in_order() {
    assert_eq!(
        parse("users~pluck(name)~rename(names)"),
        vec![FieldNode::new("users")
            .with_transform(Transform::Pluck(Some("name".into())))
            .with_transform(Transform::Rename("names".into()))]
    );
}

#[test]
fn test_transform_names_ignore_case() {
    assert_eq!(
        parse("users~isEmpty,groups~ID-OBJECTS"),
        vec![
            FieldNode::new("users").with_transform(Transform::IsEmpty),
            FieldNode::new("groups").with_transform(Transform::IdObjects),
        ]
    );
}

#[test]
fn test_transform_then_children() {
    assert_eq!(
        parse("group~rename(team)[id]"),
        vec![FieldNode::new("group")
            .with_transform(Transform::Rename("team".into()))
            .with_child(FieldNode::new("id"))]
    );
}

#[test]
fn test_root_hoist() {
    assert_eq!(
        parse(".~hoist(name)"),
        vec![FieldNode::new(".").with_transform(Transform::Hoist(Some("name".into())))]
    );
}

#[test]
fn test_unknown_transform() {
    assert_eq!(
        message("name~shout"),
        "Illegal fields expression. Unknown transformation `shout` at position 5"
    );
}

#[test]
fn test_wrong_arity_is_unknown() {
    assert!(matches!(
        parse_fields("name~rename"),
        Err(FieldsSyntaxError::UnknownTransform { .. })
    ));
    assert!(matches!(
        parse_fields("users~size(3)"),
        Err(FieldsSyntaxError::UnknownTransform { .. })
    ));
}

// ============================================================================
// Syntax Errors
// ============================================================================

#[test]
fn test_illegal_quote_position() {
    let err = parse_fields("illegal'").unwrap_err();
    assert_eq!(err.position(), Some(7));
    assert_eq!(
        err.to_string(),
        "Illegal fields expression. Expected `,`, `[` or `]` at position 7 but found `'`"
    );
}

#[test]
fn test_positions_count_characters() {
    let err = parse_fields("größe'").unwrap_err();
    assert_eq!(err.position(), Some(5));
}

#[test]
fn test_unclosed_bracket() {
    assert_eq!(
        message("a,group[id"),
        "Illegal fields expression. Unclosed `[` at position 7"
    );
}

#[test]
fn test_unbalanced_closer() {
    assert_eq!(
        message("name]"),
        "Illegal fields expression. Unexpected `]` at position 4"
    );
}

#[test]
fn test_missing_name_after_dot() {
    assert_eq!(
        message("group.,"),
        "Illegal fields expression. Expected field name at position 6 but found `,`"
    );
}

#[test]
fn test_missing_transform_name() {
    assert_eq!(
        message("name~"),
        "Illegal fields expression. Expected transformation name at position 5 but found end of input"
    );
}
