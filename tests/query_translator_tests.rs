// tests/query_translator_tests.rs

use gistql::ast::Transform;
use gistql::evaluator::{Evaluator, FilterFragment, QueryParam, QueryTranslator};
use gistql::request::{QueryParams, parse_query};
use gistql::resolver::{PropertyHandle, Schema, TypeSchema, ValueType};
use gistql::{QueryError, parse_fields};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;

fn schema() -> Schema {
    Schema::new("User")
        .with_type(
            TypeSchema::new("User")
                .property(PropertyHandle::simple("id", ValueType::Text))
                .property(PropertyHandle::simple("name", ValueType::Text))
                .property(PropertyHandle::simple("surname", ValueType::Text).with_column("last_name"))
                .property(PropertyHandle::simple("age", ValueType::Integer))
                .property(PropertyHandle::simple("score", ValueType::Number))
                .property(PropertyHandle::simple("enabled", ValueType::Boolean))
                .property(PropertyHandle::reference("group", "UserGroup"))
                .property(PropertyHandle::collection("groups", "UserGroup"))
                .property(PropertyHandle::reference("settings", "Settings").embedded()),
        )
        .with_type(
            TypeSchema::new("UserGroup")
                .property(PropertyHandle::simple("id", ValueType::Text))
                .property(PropertyHandle::simple("name", ValueType::Text))
                .property(PropertyHandle::collection("users", "User")),
        )
        .with_type(TypeSchema::new("Settings").property(PropertyHandle::simple("locale", ValueType::Text)))
}

fn translate_params(params: QueryParams) -> Result<FilterFragment, QueryError> {
    let schema = schema();
    let query = parse_query(&params, None)?;
    QueryTranslator::new(&schema).eval_filter(&query.filter)
}

fn translate(raw: &str) -> FilterFragment {
    translate_params(QueryParams::default().filter(raw)).unwrap_or_else(|e| panic!("{raw}: {e}"))
}

fn clause(raw: &str) -> String {
    translate(raw).clause
}

fn error(raw: &str) -> String {
    translate_params(QueryParams::default().filter(raw))
        .unwrap_err()
        .to_string()
}

fn text(value: &str) -> QueryParam {
    QueryParam::Text(value.to_string())
}

fn param(name: &str, value: QueryParam) -> (String, QueryParam) {
    (name.to_string(), value)
}

// ============================================================================
// Simple Properties
// ============================================================================

#[test]
fn test_no_filters() {
    assert_eq!(translate_params(QueryParams::default()).unwrap(), FilterFragment {
        clause: "1=1".to_string(),
        params: vec![],
    });
}

#[test]
fn test_equality_binds_a_parameter() {
    assert_eq!(translate("name:eq:Paul"), FilterFragment {
        clause: "e.name = :f_0".to_string(),
        params: vec![param("f_0", text("Paul"))],
    });
}

#[test]
fn test_integer_against_text_compares_length() {
    assert_eq!(translate("name:eq:4"), FilterFragment {
        clause: "length(e.name) = :f_0".to_string(),
        params: vec![param("f_0", QueryParam::Integer(4))],
    });
}

#[test]
fn test_parameters_are_typed() {
    assert_eq!(translate("age:gt:18").params, vec![param("f_0", QueryParam::Integer(18))]);
    assert_eq!(
        translate("score:ge:2.5").params,
        vec![param("f_0", QueryParam::Number(Decimal::new(25, 1)))]
    );
    assert_eq!(translate("enabled:eq:TRUE").params, vec![param("f_0", QueryParam::Boolean(true))]);
}

#[test]
fn test_invalid_typed_value() {
    assert_eq!(
        error("age:eq:old"),
        "Illegal filter `age:eq:old`: value `old` is not a valid integer"
    );
}

#[test]
fn test_columns_may_differ_from_names() {
    assert_eq!(clause("surname:eq:x"), "e.last_name = :f_0");
    assert_eq!(columns("surname"), vec![column("surname", "e.last_name")]);
}

#[test]
fn test_negation_flips_the_symbol() {
    assert_eq!(clause("age:!lt:18"), "(e.age >= :f_0 or e.age is null)");
    assert_eq!(clause("age:!eq:18"), "(e.age != :f_0 or e.age is null)");
}

#[test]
fn test_negation_keeps_null_members() {
    assert_eq!(clause("name:!eq:Paul"), "(e.name != :f_0 or e.name is null)");
    assert_eq!(clause("name:!eq:4"), "(length(e.name) != :f_0 or e.name is null)");
    assert_eq!(clause("group:!eq:g1"), "(e.group.id != :f_0 or e.group.id is null)");
    assert_eq!(clause("name:!null"), "e.name is not null");
    assert_eq!(clause("name:!empty"), "length(e.name) > 0");
}

#[test]
fn test_null_and_empty() {
    assert_eq!(clause("name:null"), "e.name is null");
    assert_eq!(clause("name:!null"), "e.name is not null");
    assert_eq!(clause("name:empty"), "length(e.name) = 0");
    assert_eq!(clause("name:!empty"), "length(e.name) > 0");
    assert_eq!(
        error("age:empty"),
        "Illegal filter `age:empty`: operator `empty` cannot be used on `age`"
    );
}

#[test]
fn test_case_insensitive_equality() {
    assert_eq!(clause("name:ieq:paul"), "lower(e.name) = lower(:f_0)");
    assert_eq!(clause("name:!ieq:paul"), "(lower(e.name) != lower(:f_0) or e.name is null)");
}

#[test]
fn test_like_completion() {
    assert_eq!(translate("name:ilike:ann"), FilterFragment {
        clause: "e.name ilike :f_0 escape '\\'".to_string(),
        params: vec![param("f_0", text("%ann%"))],
    });
    assert_eq!(translate("name:!$like:An"), FilterFragment {
        clause: "(e.name not like :f_0 escape '\\' or e.name is null)".to_string(),
        params: vec![param("f_0", text("An%"))],
    });
    assert_eq!(translate("name:endsWith:son").params, vec![param("f_0", text("%son"))]);
    assert_eq!(translate("name:like:J*n?").params, vec![param("f_0", text("J%n_"))]);
}

#[test]
fn test_prefix_and_suffix_patterns_are_plain_text() {
    assert_eq!(translate("name:startsWith:R*").params, vec![param("f_0", text("R*%"))]);
    assert_eq!(translate("name:endsWith:?e").params, vec![param("f_0", text("%?e"))]);
}

#[test]
fn test_sql_wildcards_in_values_are_escaped() {
    assert_eq!(translate("name:like:100%_x").params, vec![param("f_0", text("%100\\%\\_x%"))]);
}

#[test]
fn test_in_binds_one_list() {
    assert_eq!(translate("age:!in:[1,2]"), FilterFragment {
        clause: "(e.age not in (:f_0) or e.age is null)".to_string(),
        params: vec![param(
            "f_0",
            QueryParam::List(vec![QueryParam::Integer(1), QueryParam::Integer(2)])
        )],
    });
}

// ============================================================================
// Key, References and Collections
// ============================================================================

#[test]
fn test_key_uses_the_identity_column() {
    assert_eq!(translate("_:in:[a,b]"), FilterFragment {
        clause: "e.id in (:f_0)".to_string(),
        params: vec![param("f_0", QueryParam::List(vec![text("a"), text("b")]))],
    });
}

#[test]
fn test_references_compare_by_identity() {
    assert_eq!(clause("group:eq:abc"), "e.group.id = :f_0");
    assert_eq!(clause("group:null"), "e.group is null");
    assert_eq!(clause("group.name:eq:x"), "e.group.name = :f_0");
}

#[test]
fn test_embedded_objects_navigate_without_identity() {
    assert_eq!(clause("settings.locale:eq:en"), "e.settings.locale = :f_0");
    assert_eq!(
        error("settings:eq:x"),
        "Illegal filter `settings:eq:x`: operator `eq` cannot be used on `settings`"
    );
}

#[test]
fn test_crossing_a_collection_opens_a_subquery() {
    assert_eq!(
        clause("groups.name:eq:admins"),
        "exists (select 1 from UserGroup t_0 where t_0 in elements(e.groups) and t_0.name = :f_0)"
    );
    assert_eq!(
        clause("groups.name:!eq:admins"),
        "not exists (select 1 from UserGroup t_0 where t_0 in elements(e.groups) and t_0.name = :f_0)"
    );
}

#[test]
fn test_nested_collections() {
    assert_eq!(
        clause("groups.users.name:null"),
        "exists (select 1 from UserGroup t_0 where t_0 in elements(e.groups) and \
         exists (select 1 from User t_1 where t_1 in elements(t_0.users) and t_1.name is null))"
    );
}

#[test]
fn test_collection_size_and_membership() {
    assert_eq!(clause("groups:empty"), "size(e.groups) = 0");
    assert_eq!(clause("groups:!empty"), "size(e.groups) > 0");
    assert_eq!(translate("groups:gt:2"), FilterFragment {
        clause: "size(e.groups) > :f_0".to_string(),
        params: vec![param("f_0", QueryParam::Integer(2))],
    });
    assert_eq!(
        clause("groups:in:[g1,g2]"),
        "exists (select 1 from UserGroup t_0 where t_0 in elements(e.groups) and t_0.id in (:f_0))"
    );
    assert_eq!(
        error("groups:like:x"),
        "Illegal filter `groups:like:x`: operator `like` cannot be used on `groups`"
    );
    assert_eq!(
        error("groups:eq:many"),
        "Illegal filter `groups:eq:many`: value `many` is not a valid collection size"
    );
}

#[test]
fn test_unknown_properties_fail_loudly() {
    assert_eq!(error("nope:eq:x"), "Unknown property `nope`");
    assert_eq!(error("group.nope:eq:x"), "Unknown property `group.nope`");
    assert_eq!(error(".:null"), "Unknown property `.`");
}

// ============================================================================
// Grouping
// ============================================================================

#[test]
fn test_groups_combine_with_the_opposite_junction() {
    let params = QueryParams::default()
        .filter("name:eq:a")
        .filter("1:age:gt:1")
        .filter("1:age:lt:5");
    assert_eq!(
        translate_params(params).unwrap().clause,
        "(e.name = :f_0) and (e.age > :f_1 or e.age < :f_2)"
    );
}

#[test]
fn test_single_group() {
    let params = QueryParams::default().filter("1:name:eq:a").filter("1:name:eq:b");
    assert_eq!(translate_params(params).unwrap().clause, "e.name = :f_0 or e.name = :f_1");
}

#[test]
fn test_root_junction_or() {
    let params = QueryParams::default()
        .filter("name:eq:a")
        .filter("age:eq:1")
        .root_junction("OR");
    assert_eq!(translate_params(params).unwrap().clause, "(e.name = :f_0) or (e.age = :f_1)");
}

// ============================================================================
// Fields
// ============================================================================

fn columns(fields: &str) -> Vec<(String, String)> {
    let schema = schema();
    let fields = parse_fields(fields).unwrap();
    QueryTranslator::new(&schema)
        .eval_fields(&fields)
        .unwrap()
        .columns
        .into_iter()
        .map(|c| (c.path, c.expression))
        .collect()
}

fn column(path: &str, expression: &str) -> (String, String) {
    (path.to_string(), expression.to_string())
}

#[test]
fn test_simple_and_reference_columns() {
    assert_eq!(columns("name,group,group.name,settings.locale,_,."), vec![
        column("name", "e.name"),
        column("group", "e.group.id"),
        column("group.name", "e.group.name"),
        column("settings.locale", "e.settings.locale"),
        column("id", "e.id"),
        column("value", "e"),
    ]);
}

#[test]
fn test_collections_are_reduced() {
    assert_eq!(columns("groups~size,groups~ids,groups~pluck(name),groups"), vec![
        column("groups", "size(e.groups)"),
        column(
            "groups",
            "(select array_agg(t_0.id) from UserGroup t_0 where t_0 in elements(e.groups))"
        ),
        column(
            "groups",
            "(select array_agg(t_1.name) from UserGroup t_1 where t_1 in elements(e.groups))"
        ),
        column("groups", "cast(null as char)"),
    ]);
}

#[test]
fn test_member_binds_a_parameter() {
    let schema = schema();
    let fields = parse_fields("groups~member(g1)~rename(admin)").unwrap();
    let projection = QueryTranslator::new(&schema).eval_fields(&fields).unwrap();
    assert_eq!(projection.columns[0].path, "admin");
    assert_eq!(
        projection.columns[0].expression,
        "(select count(*) from UserGroup t_0 where t_0 in elements(e.groups) and t_0.id = :p_0)"
    );
    assert_eq!(
        projection.columns[0].transforms,
        vec![Transform::Member("g1".into()), Transform::Rename("admin".into())]
    );
    assert_eq!(projection.params, vec![param("p_0", text("g1"))]);
}

#[test]
fn test_paths_through_collections_aggregate() {
    assert_eq!(columns("groups.name"), vec![column(
        "groups.name",
        "(select array_agg(t_0.name) from UserGroup t_0 where t_0 in elements(e.groups))"
    )]);
}

#[test]
fn test_all_expands_minus_exclusions() {
    let paths: Vec<String> = columns("*,!age,!groups").into_iter().map(|(p, _)| p).collect();
    assert_eq!(paths, vec!["enabled", "group", "id", "name", "score", "settings", "surname"]);
}

#[test]
fn test_empty_fields_select_the_identity() {
    assert_eq!(columns(""), vec![column("id", "e.id")]);
}

#[test]
fn test_unknown_field() {
    let schema = schema();
    let fields = parse_fields("groups~pluck(nope)").unwrap();
    let err = QueryTranslator::new(&schema).eval_fields(&fields).unwrap_err();
    assert_eq!(err.to_string(), "Unknown property `groups.nope`");
}

// ============================================================================
// Select Statements
// ============================================================================

#[test]
fn test_build_select() {
    let schema = schema();
    let query = parse_query(
        &QueryParams::default()
            .fields("name")
            .filter("age:gt:18")
            .order("name:desc"),
        None,
    )
    .unwrap();
    let select = QueryTranslator::new(&schema)
        .build_select("User", query.fields.as_deref(), &query.filter, &query.order)
        .unwrap();
    assert_eq!(select.hql, "select e.name from User e where e.age > :f_0 order by e.name desc");
    assert_eq!(select.params, vec![param("f_0", QueryParam::Integer(18))]);
}

#[test]
fn test_build_select_defaults() {
    let schema = schema();
    let query = parse_query(&QueryParams::default(), None).unwrap();
    let select = QueryTranslator::new(&schema)
        .build_select("User", None, &query.filter, &[])
        .unwrap();
    assert_eq!(select.hql, "select e from User e where 1=1 order by e.id asc");
}

#[test]
fn test_illegal_order() {
    let schema = schema();
    let translator = QueryTranslator::new(&schema);
    let filter = parse_query(&QueryParams::default(), None).unwrap().filter;
    for order in ["groups", "name:sideways"] {
        let err = translator
            .build_select("User", None, &filter, &[order.to_string()])
            .unwrap_err();
        assert_eq!(err.to_string(), format!("Illegal value `{order}` for parameter `order`"));
    }
}
