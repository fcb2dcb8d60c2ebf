//! Binding of the `fields`, `filter`, `rootJunction`, `headless` and `order`
//! query parameters.
//!
//! Binding is all-or-nothing: the first parameter that fails to parse fails
//! the request, before anything is evaluated.

use std::sync::Arc;

use tracing::debug;

use crate::{
    ast::{FieldNode, FilterGroup, FilterNode, GroupId, Junction, Operator},
    cache::ParseCache,
    error::QueryError,
    parser::{parse_fields, parse_filter, split_top_level},
};

/// Raw query parameters as received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pub fields: Option<String>,
    /// Repeatable; a comma followed by a new `property:operator` starts
    /// another filter within the same value
    pub filter: Vec<String>,
    pub root_junction: Option<String>,
    pub headless: bool,
    /// Passed through untouched
    pub order: Vec<String>,
}

impl QueryParams {
    pub fn fields(mut self, fields: impl Into<String>) -> Self {
        self.fields = Some(fields.into());
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter.push(filter.into());
        self
    }

    pub fn root_junction(mut self, junction: impl Into<String>) -> Self {
        self.root_junction = Some(junction.into());
        self
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn order(mut self, order: impl Into<String>) -> Self {
        self.order.push(order.into());
        self
    }
}

/// The parsed form of [`QueryParams`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    /// `None` when the parameter was absent; the caller picks the default
    pub fields: Option<Arc<[FieldNode]>>,
    pub filter: Arc<FilterGroup>,
    pub headless: bool,
    pub order: Vec<String>,
}

/// Parses all parameters, through `cache` when one is given.
pub fn parse_query(params: &QueryParams, cache: Option<&ParseCache>) -> Result<ParsedQuery, QueryError> {
    let root_junction = match &params.root_junction {
        None => Junction::default(),
        Some(text) => text
            .trim()
            .parse::<Junction>()
            .map_err(|_| QueryError::IllegalParameter {
                name: "rootJunction",
                value: text.clone(),
            })?,
    };

    let fields = match &params.fields {
        None => None,
        Some(text) => Some(match cache {
            Some(cache) => cache.fields(text)?,
            None => Arc::from(parse_fields(text)?),
        }),
    };

    let mut filter = FilterGroup::new(root_junction);
    for value in &params.filter {
        for raw in clauses(value) {
            filter.push(bind_filter(raw.trim(), cache)?);
        }
    }

    debug!(
        fields = fields.as_ref().map(|f| f.len()),
        filters = filter.len(),
        junction = %root_junction,
        "bound query parameters"
    );

    Ok(ParsedQuery {
        fields,
        filter: Arc::new(filter),
        headless: params.headless,
        order: params.order.clone(),
    })
}

/// Splits one `filter` value into clauses. Other commas belong to the
/// value before them (`name:eq:Smith, John`).
fn clauses(value: &str) -> Vec<String> {
    let mut clauses: Vec<String> = Vec::new();
    for piece in split_top_level(value, ',') {
        if piece.trim().is_empty() {
            continue;
        }
        match clauses.last_mut() {
            Some(last) if !starts_clause(piece) => {
                last.push(',');
                last.push_str(piece);
            }
            _ => clauses.push(piece.to_string()),
        }
    }
    clauses
}

fn starts_clause(piece: &str) -> bool {
    let (_, clause) = split_group(piece.trim());
    let mut parts = clause.splitn(3, ':');
    parts.next();
    parts
        .next()
        .is_some_and(|operator| Operator::parse(operator.trim()).is_some())
}

fn bind_filter(raw: &str, cache: Option<&ParseCache>) -> Result<FilterNode, QueryError> {
    let (group, clause) = split_group(raw);
    Ok(match cache {
        Some(cache) => FilterNode::clone(&*cache.filter(clause, group)?),
        None => parse_filter(clause, group)?,
    })
}

/// Strips an `N:` group prefix. Digits followed by an operator are a
/// numeric property (`0:eq:x`), not a group. Group `0` is the default
/// group.
pub fn split_group(raw: &str) -> (GroupId, &str) {
    let Some((prefix, rest)) = raw.split_once(':') else {
        return (GroupId::Default, raw);
    };
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return (GroupId::Default, raw);
    }
    let next = rest.split(':').next().unwrap_or_default();
    if Operator::parse(next.trim()).is_some() {
        return (GroupId::Default, raw);
    }
    match prefix.parse() {
        Ok(0) => (GroupId::Default, rest),
        Ok(id) => (GroupId::Explicit(id), rest),
        Err(_) => (GroupId::Default, raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_prefix() {
        assert_eq!(split_group("1:name:eq:x"), (GroupId::Explicit(1), "name:eq:x"));
        assert_eq!(split_group("0:eq:x"), (GroupId::Default, "0:eq:x"));
        assert_eq!(split_group("name:eq:1"), (GroupId::Default, "name:eq:1"));
        assert_eq!(split_group("12:eats.0:null"), (GroupId::Explicit(12), "eats.0:null"));
        assert_eq!(split_group("0:name:eq:x"), (GroupId::Default, "name:eq:x"));
    }

    #[test]
    fn one_parameter_many_filters() {
        let params = QueryParams::default().filter("name:eq:a,_:in:[x,y]");
        let query = parse_query(&params, None).unwrap();
        assert_eq!(query.filter.len(), 2);
    }

    #[test]
    fn commas_inside_a_value() {
        let params = QueryParams::default().filter("name:eq:Smith, John,1:age:gt:3");
        let query = parse_query(&params, None).unwrap();
        let filters: Vec<String> = query.filter.filters().map(|f| f.to_string()).collect();
        assert_eq!(filters, vec!["name:eq:Smith, John", "age:gt:3"]);
    }

    #[test]
    fn bad_root_junction() {
        let params = QueryParams::default().root_junction("XOR");
        let err = parse_query(&params, None).unwrap_err();
        assert_eq!(err.to_string(), "Illegal value `XOR` for parameter `rootJunction`");
    }
}
