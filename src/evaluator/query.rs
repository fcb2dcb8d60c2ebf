use std::collections::HashSet;

use rust_decimal::Decimal;
use tracing::debug;

use super::Evaluator;
use crate::{
    ast::{
        Anchor, FieldNode, FilterGroup, FilterNode, Junction, Literal, OpKind,
        Operator, PropertyPath, Term, Transform,
    },
    error::{FilterErrorReason, FilterSyntaxError, QueryError, UnknownProperty},
    resolver::{PropertyHandle, PropertyKind, PropertyResolver, ValueType},
};

/// A typed query parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryParam {
    Text(String),
    Integer(i64),
    Number(Decimal),
    Boolean(bool),
    List(Vec<QueryParam>),
}

/// A translated filter: a clause over the element alias `e` plus the
/// parameters it binds.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterFragment {
    pub clause: String,
    pub params: Vec<(String, QueryParam)>,
}

/// One selected column. `path` is the dotted output path, `transforms` the
/// ones still to run on the fetched value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectColumn {
    pub path: String,
    pub expression: String,
    pub transforms: Vec<Transform>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Projection {
    pub columns: Vec<SelectColumn>,
    pub params: Vec<(String, QueryParam)>,
}

/// A complete select statement and its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectQuery {
    pub hql: String,
    pub params: Vec<(String, QueryParam)>,
}

/// Parameter and alias numbering for one translation.
struct Scope {
    prefix: &'static str,
    params: Vec<(String, QueryParam)>,
    tables: usize,
}

impl Scope {
    fn new(prefix: &'static str) -> Self {
        Scope {
            prefix,
            params: Vec::new(),
            tables: 0,
        }
    }

    fn param(&mut self, value: QueryParam) -> String {
        let name = format!("{}_{}", self.prefix, self.params.len());
        self.params.push((name.clone(), value));
        name
    }

    fn table(&mut self) -> String {
        let name = format!("t_{}", self.tables);
        self.tables += 1;
        name
    }
}

/// The filter being translated, for error reporting.
struct Clause<'f> {
    filter: &'f FilterNode,
    operator: Operator,
}

impl Clause<'_> {
    fn error(&self, reason: FilterErrorReason) -> QueryError {
        FilterSyntaxError::new(self.filter.to_string(), reason).into()
    }

    fn unsupported(&self) -> QueryError {
        self.error(FilterErrorReason::UnsupportedOperator {
            operator: self.filter.operator,
            property: self.filter.property.to_string(),
        })
    }

    fn literal(&self) -> Result<&Literal, QueryError> {
        self.filter
            .value
            .single()
            .ok_or_else(|| self.error(FilterErrorReason::MissingValue(self.filter.operator)))
    }

    fn typed(&self, value_type: ValueType, literal: &Literal) -> Result<QueryParam, QueryError> {
        let invalid = || {
            self.error(FilterErrorReason::InvalidValue {
                value: literal.text.clone(),
                expected: value_type.name(),
            })
        };
        Ok(match value_type {
            ValueType::Text => QueryParam::Text(literal.text.clone()),
            ValueType::Integer => QueryParam::Integer(literal.as_integer().ok_or_else(invalid)?),
            ValueType::Number => QueryParam::Number(literal.as_decimal().ok_or_else(invalid)?),
            ValueType::Boolean => QueryParam::Boolean(literal.as_bool().ok_or_else(invalid)?),
        })
    }

    fn size(&self, literal: &Literal) -> Result<QueryParam, QueryError> {
        literal.as_integer().map(QueryParam::Integer).ok_or_else(|| {
            self.error(FilterErrorReason::InvalidValue {
                value: literal.text.clone(),
                expected: "collection size",
            })
        })
    }
}

/// Builds query fragments from the IR, HQL-style, with `e` as the element
/// alias.
///
/// Paths are resolved through the [`PropertyResolver`]; a path it does not
/// know fails the whole translation.
pub struct QueryTranslator<'r, R: PropertyResolver> {
    resolver: &'r R,
}

impl<'r, R: PropertyResolver> QueryTranslator<'r, R> {
    pub fn new(resolver: &'r R) -> Self {
        QueryTranslator { resolver }
    }

    /// `select <columns> from <table> e where <filter> order by <order>`
    ///
    /// Without `fields` the whole element is selected. Each `order` entry is
    /// `property` or `property:asc|desc`.
    pub fn build_select(
        &self,
        table: &str,
        fields: Option<&[FieldNode]>,
        filter: &FilterGroup,
        order: &[String],
    ) -> Result<SelectQuery, QueryError> {
        let where_clause = self.eval_filter(filter)?;
        let (columns, projection_params) = match fields {
            Some(fields) => {
                let projection = self.eval_fields(fields)?;
                let columns: Vec<&str> = projection
                    .columns
                    .iter()
                    .map(|c| c.expression.as_str())
                    .collect();
                (columns.join(", "), projection.params)
            }
            None => ("e".to_string(), Vec::new()),
        };
        let order = self.order_clause(order)?;

        let hql = format!(
            "select {columns} from {table} e where {} order by {order}",
            where_clause.clause
        );
        debug!(%hql, "built select");

        let mut params = where_clause.params;
        params.extend(projection_params);
        Ok(SelectQuery { hql, params })
    }

    fn order_clause(&self, order: &[String]) -> Result<String, QueryError> {
        let mut items = Vec::new();
        for entry in order.iter().flat_map(|o| o.split(',')) {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let (property, direction) = match entry.split_once(':') {
                Some((property, direction)) => (property, direction.to_ascii_lowercase()),
                None => (entry, "asc".to_string()),
            };
            if direction != "asc" && direction != "desc" {
                return Err(QueryError::IllegalParameter {
                    name: "order",
                    value: entry.to_string(),
                });
            }
            let path: Vec<String> = property.split('.').map(str::to_string).collect();
            let handles = self.resolver.resolve(&path)?;
            if handles.iter().any(PropertyHandle::is_collection) {
                return Err(QueryError::IllegalParameter {
                    name: "order",
                    value: entry.to_string(),
                });
            }
            let columns: Vec<&str> = handles.iter().map(|h| h.column.as_str()).collect();
            items.push(format!("e.{} {direction}", columns.join(".")));
        }
        if items.is_empty() {
            items.push(format!("e.{} asc", self.resolver.identity().column));
        }
        Ok(items.join(", "))
    }

    // ========================================
    // Filters
    // ========================================

    fn filter_clause(&self, scope: &mut Scope, filter: &FilterNode) -> Result<String, QueryError> {
        let clause = Clause {
            filter,
            operator: filter.operator,
        };
        match &filter.property {
            PropertyPath::Key => {
                let identity = self.resolver.identity();
                let member = format!("e.{}", identity.column);
                self.simple_predicate(scope, &clause, &member, &identity)
            }
            PropertyPath::Root => Err(UnknownProperty::new(".").into()),
            PropertyPath::Path(segments) => {
                let handles = self.resolver.resolve(segments)?;
                self.path_predicate(scope, &clause, "e", &handles)
            }
        }
    }

    /// Walks the handle chain. References and embedded objects navigate
    /// like columns; crossing a collection opens an `exists` subquery.
    fn path_predicate(
        &self,
        scope: &mut Scope,
        clause: &Clause<'_>,
        owner: &str,
        handles: &[PropertyHandle],
    ) -> Result<String, QueryError> {
        let Some((head, rest)) = handles.split_first() else {
            return Err(UnknownProperty::new(clause.filter.property.to_string()).into());
        };
        let member = format!("{owner}.{}", head.column);

        if rest.is_empty() {
            return match head.kind {
                PropertyKind::Simple => self.simple_predicate(scope, clause, &member, head),
                PropertyKind::Reference => self.reference_predicate(scope, clause, &member, head),
                PropertyKind::Collection => self.collection_predicate(scope, clause, &member, head),
            };
        }

        if head.kind != PropertyKind::Collection {
            return self.path_predicate(scope, clause, &member, rest);
        }

        // no element may match `!op`, so negation goes outside the subquery
        let table = scope.table();
        let positive = Clause {
            filter: clause.filter,
            operator: Operator::new(clause.operator.kind),
        };
        let inner = self.path_predicate(scope, &positive, &table, rest)?;
        Ok(format!(
            "{}exists (select 1 from {} {table} where {table} in elements({member}) and {inner})",
            if clause.operator.negated { "not " } else { "" },
            item_type(head),
        ))
    }

    /// Negated comparisons also hold for null members, as `!op` is the
    /// complement of `op`.
    fn simple_predicate(
        &self,
        scope: &mut Scope,
        clause: &Clause<'_>,
        member: &str,
        handle: &PropertyHandle,
    ) -> Result<String, QueryError> {
        let not = clause.operator.negated;
        match clause.operator.kind {
            OpKind::Null => Ok(format!("{member} is {}null", if not { "not " } else { "" })),
            OpKind::Empty if handle.value_type == ValueType::Text => Ok(format!(
                "length({member}) {} 0",
                if not { ">" } else { "=" }
            )),
            OpKind::Empty => Err(clause.unsupported()),
            _ => {
                let predicate = self.binary_predicate(scope, clause, member, handle)?;
                Ok(if not {
                    format!("({predicate} or {member} is null)")
                } else {
                    predicate
                })
            }
        }
    }

    fn binary_predicate(
        &self,
        scope: &mut Scope,
        clause: &Clause<'_>,
        member: &str,
        handle: &PropertyHandle,
    ) -> Result<String, QueryError> {
        let not = clause.operator.negated;
        match clause.operator.kind {
            OpKind::In => {
                let values = clause
                    .filter
                    .value
                    .literals()
                    .iter()
                    .map(|lit| clause.typed(handle.value_type, lit))
                    .collect::<Result<Vec<_>, _>>()?;
                let name = scope.param(QueryParam::List(values));
                Ok(format!("{member} {}in (:{name})", if not { "not " } else { "" }))
            }
            OpKind::IEq => {
                let literal = clause.literal()?;
                let name = scope.param(QueryParam::Text(literal.text.clone()));
                Ok(format!(
                    "lower({member}) {} lower(:{name})",
                    if not { "!=" } else { "=" }
                ))
            }
            OpKind::Like {
                case_insensitive,
                anchor,
            } => {
                let literal = clause.literal()?;
                let name = scope.param(QueryParam::Text(complete_like(literal.as_str(), anchor)));
                let keyword = if case_insensitive { "ilike" } else { "like" };
                Ok(format!(
                    "{member} {}{keyword} :{name} escape '\\'",
                    if not { "not " } else { "" }
                ))
            }
            kind => {
                let literal = clause.literal()?;
                let symbol = comparison_symbol(kind, not);
                match (handle.value_type, literal.as_integer()) {
                    (ValueType::Text, Some(len)) => {
                        let name = scope.param(QueryParam::Integer(len));
                        Ok(format!("length({member}) {symbol} :{name}"))
                    }
                    (value_type, _) => {
                        let name = scope.param(clause.typed(value_type, literal)?);
                        Ok(format!("{member} {symbol} :{name}"))
                    }
                }
            }
        }
    }

    /// References compare by identity: `owner:eq:x` is `owner.id:eq:x`.
    fn reference_predicate(
        &self,
        scope: &mut Scope,
        clause: &Clause<'_>,
        member: &str,
        handle: &PropertyHandle,
    ) -> Result<String, QueryError> {
        match clause.operator.kind {
            OpKind::Null => Ok(format!(
                "{member} is {}null",
                if clause.operator.negated { "not " } else { "" }
            )),
            OpKind::Empty => Err(clause.unsupported()),
            _ if handle.embedded => Err(clause.unsupported()),
            _ => {
                let identity = self.resolver.identity();
                let member = format!("{member}.{}", identity.column);
                self.simple_predicate(scope, clause, &member, &identity)
            }
        }
    }

    /// Collections filter by size, emptiness or (short syntax) member
    /// identity: `items:in:[x]` is `items.id:in:[x]`.
    fn collection_predicate(
        &self,
        scope: &mut Scope,
        clause: &Clause<'_>,
        member: &str,
        handle: &PropertyHandle,
    ) -> Result<String, QueryError> {
        let not = clause.operator.negated;
        match clause.operator.kind {
            OpKind::Empty => Ok(format!("size({member}) {} 0", if not { ">" } else { "=" })),
            OpKind::In => {
                let identity = self.resolver.identity();
                let table = scope.table();
                let positive = Clause {
                    filter: clause.filter,
                    operator: Operator::new(OpKind::In),
                };
                let inner = self.simple_predicate(
                    scope,
                    &positive,
                    &format!("{table}.{}", identity.column),
                    &identity,
                )?;
                Ok(format!(
                    "{}exists (select 1 from {} {table} where {table} in elements({member}) and {inner})",
                    if not { "not " } else { "" },
                    item_type(handle),
                ))
            }
            kind if kind.is_comparison() => {
                let literal = clause.literal()?;
                let name = scope.param(clause.size(literal)?);
                Ok(format!(
                    "size({member}) {} :{name}",
                    comparison_symbol(kind, not)
                ))
            }
            _ => Err(clause.unsupported()),
        }
    }

    // ========================================
    // Fields
    // ========================================

    fn field_columns(
        &self,
        scope: &mut Scope,
        nodes: &[FieldNode],
        path: &[String],
        output: &[String],
        columns: &mut Vec<SelectColumn>,
    ) -> Result<(), QueryError> {
        let excluded: HashSet<&str> = nodes
            .iter()
            .filter(|n| n.excluded)
            .map(|n| n.name.as_str())
            .collect();
        let listed: HashSet<&str> = nodes
            .iter()
            .filter(|n| !n.excluded)
            .map(|n| n.name.as_str())
            .collect();

        for node in nodes {
            if node.excluded || excluded.contains(node.name.as_str()) {
                continue;
            }
            if node.is_all() {
                for name in self.resolver.properties(path)? {
                    if excluded.contains(name.as_str()) || listed.contains(name.as_str()) {
                        continue;
                    }
                    let child = FieldNode::new(name);
                    self.field_column(scope, &child, path, output, columns)?;
                }
                continue;
            }
            self.field_column(scope, node, path, output, columns)?;
        }
        Ok(())
    }

    fn field_column(
        &self,
        scope: &mut Scope,
        node: &FieldNode,
        path: &[String],
        output: &[String],
        columns: &mut Vec<SelectColumn>,
    ) -> Result<(), QueryError> {
        let mut output = output.to_vec();

        if node.is_root() && path.is_empty() {
            output.push(match node.output_key() {
                FieldNode::ROOT => "value".to_string(),
                renamed => renamed.to_string(),
            });
            columns.push(column(&output, "e".to_string(), node));
            return Ok(());
        }

        if node.is_key() {
            let identity = self.resolver.identity();
            output.push(match node.output_key() {
                FieldNode::KEY => identity.name.clone(),
                renamed => renamed.to_string(),
            });
            let mut members = vec!["e".to_string()];
            if !path.is_empty() {
                let handles = self.resolver.resolve(path)?;
                members.extend(handles.iter().map(|h| h.column.clone()));
            }
            members.push(identity.column);
            columns.push(column(&output, members.join("."), node));
            return Ok(());
        }

        let mut path = path.to_vec();
        path.push(node.name.clone());
        output.push(node.output_key().to_string());

        if !node.children.is_empty() {
            return self.field_columns(scope, &node.children, &path, &output, columns);
        }

        let expression = self.column_expression(scope, &path, &node.transforms)?;
        columns.push(column(&output, expression, node));
        Ok(())
    }

    fn column_expression(
        &self,
        scope: &mut Scope,
        path: &[String],
        transforms: &[Transform],
    ) -> Result<String, QueryError> {
        let handles = self.resolver.resolve(path)?;
        let mut member = "e".to_string();

        for (i, handle) in handles.iter().enumerate() {
            let last = i + 1 == handles.len();
            if handle.is_collection() && !last {
                let table = scope.table();
                let rest: Vec<&str> = handles[i + 1..].iter().map(|h| h.column.as_str()).collect();
                return Ok(format!(
                    "(select array_agg({table}.{}) from {} {table} where {table} in elements({member}.{}))",
                    rest.join("."),
                    item_type(handle),
                    handle.column
                ));
            }
            member = format!("{member}.{}", handle.column);
        }

        let Some(handle) = handles.last() else {
            return Err(UnknownProperty::new(path.join(".")).into());
        };
        let identity = self.resolver.identity();
        match handle.kind {
            PropertyKind::Simple => Ok(member),
            PropertyKind::Reference if handle.embedded => Ok(member),
            PropertyKind::Reference => Ok(format!("{member}.{}", identity.column)),
            PropertyKind::Collection => {
                self.collection_column(scope, path, &member, handle, transforms)
            }
        }
    }

    /// Collections are only fetched in reduced form, chosen by the first
    /// collection transform.
    fn collection_column(
        &self,
        scope: &mut Scope,
        path: &[String],
        member: &str,
        handle: &PropertyHandle,
        transforms: &[Transform],
    ) -> Result<String, QueryError> {
        let identity = self.resolver.identity();
        let item = item_type(handle);
        let reducing = transforms.iter().find(|t| {
            !matches!(t, Transform::Rename(_) | Transform::Hoist(_))
        });

        let aggregate = |scope: &mut Scope, plucked: &str| {
            let table = scope.table();
            format!(
                "(select array_agg({table}.{plucked}) from {item} {table} where {table} in elements({member}))"
            )
        };

        Ok(match reducing {
            Some(Transform::Size | Transform::IsEmpty | Transform::IsNotEmpty) => {
                format!("size({member})")
            }
            Some(Transform::Ids | Transform::IdObjects) | Some(Transform::Pluck(None)) => {
                aggregate(scope, &identity.column)
            }
            Some(Transform::Pluck(Some(property))) => {
                let mut plucked = path.to_vec();
                plucked.push(property.clone());
                let handles = self.resolver.resolve(&plucked)?;
                let column = handles
                    .last()
                    .map(|h| h.column.clone())
                    .unwrap_or_else(|| property.clone());
                aggregate(scope, &column)
            }
            Some(Transform::Member(id) | Transform::NotMember(id)) => {
                let table = scope.table();
                let name = scope.param(QueryParam::Text(id.clone()));
                format!(
                    "(select count(*) from {item} {table} where {table} in elements({member}) and {table}.{} = :{name})",
                    identity.column
                )
            }
            _ => "cast(null as char)".to_string(),
        })
    }
}

impl<R: PropertyResolver> Evaluator for QueryTranslator<'_, R> {
    type Predicate = FilterFragment;
    type Projection = Projection;

    /// Default-group filters and explicit groups are top-level terms joined
    /// by the root junction; no filters at all is `1=1`.
    fn eval_filter(&self, filter: &FilterGroup) -> Result<FilterFragment, QueryError> {
        let mut scope = Scope::new("f");
        let mut terms = Vec::new();

        for term in filter.terms() {
            match term {
                Term::Single(node) => terms.push(self.filter_clause(&mut scope, node)?),
                Term::Group(junction, nodes) => {
                    let members = nodes
                        .iter()
                        .map(|node| self.filter_clause(&mut scope, node))
                        .collect::<Result<Vec<_>, _>>()?;
                    terms.push(members.join(junction_keyword(junction)));
                }
            }
        }

        let clause = match terms.len() {
            0 => "1=1".to_string(),
            1 => terms.remove(0),
            _ => terms
                .iter()
                .map(|t| format!("({t})"))
                .collect::<Vec<_>>()
                .join(junction_keyword(filter.root_junction)),
        };
        debug!(%clause, params = scope.params.len(), "translated filter");
        Ok(FilterFragment {
            clause,
            params: scope.params,
        })
    }

    /// An empty field list selects the identity only.
    fn eval_fields(&self, fields: &[FieldNode]) -> Result<Projection, QueryError> {
        let mut scope = Scope::new("p");
        let mut columns = Vec::new();
        if fields.is_empty() {
            self.field_column(
                &mut scope,
                &FieldNode::new(FieldNode::KEY),
                &[],
                &[],
                &mut columns,
            )?;
        } else {
            self.field_columns(&mut scope, fields, &[], &[], &mut columns)?;
        }
        Ok(Projection {
            columns,
            params: scope.params,
        })
    }
}

fn column(output: &[String], expression: String, node: &FieldNode) -> SelectColumn {
    SelectColumn {
        path: output.join("."),
        expression,
        transforms: node.transforms.clone(),
    }
}

fn item_type(handle: &PropertyHandle) -> &str {
    handle.item_type.as_deref().unwrap_or(&handle.name)
}

fn junction_keyword(junction: Junction) -> &'static str {
    match junction {
        Junction::And => " and ",
        Junction::Or => " or ",
    }
}

fn comparison_symbol(kind: OpKind, negated: bool) -> &'static str {
    match (kind, negated) {
        (OpKind::Eq, false) => "=",
        (OpKind::Eq, true) => "!=",
        (OpKind::Lt, false) | (OpKind::Ge, true) => "<",
        (OpKind::Le, false) | (OpKind::Gt, true) => "<=",
        (OpKind::Gt, false) | (OpKind::Le, true) => ">",
        (OpKind::Ge, false) | (OpKind::Lt, true) => ">=",
        _ => "=",
    }
}

/// Escapes `%`, `_` and `\` for `escape '\'`; in `like` and `ilike`
/// patterns `*` and `?` become `%` and `_`. Without wildcards the value is
/// wrapped for its anchor.
fn complete_like(value: &str, anchor: Anchor) -> String {
    let has_wildcards = anchor == Anchor::Anywhere && value.contains(['*', '?']);
    let mut body = String::with_capacity(value.len() + 4);
    for ch in value.chars() {
        match ch {
            '%' | '_' | '\\' => {
                body.push('\\');
                body.push(ch);
            }
            '*' if has_wildcards => body.push('%'),
            '?' if has_wildcards => body.push('_'),
            c => body.push(c),
        }
    }
    match anchor {
        Anchor::Anywhere if has_wildcards => body,
        Anchor::Anywhere => format!("%{body}%"),
        Anchor::Start => format!("{body}%"),
        Anchor::End => format!("%{body}"),
    }
}
