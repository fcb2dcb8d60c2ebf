use std::borrow::Cow;

use tracing::trace;

use super::{Evaluator, compare::Matcher};
use crate::{
    accessor::{Found, ValueAccessor},
    ast::{FieldNode, FilterGroup, FilterNode, Junction, PropertyPath, Term},
    error::QueryError,
    projection,
    value::Value,
};

/// A [`FilterGroup`] with its matchers compiled, ready to be tested against
/// many candidates (from many threads).
#[derive(Debug, Clone)]
pub struct FilterPlan {
    junction: Junction,
    terms: Vec<PlanTerm>,
}

#[derive(Debug, Clone)]
enum PlanTerm {
    Single(CompiledFilter),
    Group(Junction, Vec<CompiledFilter>),
}

#[derive(Debug, Clone)]
struct CompiledFilter {
    property: PropertyPath,
    matcher: Matcher,
}

impl CompiledFilter {
    fn new(filter: &FilterNode) -> Result<Self, QueryError> {
        Ok(CompiledFilter {
            property: filter.property.clone(),
            matcher: Matcher::new(filter)?,
        })
    }

    fn test<A: ValueAccessor>(&self, candidate: &A) -> bool {
        let actual: Option<Cow<'_, Value>> = match &self.property {
            PropertyPath::Key => Some(Cow::Owned(Value::from(candidate.key()))),
            PropertyPath::Root => Some(Cow::Borrowed(candidate.value())),
            PropertyPath::Path(segments) => match candidate.find(segments) {
                Some(Found {
                    value,
                    fanned_out: true,
                }) => return self.matcher.test_each(value.as_array().unwrap_or_default()),
                found => found.map(|found| found.value),
            },
        };
        self.matcher.test(actual.as_deref())
    }
}

/// AND stops at the first `false`, OR at the first `true`.
fn combine<T>(junction: Junction, items: &[T], mut test: impl FnMut(&T) -> bool) -> bool {
    match junction {
        Junction::And => items.iter().all(|item| test(item)),
        Junction::Or => items.iter().any(|item| test(item)),
    }
}

impl FilterPlan {
    pub fn compile(group: &FilterGroup) -> Result<Self, QueryError> {
        let terms = group
            .terms()
            .map(|term| match term {
                Term::Single(filter) => CompiledFilter::new(filter).map(PlanTerm::Single),
                Term::Group(junction, filters) => filters
                    .iter()
                    .map(CompiledFilter::new)
                    .collect::<Result<Vec<_>, _>>()
                    .map(|compiled| PlanTerm::Group(junction, compiled)),
            })
            .collect::<Result<Vec<_>, _>>()?;
        trace!(terms = terms.len(), junction = %group.root_junction, "compiled filter plan");
        Ok(FilterPlan {
            junction: group.root_junction,
            terms,
        })
    }

    /// An empty plan accepts every candidate.
    pub fn matches<A: ValueAccessor>(&self, candidate: &A) -> bool {
        if self.terms.is_empty() {
            return true;
        }
        combine(self.junction, &self.terms, |term| match term {
            PlanTerm::Single(filter) => filter.test(candidate),
            PlanTerm::Group(junction, filters) => {
                combine(*junction, filters, |filter| filter.test(candidate))
            }
        })
    }
}

/// Evaluates the IR directly against one candidate.
///
/// # Examples
///
/// ```
/// use gistql::{Entry, Value, evaluator::{Evaluator, MemoryEvaluator}};
/// use gistql::request::{QueryParams, parse_query};
///
/// let cat = Entry::new("cat", Value::object([("name", Value::from("Miao"))]));
/// let query = parse_query(&QueryParams::default().filter("_:eq:cat"), None).unwrap();
/// assert!(MemoryEvaluator::new(&cat).eval_filter(&query.filter).unwrap());
/// ```
pub struct MemoryEvaluator<'a, A: ValueAccessor> {
    candidate: &'a A,
}

impl<'a, A: ValueAccessor> MemoryEvaluator<'a, A> {
    pub fn new(candidate: &'a A) -> Self {
        MemoryEvaluator { candidate }
    }
}

impl<A: ValueAccessor> Evaluator for MemoryEvaluator<'_, A> {
    type Predicate = bool;
    type Projection = Value;

    fn eval_filter(&self, filter: &FilterGroup) -> Result<bool, QueryError> {
        Ok(FilterPlan::compile(filter)?.matches(self.candidate))
    }

    fn eval_fields(&self, fields: &[FieldNode]) -> Result<Value, QueryError> {
        Ok(projection::project(fields, self.candidate))
    }
}
