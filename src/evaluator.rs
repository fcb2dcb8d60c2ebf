//! Evaluation strategies over the IR.
//!
//! One grammar, two backends: [`MemoryEvaluator`] tests filters against a
//! candidate value tree, [`QueryTranslator`] turns the same IR into query
//! fragments through a [`PropertyResolver`](crate::resolver::PropertyResolver).

pub mod compare;
mod memory;
mod query;

pub use memory::{FilterPlan, MemoryEvaluator};
pub use query::{FilterFragment, Projection, QueryParam, QueryTranslator, SelectColumn, SelectQuery};

use crate::{
    ast::{FieldNode, FilterGroup},
    error::QueryError,
};

/// A strategy turning parsed filters and fields into its backend's terms.
pub trait Evaluator {
    type Predicate;
    type Projection;

    fn eval_filter(&self, filter: &FilterGroup) -> Result<Self::Predicate, QueryError>;

    fn eval_fields(&self, fields: &[FieldNode]) -> Result<Self::Projection, QueryError>;
}
