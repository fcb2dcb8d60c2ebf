//! # gistql
//!
//! Field projection and filter expressions for object listings.
//!
//! A request carries a `fields` expression (what to return) and any number
//! of `filter` expressions (which entries to return). Both are parsed once
//! into an immutable IR and then evaluated by one of two strategies:
//!
//! - [`MemoryEvaluator`] tests and projects keyed JSON documents directly
//! - [`QueryTranslator`] turns the IR into a parameterised select statement
//!
//! ```
//! use gistql::request::{QueryParams, parse_query};
//! use gistql::store::{DocumentStore, Paging};
//! use gistql::{EngineConfig, Value, to_json};
//!
//! let mut store = DocumentStore::new(EngineConfig::default());
//! store.insert("cat", Value::object([("name", Value::from("Miao"))]));
//! store.insert("dog", Value::object([("name", Value::from("Wuff"))]));
//!
//! let params = QueryParams::default().fields("name").filter("name:like:ia").headless(true);
//! let query = parse_query(&params, None).unwrap();
//! let result = store.query(&query, Paging::default()).unwrap();
//! assert_eq!(to_json(&result.to_value()), r#"[{"key":"cat","name":"Miao"}]"#);
//! ```

pub mod accessor;
pub mod ast;
pub mod cache;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod projection;
pub mod request;
pub mod resolver;
pub mod store;
pub mod transform;
pub mod value;

pub use accessor::{Entry, ValueAccessor};
pub use ast::{FieldNode, FilterGroup, FilterNode, Operator, Token};
pub use cache::ParseCache;
pub use config::EngineConfig;
pub use error::{ErrorReport, FieldsSyntaxError, FilterSyntaxError, QueryError, UnknownProperty};
pub use evaluator::{Evaluator, MemoryEvaluator, QueryTranslator};
pub use lexer::Lexer;
pub use output::{to_json, to_json_pretty};
pub use parser::{parse_fields, parse_filter};
pub use resolver::{PropertyResolver, Schema};
pub use value::Value;
