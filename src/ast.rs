//! # gistql - Intermediate Representation
//!
//! This module defines the parsed, backend-agnostic tree shared by both
//! evaluation strategies: the fields language (what to return) and the
//! filter language (which entries to return).
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[fields]** - Field selection nodes and their transforms
//! - **[operators]** - Filter operators and their negation
//! - **[literal]** - Filter values as written
//! - **[filters]** - Filter nodes, groups and the root junction
//!
//! ## Quick Start
//!
//! ```text
//! fields=name,eats.0~hoist(food)
//! filter=_:in:[cat,dog]
//! filter=1:name:endsWith:3&filter=2:name:like:alpha
//! ```
//!
//! ## Core Concepts
//!
//! ### Fields
//!
//! A fields expression is a comma separated list. Each field may be excluded
//! (`!code`, `-code`), transformed (`users~size`, `name~rename(label)`) and
//! narrowed to nested fields (`group[id,name]`, `group(id,name)`, `group.id`).
//! Reserved names:
//!
//! - `_` - the entry key or object identity
//! - `.` - the root value
//! - `*` - all properties (`:all` is an alias)
//!
//! Numeric names select a collection element: `eats.0` is the first element
//! of `eats`, never a property called `0`.
//!
//! ### Filters
//!
//! ```text
//! property:operator:value
//! ```
//!
//! Every operator can be negated with `!`. Filters may carry a group prefix
//! (`1:name:eq:x`); members of an explicit group combine with the opposite of
//! the root junction, so the default `AND` makes a group an alternative list.
//!
//! ### Immutability
//!
//! IR nodes are built once per request and never change afterwards, so they
//! are freely shared between threads and cached behind `Arc`.
pub mod fields;
pub mod filters;
pub mod literal;
pub mod operators;
pub mod tokens;

pub use fields::{FieldNode, Transform};
pub use filters::{FilterGroup, FilterNode, GroupId, Junction, PropertyPath, Term};
pub use literal::{FilterValue, Literal};
pub use operators::{Anchor, OpKind, Operator};
pub use tokens::{Token, TokenKind};
