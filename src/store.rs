//! In-memory document store: filter, project and page keyed JSON documents.

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::{
    accessor::Entry,
    ast::FieldNode,
    config::EngineConfig,
    error::QueryError,
    evaluator::FilterPlan,
    projection::project,
    request::ParsedQuery,
    value::Value,
};

/// Requested page, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub page: usize,
    pub page_size: usize,
}

impl Default for Paging {
    fn default() -> Self {
        Paging {
            page: 1,
            page_size: 50,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pager {
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub page_count: usize,
}

impl Pager {
    fn new(paging: Paging, total: usize) -> Self {
        Pager {
            page: paging.page,
            page_size: paging.page_size,
            total,
            page_count: total.div_ceil(paging.page_size),
        }
    }

    pub fn to_value(&self) -> Value {
        Value::object([
            ("page", Value::from(self.page)),
            ("pageSize", Value::from(self.page_size)),
            ("total", Value::from(self.total)),
            ("pageCount", Value::from(self.page_count)),
        ])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub pager: Pager,
    pub entries: Vec<Value>,
    pub headless: bool,
}

impl QueryResult {
    /// The bare entry array when headless, otherwise
    /// `{"pager": {..}, "entries": [..]}`.
    pub fn to_value(&self) -> Value {
        let entries = Value::Array(self.entries.clone());
        if self.headless {
            entries
        } else {
            Value::object([("pager", self.pager.to_value()), ("entries", entries)])
        }
    }
}

/// Entries are kept sorted by key.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    entries: Vec<Entry>,
    config: EngineConfig,
}

impl DocumentStore {
    pub fn new(config: EngineConfig) -> Self {
        DocumentStore {
            entries: Vec::new(),
            config,
        }
    }

    /// Loads every member of an object as an entry, in key order.
    pub fn from_value(value: Value, config: EngineConfig) -> Result<Self, QueryError> {
        let Value::Object(members) = value else {
            return Err(QueryError::IllegalParameter {
                name: "input",
                value: format!("expected an object of entries, found {}", value.type_name()),
            });
        };
        let mut entries: Vec<Entry> = members
            .into_iter()
            .map(|(key, value)| Entry::new(key, value))
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(DocumentStore { entries, config })
    }

    /// Adds an entry at its key position, replacing any entry with the same
    /// key.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let entry = Entry::new(key, value);
        match self
            .entries
            .binary_search_by(|e| e.key.as_str().cmp(entry.key.as_str()))
        {
            Ok(index) => self.entries[index] = entry,
            Err(index) => self.entries.insert(index, entry),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries matching the filter, in key order.
    pub fn matching(&self, query: &ParsedQuery) -> Result<Vec<&Entry>, QueryError> {
        let plan = FilterPlan::compile(&query.filter)?;
        let parallel = self.entries.len() >= self.config.parallel_threshold;
        debug!(candidates = self.entries.len(), parallel, "filtering entries");

        Ok(if parallel {
            self.entries
                .par_iter()
                .filter(|entry| plan.matches(*entry))
                .collect()
        } else {
            self.entries
                .iter()
                .filter(|entry| plan.matches(*entry))
                .collect()
        })
    }

    /// Filters, projects and pages. Without `fields` each entry is shown as
    /// its key and value.
    pub fn query(&self, query: &ParsedQuery, paging: Paging) -> Result<QueryResult, QueryError> {
        if paging.page == 0 {
            return Err(QueryError::IllegalParameter {
                name: "page",
                value: paging.page.to_string(),
            });
        }
        if paging.page_size == 0 {
            return Err(QueryError::IllegalParameter {
                name: "pageSize",
                value: paging.page_size.to_string(),
            });
        }

        let matched = self.matching(query)?;
        let pager = Pager::new(paging, matched.len());

        let default_fields = [FieldNode::new(FieldNode::ROOT)];
        let fields: &[FieldNode] = query.fields.as_deref().unwrap_or(&default_fields);

        let entries = matched
            .into_iter()
            .skip((paging.page - 1).saturating_mul(paging.page_size))
            .take(paging.page_size)
            .map(|entry| project(fields, entry))
            .collect();

        Ok(QueryResult {
            pager,
            entries,
            headless: query.headless,
        })
    }
}
