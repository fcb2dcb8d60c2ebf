//! Run a fields/filter request against a JSON document store

use tracing::debug;

use super::{CliError, json_to_value};
use crate::{
    Value,
    cache::ParseCache,
    config::EngineConfig,
    error::{ErrorReport, QueryError},
    request::{QueryParams, parse_query},
    store::{DocumentStore, Paging},
};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The `fields` expression
    pub fields: Option<String>,
    /// `filter` expressions, one per flag
    pub filters: Vec<String>,
    /// `AND` or `OR`
    pub root_junction: Option<String>,
    /// JSON object of `key -> document`
    pub input: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
    /// Return the bare entry array
    pub headless: bool,
    /// Only validate syntax, don't execute
    pub syntax_only: bool,
    /// Overrides `GISTQL_PARALLEL_THRESHOLD`
    pub parallel_threshold: Option<usize>,
}

impl CheckOptions {
    fn params(&self) -> QueryParams {
        QueryParams {
            fields: self.fields.clone(),
            filter: self.filters.clone(),
            root_junction: self.root_junction.clone(),
            headless: self.headless,
            order: Vec::new(),
        }
    }

    fn paging(&self) -> Paging {
        let default = Paging::default();
        Paging {
            page: self.page.unwrap_or(default.page),
            page_size: self.page_size.unwrap_or(default.page_size),
        }
    }
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// Syntax validation passed
    SyntaxValid,
    /// The request ran; the pager and entries, or the bare entries
    Success(Value),
    /// The engine refused the request
    Rejected(ErrorReport),
}

/// Execute a check operation. Engine errors become [`CheckResult::Rejected`];
/// only problems with the input itself are a [`CliError`].
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let mut config = EngineConfig::from_env()?;
    if let Some(threshold) = options.parallel_threshold {
        config.parallel_threshold = threshold;
    }
    let cache = ParseCache::new(config.cache_capacity);

    let query = match parse_query(&options.params(), Some(&cache)) {
        Ok(query) => query,
        Err(e) => return Ok(rejected(&e)),
    };
    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid);
    }

    let json_str = options.input.as_ref().ok_or(CliError::NoInput)?;
    let json_value: serde_json::Value = serde_json::from_str(json_str)?;

    let outcome = DocumentStore::from_value(json_to_value(json_value), config)
        .and_then(|store| store.query(&query, options.paging()));
    Ok(match outcome {
        Ok(result) => CheckResult::Success(result.to_value()),
        Err(e) => rejected(&e),
    })
}

fn rejected(error: &QueryError) -> CheckResult {
    debug!(%error, "request rejected");
    CheckResult::Rejected(ErrorReport::from(error))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_only_needs_no_input() {
        let options = CheckOptions {
            fields: Some("name,eats.0~hoist".to_string()),
            syntax_only: true,
            ..CheckOptions::default()
        };
        assert!(matches!(execute_check(&options), Ok(CheckResult::SyntaxValid)));
    }

    #[test]
    fn bad_filter_is_rejected() {
        let options = CheckOptions {
            filters: vec!["_:null".to_string()],
            syntax_only: true,
            ..CheckOptions::default()
        };
        let Ok(CheckResult::Rejected(report)) = execute_check(&options) else {
            panic!("expected a rejection");
        };
        assert_eq!(report.http_status_code, 409);
        assert_eq!(
            report.message,
            "Illegal filter `_:null`: key filters cannot be used with unary operators"
        );
    }

    #[test]
    fn missing_input() {
        let options = CheckOptions::default();
        assert!(matches!(execute_check(&options), Err(CliError::NoInput)));
    }
}
