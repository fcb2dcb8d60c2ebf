//! Engine configuration.

use std::env;

use thiserror::Error;

pub const CACHE_CAPACITY_VAR: &str = "GISTQL_CACHE_CAPACITY";
pub const PARALLEL_THRESHOLD_VAR: &str = "GISTQL_PARALLEL_THRESHOLD";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {name}: expected a non-negative integer")]
    InvalidNumber { name: &'static str, value: String },
}

/// Tunables of the engine. None of them changes query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Entries kept by each parse cache; 0 disables caching
    pub cache_capacity: usize,
    /// Candidate count from which the document store filters in parallel
    pub parallel_threshold: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            cache_capacity: 256,
            parallel_threshold: 512,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `GISTQL_CACHE_CAPACITY` and
    /// `GISTQL_PARALLEL_THRESHOLD` when set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&'static str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = EngineConfig::default();
        let read = |name: &'static str, default: usize| match lookup(name) {
            None => Ok(default),
            Some(value) => value
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidNumber { name, value }),
        };
        Ok(EngineConfig {
            cache_capacity: read(CACHE_CAPACITY_VAR, defaults.cache_capacity)?,
            parallel_threshold: read(PARALLEL_THRESHOLD_VAR, defaults.parallel_threshold)?,
        })
    }
}
