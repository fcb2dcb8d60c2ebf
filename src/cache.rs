//! Bounded cache of parsed IR, keyed by the raw query text.
//!
//! IR is immutable, so cached trees are handed out as shared `Arc`s. Only
//! successful parses are cached.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use lru::LruCache;
use tracing::trace;

use crate::{
    ast::{FieldNode, FilterNode, GroupId},
    error::{FieldsSyntaxError, FilterSyntaxError},
    parser::{parse_fields, parse_filter},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}

pub struct ParseCache {
    fields: Option<Mutex<LruCache<String, Arc<[FieldNode]>>>>,
    filters: Option<Mutex<LruCache<(GroupId, String), Arc<FilterNode>>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl ParseCache {
    /// A cache holding up to `capacity` fields expressions and as many
    /// filters. A capacity of 0 disables caching.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity);
        ParseCache {
            fields: capacity.map(|c| Mutex::new(LruCache::new(c))),
            filters: capacity.map(|c| Mutex::new(LruCache::new(c))),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.fields.is_some()
    }

    pub fn fields(&self, input: &str) -> Result<Arc<[FieldNode]>, FieldsSyntaxError> {
        let Some(cache) = &self.fields else {
            return parse_fields(input).map(Arc::from);
        };
        if let Some(hit) = cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(input)
        {
            self.hit(input);
            return Ok(Arc::clone(hit));
        }
        self.miss(input);
        let parsed: Arc<[FieldNode]> = parse_fields(input)?.into();
        cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .put(input.to_string(), Arc::clone(&parsed));
        Ok(parsed)
    }

    pub fn filter(&self, raw: &str, group: GroupId) -> Result<Arc<FilterNode>, FilterSyntaxError> {
        let Some(cache) = &self.filters else {
            return parse_filter(raw, group).map(Arc::new);
        };
        let key = (group, raw.to_string());
        if let Some(hit) = cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            self.hit(raw);
            return Ok(Arc::clone(hit));
        }
        self.miss(raw);
        let parsed = Arc::new(parse_filter(raw, group)?);
        cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .put(key, Arc::clone(&parsed));
        Ok(parsed)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn hit(&self, raw: &str) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        trace!(raw, "parse cache hit");
    }

    fn miss(&self, raw: &str) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        trace!(raw, "parse cache miss");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_parse_is_a_hit() {
        let cache = ParseCache::new(4);
        let first = cache.fields("name,code").unwrap();
        let second = cache.fields("name,code").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[test]
    fn errors_are_not_cached() {
        let cache = ParseCache::new(4);
        assert!(cache.filter("_:null", GroupId::Default).is_err());
        assert!(cache.filter("_:null", GroupId::Default).is_err());
        assert_eq!(cache.stats().hits, 0);
    }

    #[test]
    fn zero_capacity_disables() {
        let cache = ParseCache::new(0);
        assert!(!cache.is_enabled());
        cache.fields("name").unwrap();
        cache.fields("name").unwrap();
        assert_eq!(cache.stats(), CacheStats::default());
    }
}
