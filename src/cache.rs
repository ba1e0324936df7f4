//! Read-through cache for loaded tables.
//!
//! Entries live for the lifetime of the owning value (one process run).
//! There is no invalidation and nothing is persisted.

use std::collections::HashMap;
use std::sync::Arc;

/// `(source identifier, load parameters)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub source: String,
    pub params: String,
}

impl CacheKey {
    pub fn new(source: impl Into<String>, params: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            params: params.into(),
        }
    }
}

#[derive(Debug)]
pub struct LoadCache<T> {
    entries: HashMap<CacheKey, Arc<Vec<T>>>,
    hits: usize,
    misses: usize,
}

impl<T> Default for LoadCache<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }
}

impl<T> LoadCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up `key`, counting the hit or miss.
    pub fn get(&mut self, key: &CacheKey) -> Option<Arc<Vec<T>>> {
        match self.entries.get(key) {
            Some(v) => {
                self.hits += 1;
                Some(Arc::clone(v))
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, key: CacheKey, records: Vec<T>) -> Arc<Vec<T>> {
        let records = Arc::new(records);
        self.entries.insert(key, Arc::clone(&records));
        records
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }
}
