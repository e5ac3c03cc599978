// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog caches
//!
//! Each cache answers one lookup shape and knows which catalog events make
//! its entries stale:
//! - graph caches (by name, by namespace), flushed on namespace changes
//! - label caches (by name, by id, by relation, by sequence), invalidated by relation
//! - edge schema caches (by edge label, by start label, by end label), flushed on
//!   any schema write
//!
//! Misses read the catalog store with no cache lock held. That read may
//! deliver invalidations which empty the very map being filled, so a fill
//! inserts whatever it read and tolerates an entry that appeared meanwhile.

pub mod cache_config;
pub mod cache_manager;
pub mod graph_cache;
pub mod invalidation;
pub mod label_cache;
pub mod schema_cache;

pub use cache_config::CacheConfig;
pub use cache_manager::{CatalogCache, CatalogCacheStats};
pub use graph_cache::GraphCache;
pub use invalidation::{CatalogEvent, InvalidationBus, InvalidationListener};
pub use label_cache::LabelCache;
pub use schema_cache::{EdgeSchemaPairs, LabelIdSet, SchemaCache};

use crate::catalog::error::{CatalogError, CatalogResult};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters of one cache map
#[derive(Debug, Default)]
struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    fills: AtomicU64,
    flushes: AtomicU64,
}

/// Point-in-time view of one cache map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStatsSnapshot {
    pub name: &'static str,
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub fills: u64,
    pub flushes: u64,
}

impl CacheStatsSnapshot {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Entries of one map and the invalidation generation they belong to
struct MapState<K, V> {
    entries: HashMap<K, V>,
    /// Bumped by every flush and every invalidation sweep
    generation: u64,
}

/// A single keyed map with find-or-fill semantics
pub(crate) struct KeyedMap<K, V> {
    name: &'static str,
    enabled: bool,
    capacity: usize,
    state: Mutex<MapState<K, V>>,
    counters: CacheCounters,
}

impl<K, V> KeyedMap<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    pub(crate) fn new(name: &'static str, config: &CacheConfig) -> Self {
        Self {
            name,
            enabled: config.enabled,
            capacity: config.initial_capacity,
            state: Mutex::new(MapState {
                entries: HashMap::with_capacity(config.initial_capacity),
                generation: 0,
            }),
            counters: CacheCounters::default(),
        }
    }

    /// Return the cached value for `key`, or run `load` and cache a `Some` result
    ///
    /// `load` runs without the map lock held. If the map was flushed or swept
    /// while it ran, the loaded value is returned but not cached.
    pub(crate) fn find_or_fill<F>(&self, key: &K, load: F) -> CatalogResult<Option<V>>
    where
        F: FnOnce() -> CatalogResult<Option<V>>,
    {
        if !self.enabled {
            return load();
        }

        let generation = {
            let state = self.state.lock();
            if let Some(value) = state.entries.get(key) {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(Some(value.clone()));
            }
            state.generation
        };
        self.counters.misses.fetch_add(1, Ordering::Relaxed);

        let Some(loaded) = load()? else {
            return Ok(None);
        };

        let mut state = self.state.lock();
        if state.generation != generation {
            log::debug!(
                "{} cache invalidated while loading {:?}, not caching",
                self.name,
                key
            );
            return Ok(Some(loaded));
        }
        // A reentrant lookup may have filled the key already
        let value = match state.entries.get(key) {
            Some(present) => present.clone(),
            None => {
                state.entries.insert(key.clone(), loaded.clone());
                self.counters.fills.fetch_add(1, Ordering::Relaxed);
                log::debug!("{} cache filled for {:?}", self.name, key);
                loaded
            }
        };
        Ok(Some(value))
    }

    /// Drop every entry and start over with a fresh map
    pub(crate) fn flush(&self) {
        let old = {
            let mut state = self.state.lock();
            state.generation += 1;
            std::mem::replace(&mut state.entries, HashMap::with_capacity(self.capacity))
        };
        self.counters.flushes.fetch_add(1, Ordering::Relaxed);
        if !old.is_empty() {
            log::debug!("{} cache flushed ({} entries)", self.name, old.len());
        }
    }

    /// Remove every entry whose value satisfies `pred`
    pub(crate) fn remove_where<P>(&self, pred: P) -> CatalogResult<usize>
    where
        P: Fn(&V) -> bool,
    {
        let mut state = self.state.lock();
        state.generation += 1;
        let entries = &mut state.entries;
        let doomed: Vec<K> = entries
            .iter()
            .filter(|(_, v)| pred(v))
            .map(|(k, _)| k.clone())
            .collect();

        for key in &doomed {
            if entries.remove(key).is_none() {
                return Err(CatalogError::InternalInconsistency(format!(
                    "{} cache lost entry {:?} during invalidation",
                    self.name, key
                )));
            }
        }
        Ok(doomed.len())
    }

    pub(crate) fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, key: &K) -> bool {
        self.state.lock().entries.contains_key(key)
    }

    pub(crate) fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            name: self.name,
            entries: self.len(),
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            fills: self.counters.fills.load(Ordering::Relaxed),
            flushes: self.counters.flushes.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> KeyedMap<u32, String> {
        KeyedMap::new("test", &CacheConfig::default())
    }

    #[test]
    fn test_miss_then_hit() {
        let m = map();
        let v = m.find_or_fill(&1, || Ok(Some("one".to_string()))).unwrap();
        assert_eq!(v.as_deref(), Some("one"));

        let v = m
            .find_or_fill(&1, || panic!("second lookup must not load"))
            .unwrap();
        assert_eq!(v.as_deref(), Some("one"));

        let stats = m.snapshot();
        assert_eq!((stats.hits, stats.misses, stats.fills), (1, 1, 1));
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn test_absent_results_are_not_cached() {
        let m = map();
        assert_eq!(m.find_or_fill(&1, || Ok(None)).unwrap(), None);
        assert_eq!(m.len(), 0);
    }

    #[test]
    fn test_flush_during_load_skips_the_fill() {
        let m = map();
        m.find_or_fill(&2, || Ok(Some("two".to_string()))).unwrap();

        let v = m
            .find_or_fill(&1, || {
                m.flush();
                Ok(Some("stale".to_string()))
            })
            .unwrap();
        assert_eq!(v.as_deref(), Some("stale"));
        assert!(!m.contains(&1));
        assert!(!m.contains(&2));

        let v = m.find_or_fill(&1, || Ok(Some("fresh".to_string()))).unwrap();
        assert_eq!(v.as_deref(), Some("fresh"));
        assert!(m.contains(&1));
    }

    #[test]
    fn test_sweep_during_load_skips_the_fill() {
        let m = map();
        let v = m
            .find_or_fill(&1, || {
                // Nothing cached yet matches, but the loaded row may be the stale one
                assert_eq!(m.remove_where(|v: &String| v == "one").unwrap(), 0);
                Ok(Some("one".to_string()))
            })
            .unwrap();
        assert_eq!(v.as_deref(), Some("one"));
        assert_eq!(m.len(), 0);
        assert_eq!(m.snapshot().fills, 0);
    }

    #[test]
    fn test_fill_keeps_entry_inserted_during_load() {
        let m = map();
        let v = m
            .find_or_fill(&1, || {
                m.find_or_fill(&1, || Ok(Some("inner".to_string())))?;
                Ok(Some("outer".to_string()))
            })
            .unwrap();
        assert_eq!(v.as_deref(), Some("inner"));
        assert_eq!(m.len(), 1);
        assert_eq!(m.snapshot().fills, 1);
    }

    #[test]
    fn test_remove_where_reports_count() {
        let m = map();
        for (k, v) in [(1, "a"), (2, "b"), (3, "a")] {
            m.find_or_fill(&k, || Ok(Some(v.to_string()))).unwrap();
        }
        assert_eq!(m.remove_where(|v| v == "a").unwrap(), 2);
        assert_eq!(m.remove_where(|v| v == "zzz").unwrap(), 0);
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn test_disabled_map_always_loads() {
        let m: KeyedMap<u32, String> = KeyedMap::new("bypass", &CacheConfig::bypass());
        m.find_or_fill(&1, || Ok(Some("x".to_string()))).unwrap();
        assert_eq!(m.len(), 0);
        let mut loads = 0;
        m.find_or_fill(&1, || {
            loads += 1;
            Ok(Some("x".to_string()))
        })
        .unwrap();
        assert_eq!(loads, 1);
    }
}
