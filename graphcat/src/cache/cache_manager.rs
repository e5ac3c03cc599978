// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog cache service
//!
//! Owns every catalog cache and their subscription to the invalidation bus.
//! All cache access goes through [`CatalogCache`]; the caches are created by
//! [`CatalogCache::initialize`] (or lazily by the first lookup) and discarded by
//! [`CatalogCache::reset`].

use super::graph_cache::GraphCache;
use super::invalidation::{CatalogEvent, InvalidationListener};
use super::label_cache::LabelCache;
use super::schema_cache::{EdgeSchemaPairs, LabelIdSet, SchemaCache};
use super::{CacheConfig, CacheStatsSnapshot};
use crate::catalog::error::CatalogResult;
use crate::catalog::store::CatalogStore;
use crate::catalog::types::{GraphId, GraphRecord, LabelId, LabelRecord, NamespaceId, RelationId};
use parking_lot::RwLock;
use std::sync::Arc;

/// The caches of one initialization cycle
struct CacheSet {
    graphs: GraphCache,
    labels: LabelCache,
    schema: SchemaCache,
}

impl InvalidationListener for CacheSet {
    fn on_event(&self, event: &CatalogEvent) -> CatalogResult<()> {
        self.graphs.handle_event(event);
        self.schema.handle_event(event);
        self.labels.handle_event(event)
    }
}

/// Statistics of every cache map
#[derive(Debug, Clone, Default)]
pub struct CatalogCacheStats {
    pub caches: Vec<CacheStatsSnapshot>,
}

impl CatalogCacheStats {
    pub fn get(&self, name: &str) -> Option<&CacheStatsSnapshot> {
        self.caches.iter().find(|c| c.name == name)
    }

    pub fn total_hits(&self) -> u64 {
        self.caches.iter().map(|c| c.hits).sum()
    }

    pub fn total_misses(&self) -> u64 {
        self.caches.iter().map(|c| c.misses).sum()
    }
}

/// Process-local catalog cache service
pub struct CatalogCache {
    store: Arc<CatalogStore>,
    config: CacheConfig,
    caches: RwLock<Option<Arc<CacheSet>>>,
}

impl CatalogCache {
    pub fn new(store: Arc<CatalogStore>, config: CacheConfig) -> Self {
        Self {
            store,
            config,
            caches: RwLock::new(None),
        }
    }

    pub fn store(&self) -> &Arc<CatalogStore> {
        &self.store
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Create the caches and subscribe them to catalog events. Idempotent.
    pub fn initialize(&self) {
        self.cache_set();
    }

    pub fn is_initialized(&self) -> bool {
        self.caches.read().is_some()
    }

    /// Discard every cache; the next lookup starts from empty maps
    pub fn reset(&self) {
        if self.caches.write().take().is_some() {
            log::info!("catalog cache service reset");
        }
    }

    fn cache_set(&self) -> Arc<CacheSet> {
        if let Some(set) = self.caches.read().as_ref() {
            return Arc::clone(set);
        }

        let mut slot = self.caches.write();
        if let Some(set) = slot.as_ref() {
            return Arc::clone(set);
        }
        let set = Arc::new(CacheSet {
            graphs: GraphCache::new(&self.config),
            labels: LabelCache::new(&self.config),
            schema: SchemaCache::new(&self.config),
        });
        self.store.bus().subscribe(&set);
        *slot = Some(Arc::clone(&set));
        log::info!(
            "catalog cache service initialized (enabled={}, capacity={})",
            self.config.enabled,
            self.config.initial_capacity
        );
        set
    }

    pub fn graph_by_name(&self, name: &str) -> CatalogResult<Option<GraphRecord>> {
        self.cache_set().graphs.by_name(&self.store, name)
    }

    pub fn graph_by_namespace(&self, namespace: NamespaceId) -> CatalogResult<Option<GraphRecord>> {
        self.cache_set().graphs.by_namespace(&self.store, namespace)
    }

    pub fn label_by_name(&self, name: &str, graph: GraphId) -> CatalogResult<Option<LabelRecord>> {
        self.cache_set().labels.by_name(&self.store, name, graph)
    }

    pub fn label_by_graph_label_id(
        &self,
        graph: GraphId,
        label_id: LabelId,
    ) -> CatalogResult<Option<LabelRecord>> {
        self.cache_set()
            .labels
            .by_graph_label_id(&self.store, graph, label_id)
    }

    pub fn label_by_relation(&self, relation: RelationId) -> CatalogResult<Option<LabelRecord>> {
        self.cache_set().labels.by_relation(&self.store, relation)
    }

    pub fn label_by_sequence(
        &self,
        sequence_name: &str,
        graph: GraphId,
    ) -> CatalogResult<Option<LabelRecord>> {
        self.cache_set()
            .labels
            .by_sequence(&self.store, sequence_name, graph)
    }

    pub fn edge_schema(&self, graph: GraphId, edge: LabelId) -> CatalogResult<EdgeSchemaPairs> {
        self.cache_set().schema.edge_schema(&self.store, graph, edge)
    }

    pub fn end_labels_from_start(
        &self,
        graph: GraphId,
        start: LabelId,
    ) -> CatalogResult<LabelIdSet> {
        self.cache_set()
            .schema
            .end_labels_from_start(&self.store, graph, start)
    }

    pub fn start_labels_from_end(&self, graph: GraphId, end: LabelId) -> CatalogResult<LabelIdSet> {
        self.cache_set()
            .schema
            .start_labels_from_end(&self.store, graph, end)
    }

    /// Empty every cache without unsubscribing
    pub fn flush_all(&self) {
        if let Some(set) = self.caches.read().as_ref() {
            set.graphs.flush();
            set.labels.flush();
            set.schema.flush();
        }
    }

    pub fn stats(&self) -> CatalogCacheStats {
        let Some(set) = self.caches.read().as_ref().map(Arc::clone) else {
            return CatalogCacheStats::default();
        };
        let mut caches = set.graphs.stats();
        caches.extend(set.labels.stats());
        caches.extend(set.schema.stats());
        CatalogCacheStats { caches }
    }
}
