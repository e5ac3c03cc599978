// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Graph record caches keyed by name and by owning namespace

use super::invalidation::CatalogEvent;
use super::{CacheConfig, CacheStatsSnapshot, KeyedMap};
use crate::catalog::error::CatalogResult;
use crate::catalog::scan::GraphScanKey;
use crate::catalog::store::CatalogStore;
use crate::catalog::types::{CatalogName, GraphRecord, NamespaceId};

pub struct GraphCache {
    by_name: KeyedMap<CatalogName, GraphRecord>,
    by_namespace: KeyedMap<NamespaceId, GraphRecord>,
}

impl GraphCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            by_name: KeyedMap::new("graph_name", config),
            by_namespace: KeyedMap::new("graph_namespace", config),
        }
    }

    pub fn by_name(&self, store: &CatalogStore, name: &str) -> CatalogResult<Option<GraphRecord>> {
        let key = CatalogName::new(name);
        self.by_name.find_or_fill(&key, || {
            store.find_graph(&GraphScanKey::Name(key.clone()))
        })
    }

    pub fn by_namespace(
        &self,
        store: &CatalogStore,
        namespace: NamespaceId,
    ) -> CatalogResult<Option<GraphRecord>> {
        self.by_namespace.find_or_fill(&namespace, || {
            store.find_graph(&GraphScanKey::Namespace(namespace))
        })
    }

    /// Graph entries are only ever flushed wholesale
    pub fn handle_event(&self, event: &CatalogEvent) {
        if matches!(event, CatalogEvent::NamespaceChanged) {
            self.flush();
        }
    }

    pub fn flush(&self) {
        self.by_name.flush();
        self.by_namespace.flush();
    }

    pub fn stats(&self) -> Vec<CacheStatsSnapshot> {
        vec![self.by_name.snapshot(), self.by_namespace.snapshot()]
    }
}
