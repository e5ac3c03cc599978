// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Edge schema caches
//!
//! Empty answers are cached as well. A write to the schema table of any graph
//! flushes all three maps.

use super::invalidation::CatalogEvent;
use super::{CacheConfig, CacheStatsSnapshot, KeyedMap};
use crate::catalog::error::CatalogResult;
use crate::catalog::scan::SchemaScanKey;
use crate::catalog::store::CatalogStore;
use crate::catalog::types::{GraphId, LabelId};
use std::collections::BTreeSet;
use std::sync::Arc;

/// `(start_label_id, end_label_id)` pairs recorded for one edge label, in row order
pub type EdgeSchemaPairs = Arc<[(LabelId, LabelId)]>;

/// Deduplicated label ids
pub type LabelIdSet = Arc<BTreeSet<LabelId>>;

pub struct SchemaCache {
    by_edge: KeyedMap<(GraphId, LabelId), EdgeSchemaPairs>,
    end_labels_by_start: KeyedMap<(GraphId, LabelId), LabelIdSet>,
    start_labels_by_end: KeyedMap<(GraphId, LabelId), LabelIdSet>,
}

impl SchemaCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            by_edge: KeyedMap::new("edge_schema", config),
            end_labels_by_start: KeyedMap::new("start_vertex_end_labels", config),
            start_labels_by_end: KeyedMap::new("end_vertex_start_labels", config),
        }
    }

    pub fn edge_schema(
        &self,
        store: &CatalogStore,
        graph: GraphId,
        edge: LabelId,
    ) -> CatalogResult<EdgeSchemaPairs> {
        let found = self.by_edge.find_or_fill(&(graph, edge), || {
            let rows = store.scan_edge_schema(&SchemaScanKey::graph(graph).edge(edge))?;
            let pairs: Vec<(LabelId, LabelId)> = rows
                .iter()
                .map(|r| (r.start_label_id, r.end_label_id))
                .collect();
            Ok(Some(Arc::from(pairs)))
        })?;
        Ok(found.unwrap_or_else(|| Arc::from(Vec::new())))
    }

    pub fn end_labels_from_start(
        &self,
        store: &CatalogStore,
        graph: GraphId,
        start: LabelId,
    ) -> CatalogResult<LabelIdSet> {
        let found = self.end_labels_by_start.find_or_fill(&(graph, start), || {
            Ok(Some(Arc::new(store.end_label_ids_from_start(graph, start)?)))
        })?;
        Ok(found.unwrap_or_default())
    }

    pub fn start_labels_from_end(
        &self,
        store: &CatalogStore,
        graph: GraphId,
        end: LabelId,
    ) -> CatalogResult<LabelIdSet> {
        let found = self.start_labels_by_end.find_or_fill(&(graph, end), || {
            Ok(Some(Arc::new(store.start_label_ids_from_end(graph, end)?)))
        })?;
        Ok(found.unwrap_or_default())
    }

    pub fn handle_event(&self, event: &CatalogEvent) {
        if let CatalogEvent::EdgeSchemaChanged { graph } = event {
            log::debug!("edge schema of graph {} changed, flushing schema caches", graph);
            self.flush();
        }
    }

    pub fn flush(&self) {
        self.by_edge.flush();
        self.end_labels_by_start.flush();
        self.start_labels_by_end.flush();
    }

    pub fn stats(&self) -> Vec<CacheStatsSnapshot> {
        vec![
            self.by_edge.snapshot(),
            self.end_labels_by_start.snapshot(),
            self.start_labels_by_end.snapshot(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::invalidation::InvalidationBus;
    use crate::catalog::types::EdgeSchemaEntry;

    #[test]
    fn test_empty_answers_are_cached_until_schema_changes() {
        let store = CatalogStore::in_memory(Arc::new(InvalidationBus::new())).unwrap();
        let cache = SchemaCache::new(&CacheConfig::default());
        let g = GraphId(1);

        assert!(cache.edge_schema(&store, g, LabelId(5)).unwrap().is_empty());
        assert_eq!(cache.by_edge.len(), 1);

        store
            .insert_edge_schema_entry(EdgeSchemaEntry::new(g, LabelId(5), LabelId(3), LabelId(4)))
            .unwrap();
        // Not subscribed, so the stale empty answer is still served
        assert!(cache.edge_schema(&store, g, LabelId(5)).unwrap().is_empty());

        cache.handle_event(&CatalogEvent::EdgeSchemaChanged { graph: GraphId(99) });
        let pairs = cache.edge_schema(&store, g, LabelId(5)).unwrap();
        assert_eq!(&pairs[..], &[(LabelId(3), LabelId(4))]);
    }

    #[test]
    fn test_vertex_label_sets() {
        let store = CatalogStore::in_memory(Arc::new(InvalidationBus::new())).unwrap();
        let g = GraphId(1);
        for (e, s, t) in [(5, 3, 4), (6, 3, 4), (5, 3, 7)] {
            store
                .insert_edge_schema_entry(EdgeSchemaEntry::new(g, LabelId(e), LabelId(s), LabelId(t)))
                .unwrap();
        }
        let cache = SchemaCache::new(&CacheConfig::default());

        let ends = cache.end_labels_from_start(&store, g, LabelId(3)).unwrap();
        assert_eq!(ends.iter().copied().collect::<Vec<_>>(), vec![LabelId(4), LabelId(7)]);
        let starts = cache.start_labels_from_end(&store, g, LabelId(4)).unwrap();
        assert_eq!(starts.iter().copied().collect::<Vec<_>>(), vec![LabelId(3)]);
    }
}
