// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Label record caches
//!
//! Four maps over the same rows, one per unique index of the label table.
//! Every entry carries its relation id, which is what invalidation matches on.

use super::invalidation::CatalogEvent;
use super::{CacheConfig, CacheStatsSnapshot, KeyedMap};
use crate::catalog::error::CatalogResult;
use crate::catalog::scan::LabelScanKey;
use crate::catalog::store::CatalogStore;
use crate::catalog::types::{CatalogName, GraphId, LabelId, LabelRecord, RelationId};

pub struct LabelCache {
    by_name: KeyedMap<(CatalogName, GraphId), LabelRecord>,
    by_graph_label_id: KeyedMap<(GraphId, LabelId), LabelRecord>,
    by_relation: KeyedMap<RelationId, LabelRecord>,
    by_sequence: KeyedMap<(CatalogName, GraphId), LabelRecord>,
}

impl LabelCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            by_name: KeyedMap::new("label_name_graph", config),
            by_graph_label_id: KeyedMap::new("label_graph_oid", config),
            by_relation: KeyedMap::new("label_relation", config),
            by_sequence: KeyedMap::new("label_seq_name_graph", config),
        }
    }

    pub fn by_name(
        &self,
        store: &CatalogStore,
        name: &str,
        graph: GraphId,
    ) -> CatalogResult<Option<LabelRecord>> {
        let key = (CatalogName::new(name), graph);
        self.by_name.find_or_fill(&key, || {
            store.find_label(&LabelScanKey::NameGraph(key.0.clone(), graph))
        })
    }

    pub fn by_graph_label_id(
        &self,
        store: &CatalogStore,
        graph: GraphId,
        label_id: LabelId,
    ) -> CatalogResult<Option<LabelRecord>> {
        self.by_graph_label_id.find_or_fill(&(graph, label_id), || {
            store.find_label(&LabelScanKey::GraphLabelId(graph, label_id))
        })
    }

    pub fn by_relation(
        &self,
        store: &CatalogStore,
        relation: RelationId,
    ) -> CatalogResult<Option<LabelRecord>> {
        self.by_relation.find_or_fill(&relation, || {
            store.find_label(&LabelScanKey::Relation(relation))
        })
    }

    pub fn by_sequence(
        &self,
        store: &CatalogStore,
        sequence_name: &str,
        graph: GraphId,
    ) -> CatalogResult<Option<LabelRecord>> {
        let key = (CatalogName::new(sequence_name), graph);
        self.by_sequence.find_or_fill(&key, || {
            store.find_label(&LabelScanKey::SequenceGraph(key.0.clone(), graph))
        })
    }

    /// Drop every entry backed by `relation` from all four maps
    ///
    /// An unknown relation is a no-op. A matching entry that cannot be
    /// removed means the cache is corrupted.
    pub fn invalidate_relation(&self, relation: RelationId) -> CatalogResult<usize> {
        let matches = |row: &LabelRecord| row.relation_id == relation;
        let removed = self.by_name.remove_where(matches)?
            + self.by_graph_label_id.remove_where(matches)?
            + self.by_relation.remove_where(matches)?
            + self.by_sequence.remove_where(matches)?;
        if removed > 0 {
            log::debug!(
                "invalidated {} label cache entries for relation {}",
                removed,
                relation
            );
        }
        Ok(removed)
    }

    pub fn handle_event(&self, event: &CatalogEvent) -> CatalogResult<()> {
        match event {
            CatalogEvent::RelationChanged(Some(relation)) if relation.is_valid() => {
                self.invalidate_relation(*relation)?;
            }
            CatalogEvent::RelationChanged(_) => self.flush(),
            CatalogEvent::NamespaceChanged | CatalogEvent::EdgeSchemaChanged { .. } => {}
        }
        Ok(())
    }

    pub fn flush(&self) {
        self.by_name.flush();
        self.by_graph_label_id.flush();
        self.by_relation.flush();
        self.by_sequence.flush();
    }

    pub fn stats(&self) -> Vec<CacheStatsSnapshot> {
        vec![
            self.by_name.snapshot(),
            self.by_graph_label_id.snapshot(),
            self.by_relation.snapshot(),
            self.by_sequence.snapshot(),
        ]
    }

    #[cfg(test)]
    fn total_entries(&self) -> usize {
        self.by_name.len()
            + self.by_graph_label_id.len()
            + self.by_relation.len()
            + self.by_sequence.len()
    }
}
