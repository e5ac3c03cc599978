// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Graph catalog - the single external interface
//!
//! [`GraphCatalog`] resolves graphs and labels through the cache service,
//! answers edge schema questions, and runs the cascading deletions. Callers
//! never touch the caches directly.

use super::error::{CatalogError, CatalogResult};
use super::scan::{GraphScanKey, LabelScanKey};
use super::store::CatalogStore;
use super::types::{
    sequence_name_for, CatalogName, EdgeSchemaEntry, GraphEntityId, GraphId, GraphRecord,
    LabelId, LabelKind, LabelRecord, NamespaceId, RelationId,
};
use crate::cache::{CatalogCache, InvalidationBus, LabelIdSet};
use crate::config::GraphCatConfig;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Every `(start, end)` combination recorded for one edge label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeLabelSchema {
    pub graph: GraphId,
    pub edge_label_id: LabelId,
    pub entries: Vec<(LabelId, LabelId)>,
}

impl EdgeLabelSchema {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Catalog facade over the store and the cache service
pub struct GraphCatalog {
    store: Arc<CatalogStore>,
    cache: Arc<CatalogCache>,
}

impl GraphCatalog {
    /// Create a catalog over an existing store and cache service
    ///
    /// # Arguments
    /// * `store` - The catalog tables
    /// * `cache` - Cache service reading from the same store
    pub fn new(store: Arc<CatalogStore>, cache: Arc<CatalogCache>) -> Self {
        cache.initialize();
        Self { store, cache }
    }

    /// Open store, bus and caches as described by `config`
    ///
    /// # Returns
    /// * `Ok(GraphCatalog)` with an initialized cache service
    /// * `Err(CatalogError)` if the configuration is invalid or the backend fails to open
    pub fn open(config: &GraphCatConfig) -> CatalogResult<Self> {
        let bus = Arc::new(InvalidationBus::new());
        let store = Arc::new(CatalogStore::from_config(config, bus)?);
        let cache = Arc::new(CatalogCache::new(Arc::clone(&store), config.cache.clone()));
        Ok(Self::new(store, cache))
    }

    pub fn in_memory() -> CatalogResult<Self> {
        Self::open(&GraphCatConfig::in_memory())
    }

    pub fn store(&self) -> &Arc<CatalogStore> {
        &self.store
    }

    pub fn cache(&self) -> &Arc<CatalogCache> {
        &self.cache
    }

    // ---------------------------------------------------------------------
    // Graphs
    // ---------------------------------------------------------------------

    pub fn graph_by_name(&self, name: &str) -> CatalogResult<Option<GraphRecord>> {
        self.cache.graph_by_name(name)
    }

    pub fn graph_by_namespace(&self, namespace: NamespaceId) -> CatalogResult<Option<GraphRecord>> {
        self.cache.graph_by_namespace(namespace)
    }

    pub fn graph_id(&self, name: &str) -> CatalogResult<Option<GraphId>> {
        Ok(self.graph_by_name(name)?.map(|g| g.graph_id))
    }

    pub fn graph_exists(&self, graph: GraphId) -> CatalogResult<bool> {
        Ok(self.store.find_graph(&GraphScanKey::Id(graph))?.is_some())
    }

    /// Drop a graph with its schema rows and labels
    ///
    /// # Returns
    /// * `Ok(GraphRecord)` - the removed graph row
    /// * `Err(CatalogError::UndefinedObject)` if the graph does not exist
    pub fn drop_graph(&self, graph: GraphId) -> CatalogResult<GraphRecord> {
        if !self.graph_exists(graph)? {
            return Err(CatalogError::UndefinedObject(format!(
                "graph with oid {}",
                graph
            )));
        }

        self.store.delete_edge_schema_by_graph(graph)?;
        let labels = self.store.scan_labels(&LabelScanKey::Graph(graph))?;
        for label in &labels {
            self.store.delete_label(label.relation_id)?;
        }
        let row = self.store.delete_graph(graph)?;
        log::info!(
            "dropped graph \"{}\" with {} label(s)",
            row.name,
            labels.len()
        );
        Ok(row)
    }

    // ---------------------------------------------------------------------
    // Labels
    // ---------------------------------------------------------------------

    pub fn label_by_name(&self, name: &str, graph: GraphId) -> CatalogResult<Option<LabelRecord>> {
        self.cache.label_by_name(name, graph)
    }

    pub fn label_by_id(&self, graph: GraphId, label_id: LabelId) -> CatalogResult<Option<LabelRecord>> {
        self.cache.label_by_graph_label_id(graph, label_id)
    }

    pub fn label_by_relation(&self, relation: RelationId) -> CatalogResult<Option<LabelRecord>> {
        self.cache.label_by_relation(relation)
    }

    pub fn label_by_sequence(
        &self,
        sequence_name: &str,
        graph: GraphId,
    ) -> CatalogResult<Option<LabelRecord>> {
        self.cache.label_by_sequence(sequence_name, graph)
    }

    pub fn label_id(&self, name: &str, graph: GraphId) -> CatalogResult<Option<LabelId>> {
        Ok(self.label_by_name(name, graph)?.map(|l| l.label_id))
    }

    /// Like [`label_id`](Self::label_id) but maps "no such label" to [`LabelId::INVALID`]
    pub fn label_id_or_invalid(&self, name: &str, graph: GraphId) -> CatalogResult<LabelId> {
        Ok(self.label_id(name, graph)?.unwrap_or(LabelId::INVALID))
    }

    pub fn label_relation(&self, name: &str, graph: GraphId) -> CatalogResult<Option<RelationId>> {
        Ok(self.label_by_name(name, graph)?.map(|l| l.relation_id))
    }

    pub fn label_kind(&self, name: &str, graph: GraphId) -> CatalogResult<Option<LabelKind>> {
        Ok(self.label_by_name(name, graph)?.map(|l| l.kind))
    }

    pub fn label_id_exists(&self, graph: GraphId, label_id: LabelId) -> CatalogResult<bool> {
        Ok(self.label_by_id(graph, label_id)?.is_some())
    }

    pub fn label_id_to_relation(
        &self,
        graph: GraphId,
        label_id: LabelId,
    ) -> CatalogResult<Option<RelationId>> {
        Ok(self.label_by_id(graph, label_id)?.map(|l| l.relation_id))
    }

    /// Relation name of the id sequence backing `label_name`
    pub fn label_seq_relation_name(label_name: &str) -> CatalogName {
        sequence_name_for(label_name)
    }

    /// Label name of a vertex or edge id; empty for the default labels
    ///
    /// # Returns
    /// * `Ok(String)` - the label name, or `""` for `_ag_label_vertex`/`_ag_label_edge`
    /// * `Err(CatalogError::UndefinedObject)` if the graph or the label does not exist
    pub fn label_name_for_entity(
        &self,
        graph: GraphId,
        entity: GraphEntityId,
    ) -> CatalogResult<String> {
        if !self.graph_exists(graph)? {
            return Err(CatalogError::UndefinedObject(format!(
                "graph with oid {}",
                graph
            )));
        }

        let label_id = entity.label_id();
        let label = self.label_by_id(graph, label_id)?.ok_or_else(|| {
            CatalogError::UndefinedObject(format!(
                "label with id {} in graph {}",
                label_id, graph
            ))
        })?;

        if label.is_default() {
            Ok(String::new())
        } else {
            Ok(label.name.to_string())
        }
    }

    /// Names of every edge label of `graph`, read straight from the store
    pub fn edge_label_names(&self, graph: GraphId) -> CatalogResult<Vec<String>> {
        let labels = self
            .store
            .scan_labels(&LabelScanKey::GraphKind(graph, LabelKind::Edge))?;
        Ok(labels.into_iter().map(|l| l.name.to_string()).collect())
    }

    /// Delete a label and its edge schema rows
    pub fn delete_label(&self, relation: RelationId) -> CatalogResult<LabelRecord> {
        self.store.delete_label(relation)
    }

    // ---------------------------------------------------------------------
    // Edge schema
    // ---------------------------------------------------------------------

    pub fn edge_label_schema(&self, graph: GraphId, edge: LabelId) -> CatalogResult<EdgeLabelSchema> {
        let pairs = self.cache.edge_schema(graph, edge)?;
        Ok(EdgeLabelSchema {
            graph,
            edge_label_id: edge,
            entries: pairs.to_vec(),
        })
    }

    /// Distinct start labels recorded for an edge label
    pub fn edge_start_label_ids(&self, graph: GraphId, edge: LabelId) -> CatalogResult<BTreeSet<LabelId>> {
        let pairs = self.cache.edge_schema(graph, edge)?;
        Ok(pairs.iter().map(|(start, _)| *start).collect())
    }

    /// Distinct end labels recorded for an edge label
    pub fn edge_end_label_ids(&self, graph: GraphId, edge: LabelId) -> CatalogResult<BTreeSet<LabelId>> {
        let pairs = self.cache.edge_schema(graph, edge)?;
        Ok(pairs.iter().map(|(_, end)| *end).collect())
    }

    pub fn end_labels_from_start_vertex(
        &self,
        graph: GraphId,
        start: LabelId,
    ) -> CatalogResult<LabelIdSet> {
        self.cache.end_labels_from_start(graph, start)
    }

    pub fn start_labels_from_end_vertex(
        &self,
        graph: GraphId,
        end: LabelId,
    ) -> CatalogResult<LabelIdSet> {
        self.cache.start_labels_from_end(graph, end)
    }

    pub fn edge_labels_from_start_vertex(
        &self,
        graph: GraphId,
        start: LabelId,
    ) -> CatalogResult<BTreeSet<LabelId>> {
        self.store.edge_label_ids_from_start(graph, start)
    }

    pub fn edge_labels_from_end_vertex(
        &self,
        graph: GraphId,
        end: LabelId,
    ) -> CatalogResult<BTreeSet<LabelId>> {
        self.store.edge_label_ids_from_end(graph, end)
    }

    pub fn edge_schema_entry_exists(
        &self,
        graph: GraphId,
        edge: LabelId,
        start: LabelId,
        end: LabelId,
    ) -> CatalogResult<bool> {
        self.store.edge_schema_entry_exists(graph, edge, start, end)
    }

    pub fn graph_has_edge_schema_entries(&self, graph: GraphId) -> CatalogResult<bool> {
        self.store.graph_has_edge_schema_entries(graph)
    }

    pub fn insert_edge_schema_entry(&self, entry: EdgeSchemaEntry) -> CatalogResult<()> {
        self.store.insert_edge_schema_entry(entry)
    }

    /// Record an observed edge combination unless it is already known
    ///
    /// # Returns
    /// * `Ok(true)` if a row was added
    /// * `Ok(false)` if the combination was already recorded
    pub fn record_edge_schema(
        &self,
        graph: GraphId,
        edge: LabelId,
        start: LabelId,
        end: LabelId,
    ) -> CatalogResult<bool> {
        if self.edge_schema_entry_exists(graph, edge, start, end)? {
            return Ok(false);
        }
        self.insert_edge_schema_entry(EdgeSchemaEntry::new(graph, edge, start, end))?;
        Ok(true)
    }

    pub fn delete_edge_schema_by_edge_label(&self, graph: GraphId, edge: LabelId) -> CatalogResult<usize> {
        self.store.delete_edge_schema_by_edge_label(graph, edge)
    }

    pub fn delete_edge_schema_by_vertex_label(
        &self,
        graph: GraphId,
        vertex: LabelId,
    ) -> CatalogResult<usize> {
        self.store.delete_edge_schema_by_vertex_label(graph, vertex)
    }

    pub fn delete_edge_schema_by_graph(&self, graph: GraphId) -> CatalogResult<usize> {
        self.store.delete_edge_schema_by_graph(graph)
    }
}
