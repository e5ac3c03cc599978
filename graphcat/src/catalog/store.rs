// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Durable catalog tables
//!
//! Three trees hold the graph, label and edge schema rows. Rows are bincode
//! encoded; unique indexes are checked by equality scans on insert. Mutations
//! serialize on one writer lock and broadcast their change event once the lock
//! is released. Every read first accepts pending invalidation events.

use super::error::{CatalogError, CatalogResult};
use super::scan::{GraphIndex, GraphScanKey, LabelIndex, LabelScanKey, SchemaScanKey};
use super::types::{
    CatalogName, EdgeSchemaEntry, GraphId, GraphRecord, LabelId, LabelKind, LabelRecord,
    NamespaceId, RelationId,
};
use crate::cache::invalidation::{CatalogEvent, InvalidationBus};
use crate::config::GraphCatConfig;
use crate::storage::persistent::memory::MemoryStorageDriver;
use crate::storage::{create_storage_driver, DynStorageDriver, StorageTree};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;

pub const GRAPH_TABLE: &str = "ag_graph";
pub const LABEL_TABLE: &str = "ag_label";
pub const SCHEMA_TABLE: &str = "ag_graph_schema";

/// State only touched while the writer lock is held
struct WriterState {
    next_schema_row: u64,
}

pub struct CatalogStore {
    driver: DynStorageDriver,
    graphs: Box<dyn StorageTree>,
    labels: Box<dyn StorageTree>,
    schema: Box<dyn StorageTree>,
    writer: Mutex<WriterState>,
    bus: Arc<InvalidationBus>,
}

impl CatalogStore {
    /// Open the catalog tables on `driver`, creating them if missing
    pub fn open(driver: DynStorageDriver, bus: Arc<InvalidationBus>) -> CatalogResult<Self> {
        let graphs = driver.open_tree(GRAPH_TABLE)?;
        let labels = driver.open_tree(LABEL_TABLE)?;
        let schema = driver.open_tree(SCHEMA_TABLE)?;

        let next_schema_row = match schema.last_key()? {
            Some(key) => decode_row_id(&key)? + 1,
            None => 1,
        };

        log::debug!(
            "opened catalog store on {} backend (next schema row {})",
            driver.storage_type(),
            next_schema_row
        );

        Ok(Self {
            driver,
            graphs,
            labels,
            schema,
            writer: Mutex::new(WriterState { next_schema_row }),
            bus,
        })
    }

    pub fn in_memory(bus: Arc<InvalidationBus>) -> CatalogResult<Self> {
        Self::open(Box::new(MemoryStorageDriver::new()), bus)
    }

    pub fn from_config(config: &GraphCatConfig, bus: Arc<InvalidationBus>) -> CatalogResult<Self> {
        config
            .validate()
            .map_err(|e| CatalogError::InvalidParameters(e.to_string()))?;
        let path = config.data_dir.clone().unwrap_or_default();
        let driver = create_storage_driver(config.storage, path)?;
        Self::open(driver, bus)
    }

    /// The channel this store announces its mutations on
    pub fn bus(&self) -> &Arc<InvalidationBus> {
        &self.bus
    }

    pub fn flush(&self) -> CatalogResult<()> {
        self.driver.flush()?;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Graph table
    // ---------------------------------------------------------------------

    pub fn insert_graph(
        &self,
        name: &str,
        graph_id: GraphId,
        namespace: NamespaceId,
    ) -> CatalogResult<GraphRecord> {
        if name.is_empty() {
            return Err(CatalogError::InvalidParameters(
                "graph name must not be empty".to_string(),
            ));
        }
        let row = GraphRecord {
            graph_id,
            name: CatalogName::new(name),
            namespace,
        };

        {
            let _writer = self.writer.lock();
            let existing: Vec<GraphRecord> = decode_all(&self.graphs)?;
            for index in GraphIndex::ALL {
                let key = index.key_for(&row);
                if existing.iter().any(|r| key.matches(r)) {
                    return Err(CatalogError::UniqueViolation {
                        index: index.name(),
                        detail: format!("{:?} already exists", key),
                    });
                }
            }
            self.graphs.insert(&graph_key(graph_id), &encode(&row)?)?;
        }

        log::debug!("inserted graph \"{}\" ({})", row.name, graph_id);
        self.bus.broadcast(CatalogEvent::NamespaceChanged)?;
        Ok(row)
    }

    /// Remove a graph row. Labels and schema rows are left to the caller.
    pub fn delete_graph(&self, graph_id: GraphId) -> CatalogResult<GraphRecord> {
        let row = {
            let _writer = self.writer.lock();
            let key = graph_key(graph_id);
            let row: GraphRecord = match self.graphs.get(&key)? {
                Some(bytes) => decode(&bytes)?,
                None => {
                    return Err(CatalogError::UndefinedObject(format!(
                        "graph with oid {}",
                        graph_id
                    )))
                }
            };
            self.graphs.remove(&key)?;
            row
        };

        log::debug!("deleted graph \"{}\" ({})", row.name, graph_id);
        self.bus.broadcast(CatalogEvent::NamespaceChanged)?;
        Ok(row)
    }

    pub fn scan_graphs(&self, key: &GraphScanKey) -> CatalogResult<Vec<GraphRecord>> {
        self.begin_read()?;
        if let GraphScanKey::Id(id) = key {
            return Ok(self.graph_by_key(*id)?.into_iter().collect());
        }
        let rows: Vec<GraphRecord> = decode_all(&self.graphs)?;
        Ok(rows.into_iter().filter(|r| key.matches(r)).collect())
    }

    pub fn find_graph(&self, key: &GraphScanKey) -> CatalogResult<Option<GraphRecord>> {
        Ok(self.scan_graphs(key)?.into_iter().next())
    }

    fn graph_by_key(&self, graph_id: GraphId) -> CatalogResult<Option<GraphRecord>> {
        self.graphs
            .get(&graph_key(graph_id))?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    // ---------------------------------------------------------------------
    // Label table
    // ---------------------------------------------------------------------

    /// Append a label row
    ///
    /// # Returns
    /// * `Ok(LabelRecord)` - the stored row, names truncated
    /// * `Err(CatalogError::InvalidParameters)` - empty name, invalid label or relation id
    /// * `Err(CatalogError::UniqueViolation)` - a unique index already holds the key
    pub fn insert_label(
        &self,
        name: &str,
        graph_id: GraphId,
        label_id: LabelId,
        kind: LabelKind,
        relation_id: RelationId,
        sequence_name: &str,
    ) -> CatalogResult<LabelRecord> {
        if name.is_empty() {
            return Err(CatalogError::InvalidParameters(
                "label name must not be empty".to_string(),
            ));
        }
        if !label_id.is_valid() {
            return Err(CatalogError::InvalidParameters(format!(
                "label id {} is outside {}..={}",
                label_id,
                LabelId::MIN,
                LabelId::MAX
            )));
        }
        if !relation_id.is_valid() {
            return Err(CatalogError::InvalidParameters(
                "label relation must be valid".to_string(),
            ));
        }

        let row = LabelRecord {
            name: CatalogName::new(name),
            graph_id,
            label_id,
            kind,
            relation_id,
            sequence_name: CatalogName::new(sequence_name),
        };

        {
            let _writer = self.writer.lock();
            let existing: Vec<LabelRecord> = decode_all(&self.labels)?;
            for index in LabelIndex::ALL {
                let key = index.key_for(&row);
                if existing.iter().any(|r| key.matches(r)) {
                    return Err(CatalogError::UniqueViolation {
                        index: index.name(),
                        detail: format!("{:?} already exists", key),
                    });
                }
            }
            self.labels.insert(&relation_key(relation_id), &encode(&row)?)?;
        }

        log::debug!(
            "inserted {} label \"{}\" (id {}, relation {}) in graph {}",
            kind,
            row.name,
            label_id,
            relation_id,
            graph_id
        );
        self.bus
            .broadcast(CatalogEvent::RelationChanged(Some(relation_id)))?;
        Ok(row)
    }

    /// Remove the label backed by `relation_id` and every edge schema row
    /// referencing it, inside one writer lock scope
    pub fn delete_label(&self, relation_id: RelationId) -> CatalogResult<LabelRecord> {
        let (row, swept) = {
            let writer = self.writer.lock();
            let key = relation_key(relation_id);
            let row: LabelRecord = match self.labels.get(&key)? {
                Some(bytes) => decode(&bytes)?,
                None => {
                    return Err(CatalogError::UndefinedObject(format!(
                        "label (relation={})",
                        relation_id
                    )))
                }
            };
            self.labels.remove(&key)?;

            let sweep = match row.kind {
                LabelKind::Edge => SchemaScanKey::graph(row.graph_id).edge(row.label_id),
                LabelKind::Vertex => SchemaScanKey::graph(row.graph_id).vertex(row.label_id),
            };
            let swept = self.remove_schema_rows(&writer, &sweep)?;
            (row, swept)
        };

        log::debug!(
            "deleted {} label \"{}\" (relation {}), swept {} schema row(s)",
            row.kind,
            row.name,
            relation_id,
            swept
        );
        // The schema caches must hear about the cascade even if a label
        // listener fails
        let relation_sent = self
            .bus
            .broadcast(CatalogEvent::RelationChanged(Some(relation_id)));
        let schema_sent = self.bus.broadcast(CatalogEvent::EdgeSchemaChanged {
            graph: row.graph_id,
        });
        relation_sent.and(schema_sent)?;
        Ok(row)
    }

    pub fn scan_labels(&self, key: &LabelScanKey) -> CatalogResult<Vec<LabelRecord>> {
        self.begin_read()?;
        if let LabelScanKey::Relation(rel) = key {
            return Ok(self.label_by_key(*rel)?.into_iter().collect());
        }
        let rows: Vec<LabelRecord> = decode_all(&self.labels)?;
        Ok(rows.into_iter().filter(|r| key.matches(r)).collect())
    }

    pub fn find_label(&self, key: &LabelScanKey) -> CatalogResult<Option<LabelRecord>> {
        Ok(self.scan_labels(key)?.into_iter().next())
    }

    fn label_by_key(&self, relation_id: RelationId) -> CatalogResult<Option<LabelRecord>> {
        self.labels
            .get(&relation_key(relation_id))?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    // ---------------------------------------------------------------------
    // Edge schema table
    // ---------------------------------------------------------------------

    /// Append a schema row without checking for an identical one
    pub fn insert_edge_schema_entry(&self, entry: EdgeSchemaEntry) -> CatalogResult<()> {
        {
            let mut writer = self.writer.lock();
            let row_id = writer.next_schema_row;
            self.schema.insert(&row_id.to_be_bytes(), &encode(&entry)?)?;
            writer.next_schema_row += 1;
        }

        log::debug!("inserted edge schema row {:?}", entry);
        self.bus.broadcast(CatalogEvent::EdgeSchemaChanged {
            graph: entry.graph_id,
        })
    }

    pub fn scan_edge_schema(&self, key: &SchemaScanKey) -> CatalogResult<Vec<EdgeSchemaEntry>> {
        self.begin_read()?;
        self.schema_rows(key)
    }

    pub fn edge_schema_entry_exists(
        &self,
        graph: GraphId,
        edge: LabelId,
        start: LabelId,
        end: LabelId,
    ) -> CatalogResult<bool> {
        let key = SchemaScanKey::graph(graph).edge(edge).start(start).end(end);
        Ok(!self.scan_edge_schema(&key)?.is_empty())
    }

    pub fn graph_has_edge_schema_entries(&self, graph: GraphId) -> CatalogResult<bool> {
        Ok(!self.scan_edge_schema(&SchemaScanKey::graph(graph))?.is_empty())
    }

    /// Start labels recorded for an edge label
    pub fn edge_start_label_ids(
        &self,
        graph: GraphId,
        edge: LabelId,
    ) -> CatalogResult<BTreeSet<LabelId>> {
        self.collect_label_ids(&SchemaScanKey::graph(graph).edge(edge), |e| {
            e.start_label_id
        })
    }

    /// End labels recorded for an edge label
    pub fn edge_end_label_ids(
        &self,
        graph: GraphId,
        edge: LabelId,
    ) -> CatalogResult<BTreeSet<LabelId>> {
        self.collect_label_ids(&SchemaScanKey::graph(graph).edge(edge), |e| e.end_label_id)
    }

    /// Edge labels leaving a start vertex label
    pub fn edge_label_ids_from_start(
        &self,
        graph: GraphId,
        start: LabelId,
    ) -> CatalogResult<BTreeSet<LabelId>> {
        self.collect_label_ids(&SchemaScanKey::graph(graph).start(start), |e| {
            e.edge_label_id
        })
    }

    /// Edge labels arriving at an end vertex label
    pub fn edge_label_ids_from_end(
        &self,
        graph: GraphId,
        end: LabelId,
    ) -> CatalogResult<BTreeSet<LabelId>> {
        self.collect_label_ids(&SchemaScanKey::graph(graph).end(end), |e| e.edge_label_id)
    }

    /// End vertex labels reachable in one hop from a start vertex label
    pub fn end_label_ids_from_start(
        &self,
        graph: GraphId,
        start: LabelId,
    ) -> CatalogResult<BTreeSet<LabelId>> {
        self.collect_label_ids(&SchemaScanKey::graph(graph).start(start), |e| {
            e.end_label_id
        })
    }

    /// Start vertex labels that reach an end vertex label in one hop
    pub fn start_label_ids_from_end(
        &self,
        graph: GraphId,
        end: LabelId,
    ) -> CatalogResult<BTreeSet<LabelId>> {
        self.collect_label_ids(&SchemaScanKey::graph(graph).end(end), |e| e.start_label_id)
    }

    pub fn delete_edge_schema_by_edge_label(
        &self,
        graph: GraphId,
        edge: LabelId,
    ) -> CatalogResult<usize> {
        self.sweep_schema(graph, &SchemaScanKey::graph(graph).edge(edge))
    }

    /// Remove rows whose start OR end label is `vertex`
    pub fn delete_edge_schema_by_vertex_label(
        &self,
        graph: GraphId,
        vertex: LabelId,
    ) -> CatalogResult<usize> {
        self.sweep_schema(graph, &SchemaScanKey::graph(graph).vertex(vertex))
    }

    pub fn delete_edge_schema_by_graph(&self, graph: GraphId) -> CatalogResult<usize> {
        self.sweep_schema(graph, &SchemaScanKey::graph(graph))
    }

    fn sweep_schema(&self, graph: GraphId, key: &SchemaScanKey) -> CatalogResult<usize> {
        let removed = {
            let writer = self.writer.lock();
            self.remove_schema_rows(&writer, key)?
        };
        log::debug!("swept {} edge schema row(s) matching {:?}", removed, key);
        self.bus.broadcast(CatalogEvent::EdgeSchemaChanged { graph })?;
        Ok(removed)
    }

    /// Caller must hold the writer lock
    fn remove_schema_rows(&self, _writer: &WriterState, key: &SchemaScanKey) -> CatalogResult<usize> {
        let mut doomed = Vec::new();
        for item in self.schema.iter()? {
            let (row_key, bytes) = item?;
            let entry: EdgeSchemaEntry = decode(&bytes)?;
            if key.matches(&entry) {
                doomed.push(row_key);
            }
        }
        for row_key in &doomed {
            self.schema.remove(row_key)?;
        }
        Ok(doomed.len())
    }

    fn schema_rows(&self, key: &SchemaScanKey) -> CatalogResult<Vec<EdgeSchemaEntry>> {
        let rows: Vec<EdgeSchemaEntry> = decode_all(&self.schema)?;
        Ok(rows.into_iter().filter(|r| key.matches(r)).collect())
    }

    fn collect_label_ids(
        &self,
        key: &SchemaScanKey,
        column: fn(&EdgeSchemaEntry) -> LabelId,
    ) -> CatalogResult<BTreeSet<LabelId>> {
        Ok(self.scan_edge_schema(key)?.iter().map(column).collect())
    }

    /// Opening a table delivers whatever invalidations are waiting
    fn begin_read(&self) -> CatalogResult<()> {
        self.bus.accept_pending()
    }
}

fn graph_key(graph_id: GraphId) -> [u8; 4] {
    graph_id.0.to_be_bytes()
}

fn relation_key(relation_id: RelationId) -> [u8; 4] {
    relation_id.0.to_be_bytes()
}

fn decode_row_id(key: &[u8]) -> CatalogResult<u64> {
    let bytes: [u8; 8] = key.try_into().map_err(|_| {
        CatalogError::Storage(format!(
            "malformed {} row key of {} bytes",
            SCHEMA_TABLE,
            key.len()
        ))
    })?;
    Ok(u64::from_be_bytes(bytes))
}

fn encode<T: Serialize>(row: &T) -> CatalogResult<Vec<u8>> {
    Ok(bincode::serialize(row)?)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> CatalogResult<T> {
    Ok(bincode::deserialize(bytes)?)
}

fn decode_all<T: DeserializeOwned>(tree: &dyn StorageTree) -> CatalogResult<Vec<T>> {
    let mut rows = Vec::new();
    for item in tree.iter()? {
        let (_, bytes) = item?;
        rows.push(decode(&bytes)?);
    }
    Ok(rows)
}
