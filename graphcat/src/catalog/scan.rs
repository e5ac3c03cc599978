// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Equality scan keys and unique indexes of the catalog tables

use super::types::{
    CatalogName, EdgeSchemaEntry, GraphId, GraphRecord, LabelId, LabelKind, LabelRecord,
    NamespaceId, RelationId,
};

/// Equality predicate over graph rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphScanKey {
    Id(GraphId),
    Name(CatalogName),
    Namespace(NamespaceId),
}

impl GraphScanKey {
    pub fn matches(&self, row: &GraphRecord) -> bool {
        match self {
            GraphScanKey::Id(id) => row.graph_id == *id,
            GraphScanKey::Name(name) => row.name == *name,
            GraphScanKey::Namespace(ns) => row.namespace == *ns,
        }
    }
}

/// Equality predicate over label rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelScanKey {
    NameGraph(CatalogName, GraphId),
    GraphLabelId(GraphId, LabelId),
    Relation(RelationId),
    SequenceGraph(CatalogName, GraphId),
    Graph(GraphId),
    GraphKind(GraphId, LabelKind),
}

impl LabelScanKey {
    pub fn matches(&self, row: &LabelRecord) -> bool {
        match self {
            LabelScanKey::NameGraph(name, graph) => row.name == *name && row.graph_id == *graph,
            LabelScanKey::GraphLabelId(graph, id) => row.graph_id == *graph && row.label_id == *id,
            LabelScanKey::Relation(rel) => row.relation_id == *rel,
            LabelScanKey::SequenceGraph(seq, graph) => {
                row.sequence_name == *seq && row.graph_id == *graph
            }
            LabelScanKey::Graph(graph) => row.graph_id == *graph,
            LabelScanKey::GraphKind(graph, kind) => row.graph_id == *graph && row.kind == *kind,
        }
    }
}

/// Conjunction of optional column equalities over edge schema rows
///
/// `vertex` matches a row whose start OR end label equals it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchemaScanKey {
    pub graph: Option<GraphId>,
    pub edge: Option<LabelId>,
    pub start: Option<LabelId>,
    pub end: Option<LabelId>,
    pub vertex: Option<LabelId>,
}

impl SchemaScanKey {
    pub fn graph(graph: GraphId) -> Self {
        Self {
            graph: Some(graph),
            ..Default::default()
        }
    }

    pub fn edge(mut self, edge: LabelId) -> Self {
        self.edge = Some(edge);
        self
    }

    pub fn start(mut self, start: LabelId) -> Self {
        self.start = Some(start);
        self
    }

    pub fn end(mut self, end: LabelId) -> Self {
        self.end = Some(end);
        self
    }

    pub fn vertex(mut self, vertex: LabelId) -> Self {
        self.vertex = Some(vertex);
        self
    }

    pub fn matches(&self, row: &EdgeSchemaEntry) -> bool {
        self.graph.map_or(true, |g| row.graph_id == g)
            && self.edge.map_or(true, |e| row.edge_label_id == e)
            && self.start.map_or(true, |s| row.start_label_id == s)
            && self.end.map_or(true, |e| row.end_label_id == e)
            && self.vertex.map_or(true, |v| row.touches_vertex(v))
    }
}

/// Unique indexes of the graph table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphIndex {
    Id,
    Name,
    Namespace,
}

impl GraphIndex {
    pub const ALL: [GraphIndex; 3] = [GraphIndex::Id, GraphIndex::Name, GraphIndex::Namespace];

    pub fn name(self) -> &'static str {
        match self {
            GraphIndex::Id => "ag_graph_graphid_index",
            GraphIndex::Name => "ag_graph_name_index",
            GraphIndex::Namespace => "ag_graph_namespace_index",
        }
    }

    pub fn key_for(self, row: &GraphRecord) -> GraphScanKey {
        match self {
            GraphIndex::Id => GraphScanKey::Id(row.graph_id),
            GraphIndex::Name => GraphScanKey::Name(row.name.clone()),
            GraphIndex::Namespace => GraphScanKey::Namespace(row.namespace),
        }
    }
}

/// Unique indexes of the label table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelIndex {
    NameGraph,
    GraphLabelId,
    Relation,
    SequenceGraph,
}

impl LabelIndex {
    pub const ALL: [LabelIndex; 4] = [
        LabelIndex::NameGraph,
        LabelIndex::GraphLabelId,
        LabelIndex::Relation,
        LabelIndex::SequenceGraph,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LabelIndex::NameGraph => "ag_label_name_graph_index",
            LabelIndex::GraphLabelId => "ag_label_graph_oid_index",
            LabelIndex::Relation => "ag_label_relation_index",
            LabelIndex::SequenceGraph => "ag_label_seq_name_graph_index",
        }
    }

    pub fn key_for(self, row: &LabelRecord) -> LabelScanKey {
        match self {
            LabelIndex::NameGraph => LabelScanKey::NameGraph(row.name.clone(), row.graph_id),
            LabelIndex::GraphLabelId => LabelScanKey::GraphLabelId(row.graph_id, row.label_id),
            LabelIndex::Relation => LabelScanKey::Relation(row.relation_id),
            LabelIndex::SequenceGraph => {
                LabelScanKey::SequenceGraph(row.sequence_name.clone(), row.graph_id)
            }
        }
    }
}
