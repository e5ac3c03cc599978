// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Per-query label inference
//!
//! While a graph pattern is analyzed, every constraint that narrows the labels
//! a variable may carry is folded into the [`InferenceContext`]. Constraints
//! combine by intersection, so an entry only ever shrinks. An entry that
//! becomes empty marks the pattern as impossible for that variable.
//!
//! The `infer_*` helpers derive such constraints from the edge schema
//! catalog.

use crate::catalog::error::CatalogResult;
use crate::catalog::manager::GraphCatalog;
use crate::catalog::types::{GraphId, LabelId};
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Inference context shared between the analyzer and the planner hooks
pub type SharedInferenceContext = Arc<RwLock<InferenceContext>>;

#[derive(Debug, Clone, Default)]
pub struct InferenceContext {
    entries: HashMap<String, BTreeSet<LabelId>>,
}

impl InferenceContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedInferenceContext {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Forget every entry and release their storage; called at the start of each query
    pub fn reset(&mut self) {
        self.entries = HashMap::new();
    }

    /// Narrow `variable` to `labels`
    ///
    /// The first constraint creates the entry; later ones intersect with it.
    /// Anonymous variables (empty name) are ignored.
    pub fn add_inferred_labels<I>(&mut self, variable: &str, labels: I)
    where
        I: IntoIterator<Item = LabelId>,
    {
        if variable.is_empty() {
            return;
        }
        let incoming: BTreeSet<LabelId> = labels.into_iter().collect();
        match self.entries.get_mut(variable) {
            Some(current) => {
                current.retain(|label| incoming.contains(label));
                if current.is_empty() {
                    log::debug!("label inference for '{}' is contradictory", variable);
                }
            }
            None => {
                self.entries.insert(variable.to_string(), incoming);
            }
        }
    }

    pub fn get_inferred_labels(&self, variable: &str) -> Option<&BTreeSet<LabelId>> {
        self.entries.get(variable)
    }

    pub fn has_inferred_entry(&self, variable: &str) -> bool {
        self.entries.contains_key(variable)
    }

    /// Whether constraints on `variable` admit no label at all
    pub fn is_contradictory(&self, variable: &str) -> bool {
        self.entries.get(variable).is_some_and(BTreeSet::is_empty)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Which end of an edge a vertex sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    End,
}

/// Labels a vertex may carry at `endpoint` of an edge labeled `edge_label`
///
/// `None` when the graph has no recorded edge schema, in which case nothing
/// can be inferred.
pub fn infer_endpoint_labels(
    catalog: &GraphCatalog,
    graph: GraphId,
    edge_label: LabelId,
    endpoint: Endpoint,
) -> CatalogResult<Option<BTreeSet<LabelId>>> {
    if !catalog.graph_has_edge_schema_entries(graph)? {
        return Ok(None);
    }
    let labels = match endpoint {
        Endpoint::Start => catalog.edge_start_label_ids(graph, edge_label)?,
        Endpoint::End => catalog.edge_end_label_ids(graph, edge_label)?,
    };
    Ok(Some(labels))
}

/// Labels of edges that have a vertex labeled `vertex_label` at `endpoint`
pub fn infer_edge_labels(
    catalog: &GraphCatalog,
    graph: GraphId,
    vertex_label: LabelId,
    endpoint: Endpoint,
) -> CatalogResult<Option<BTreeSet<LabelId>>> {
    if !catalog.graph_has_edge_schema_entries(graph)? {
        return Ok(None);
    }
    let labels = match endpoint {
        Endpoint::Start => catalog.edge_labels_from_start_vertex(graph, vertex_label)?,
        Endpoint::End => catalog.edge_labels_from_end_vertex(graph, vertex_label)?,
    };
    Ok(Some(labels))
}

/// Labels of the vertex across any edge from a vertex labeled `vertex_label`
/// sitting at `endpoint`
pub fn infer_neighbor_labels(
    catalog: &GraphCatalog,
    graph: GraphId,
    vertex_label: LabelId,
    endpoint: Endpoint,
) -> CatalogResult<Option<BTreeSet<LabelId>>> {
    if !catalog.graph_has_edge_schema_entries(graph)? {
        return Ok(None);
    }
    let labels = match endpoint {
        Endpoint::Start => catalog.end_labels_from_start_vertex(graph, vertex_label)?,
        Endpoint::End => catalog.start_labels_from_end_vertex(graph, vertex_label)?,
    };
    Ok(Some(labels.iter().copied().collect()))
}
