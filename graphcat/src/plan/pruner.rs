// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Label-based pruning of polymorphic scans
//!
//! A pattern variable without a label scans the default vertex or edge root,
//! which the planner expands into an Append (or MergeAppend) with one child
//! per label partition. When label inference narrowed the variable, children
//! whose label cannot match are removed and the union's cost is recomputed
//! from the survivors. A contradictory variable empties every union, leaving
//! a zero-row plan.

use super::cost::{append_cost, merge_append_cost};
use super::error::PlanResult;
use super::hooks::RelPathlistHook;
use super::inference::SharedInferenceContext;
use super::physical::{Path, PathKind, PlannerInfo, RangeTableEntry, RelOptInfo, RtIndex};
use super::InferLabelsFlag;
use crate::catalog::manager::GraphCatalog;
use crate::catalog::types::LabelId;
use std::collections::BTreeSet;
use std::sync::Arc;

pub struct LabelInferencePruner {
    catalog: Arc<GraphCatalog>,
    context: SharedInferenceContext,
    enabled: InferLabelsFlag,
}

impl LabelInferencePruner {
    pub const NAME: &'static str = "label_inference_pruner";

    pub fn new(
        catalog: Arc<GraphCatalog>,
        context: SharedInferenceContext,
        enabled: InferLabelsFlag,
    ) -> Self {
        Self {
            catalog,
            context,
            enabled,
        }
    }

    /// Prune the union paths of `rel` against the inferred labels of `rte`
    ///
    /// Leaves `rel` untouched when inference is off, the entry is not a
    /// polymorphic root scan, or its variable has no inference entry.
    pub fn prune(
        &self,
        root: &PlannerInfo,
        rel: &mut RelOptInfo,
        rte: &RangeTableEntry,
    ) -> PlanResult<()> {
        if !self.enabled.get() {
            return Ok(());
        }
        let Some(variable) = rte.polymorphic_variable() else {
            return Ok(());
        };
        let labels = match self.context.read().get_inferred_labels(variable) {
            Some(labels) => labels.clone(),
            None => return Ok(()),
        };

        if labels.is_empty() {
            log::debug!("no label can match '{}', emptying scan", variable);
            for path in rel
                .pathlist
                .iter_mut()
                .chain(rel.partial_pathlist.iter_mut())
            {
                if path.is_union() {
                    empty_union(path);
                }
            }
        } else {
            for path in rel.pathlist.iter_mut() {
                self.filter_union(root, path, &labels, variable)?;
            }
            for path in rel.partial_pathlist.iter_mut() {
                self.filter_union(root, path, &labels, variable)?;
            }
        }

        rel.set_cheapest();
        Ok(())
    }

    fn filter_union(
        &self,
        root: &PlannerInfo,
        path: &mut Path,
        labels: &BTreeSet<LabelId>,
        variable: &str,
    ) -> PlanResult<()> {
        let Some(children) = path.subpaths() else {
            return Ok(());
        };
        let original = children.len();

        let mut kept = Vec::with_capacity(original);
        for child in children {
            if self.child_may_match(root, child, labels)? {
                kept.push(child.clone());
            }
        }

        if kept.is_empty() {
            log::debug!(
                "no {} subpath matches '{}', emptying scan",
                path.node_name(),
                variable
            );
            empty_union(path);
            return Ok(());
        }
        if kept.len() == original {
            return Ok(());
        }

        log::debug!(
            "filtered {} {} -> {} subpaths for '{}'",
            path.node_name(),
            original,
            kept.len(),
            variable
        );
        let ordered = path.is_ordered();
        let cost = match &mut path.kind {
            PathKind::Append { subpaths } => {
                *subpaths = kept;
                append_cost(subpaths, ordered)
            }
            PathKind::MergeAppend { subpaths } => {
                *subpaths = kept;
                merge_append_cost(subpaths)
            }
            _ => return Ok(()),
        };
        path.startup_cost = cost.startup_cost;
        path.total_cost = cost.total_cost;
        path.rows = cost.rows;
        Ok(())
    }

    /// Whether a child scan may produce rows of one of `labels`
    ///
    /// Children that cannot be mapped to a label are kept.
    fn child_may_match(
        &self,
        root: &PlannerInfo,
        child: &Path,
        labels: &BTreeSet<LabelId>,
    ) -> PlanResult<bool> {
        let Some(relation) = root.rte(child.parent).and_then(RangeTableEntry::relation_id) else {
            log::warn!(
                "union child at range table index {} is not a relation scan, keeping it",
                child.parent
            );
            return Ok(true);
        };
        match self.catalog.label_by_relation(relation)? {
            Some(label) => Ok(labels.contains(&label.label_id)),
            None => {
                log::warn!("relation {} has no label, keeping its scan", relation);
                Ok(true)
            }
        }
    }
}

/// Turn a union into one producing nothing at no cost
fn empty_union(path: &mut Path) {
    if let PathKind::Append { subpaths } | PathKind::MergeAppend { subpaths } = &mut path.kind {
        subpaths.clear();
    }
    path.rows = 0.0;
    path.startup_cost = 0.0;
    path.total_cost = 0.0;
}

impl RelPathlistHook for LabelInferencePruner {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn set_rel_pathlist(
        &self,
        root: &PlannerInfo,
        rel: &mut RelOptInfo,
        _rti: RtIndex,
        rte: &RangeTableEntry,
    ) -> PlanResult<()> {
        self.prune(root, rel, rte)
    }
}
