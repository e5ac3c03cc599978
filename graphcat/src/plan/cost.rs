// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Union path costing and row estimate reconciliation
//!
//! The cost of an Append or MergeAppend is composed from its children. When
//! the pruner removes children the composite is recomputed with the same
//! rules, and [`CostReconciler`] later copies the pruned row count onto the
//! owning relation so join planning sees the smaller estimate.

use super::error::PlanResult;
use super::hooks::JoinSearchHook;
use super::inference::SharedInferenceContext;
use super::physical::{Path, PlannerInfo, RelOptInfo, RelOptKind};
use super::InferLabelsFlag;

/// Composite cost of a union over child paths
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UnionCost {
    /// Cost before the first row is returned
    pub startup_cost: f64,
    /// Cost to return every row
    pub total_cost: f64,
    /// Estimated output rows
    pub rows: f64,
}

/// Cost of an Append over `subpaths`
///
/// An unordered Append starts returning rows as soon as its first child does,
/// so its startup cost is that child's. An ordered Append pays every child's
/// startup before producing output.
pub fn append_cost(subpaths: &[Path], ordered: bool) -> UnionCost {
    let startup_cost = if ordered {
        subpaths.iter().map(|p| p.startup_cost).sum()
    } else {
        subpaths.first().map_or(0.0, |p| p.startup_cost)
    };
    UnionCost {
        startup_cost,
        total_cost: subpaths.iter().map(|p| p.total_cost).sum(),
        rows: subpaths.iter().map(|p| p.rows).sum(),
    }
}

/// Cost of a MergeAppend over `subpaths`
pub fn merge_append_cost(subpaths: &[Path]) -> UnionCost {
    UnionCost {
        startup_cost: subpaths.iter().map(|p| p.startup_cost).sum(),
        total_cost: subpaths.iter().map(|p| p.total_cost).sum(),
        rows: subpaths.iter().map(|p| p.rows).sum(),
    }
}

/// Aligns each polymorphic base relation's row estimate with its cheapest
/// total path before join enumeration
pub struct CostReconciler {
    context: SharedInferenceContext,
    enabled: InferLabelsFlag,
}

impl CostReconciler {
    pub const NAME: &'static str = "label_inference_cost_reconciler";

    pub fn new(context: SharedInferenceContext, enabled: InferLabelsFlag) -> Self {
        Self { context, enabled }
    }

    /// Reconcile one relation, returning whether its estimate changed
    pub fn reconcile(&self, root: &PlannerInfo, rel: &mut RelOptInfo) -> bool {
        if rel.kind != RelOptKind::BaseRel {
            return false;
        }
        let Some(variable) = root.rte(rel.relid).and_then(|rte| rte.polymorphic_variable()) else {
            return false;
        };
        if !self.context.read().has_inferred_entry(variable) {
            return false;
        }
        let Some(rows) = rel.cheapest_total_path().map(|p| p.rows) else {
            return false;
        };
        if rows == rel.rows {
            return false;
        }

        log::debug!(
            "reconciled row estimate for '{}': {} -> {}",
            variable,
            rel.rows,
            rows
        );
        rel.rows = rows;
        true
    }
}

impl JoinSearchHook for CostReconciler {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn before_join_search(
        &self,
        root: &PlannerInfo,
        _levels_needed: usize,
        initial_rels: &mut [RelOptInfo],
    ) -> PlanResult<()> {
        if !self.enabled.get() {
            return Ok(());
        }
        for rel in initial_rels.iter_mut() {
            self.reconcile(root, rel);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::types::{LabelId, RelationId, DEFAULT_VERTEX_LABEL};
    use crate::plan::inference::InferenceContext;
    use crate::plan::physical::RangeTableEntry;

    fn children() -> Vec<Path> {
        vec![
            Path::seq_scan(2, 10.0, 1.0, 20.0),
            Path::seq_scan(3, 30.0, 2.0, 40.0),
            Path::seq_scan(4, 5.0, 0.5, 8.0),
        ]
    }

    #[test]
    fn test_append_cost_unordered_uses_first_startup() {
        let cost = append_cost(&children(), false);
        assert_eq!(cost.startup_cost, 1.0);
        assert_eq!(cost.total_cost, 68.0);
        assert_eq!(cost.rows, 45.0);
    }

    #[test]
    fn test_append_cost_ordered_sums_startup() {
        let cost = append_cost(&children(), true);
        assert_eq!(cost.startup_cost, 3.5);
        assert_eq!(cost.total_cost, 68.0);
    }

    #[test]
    fn test_merge_append_cost_sums_everything() {
        let cost = merge_append_cost(&children());
        assert_eq!(cost.startup_cost, 3.5);
        assert_eq!(cost.rows, 45.0);
        assert_eq!(merge_append_cost(&[]), UnionCost::default());
    }

    #[test]
    fn test_reconcile_only_touches_inferred_roots() {
        let context = InferenceContext::shared();
        context.write().add_inferred_labels("n", [LabelId(3)]);
        let reconciler = CostReconciler::new(context, InferLabelsFlag::new(true));

        let mut root = PlannerInfo::new();
        let n = root.add_rte(
            RangeTableEntry::relation(RelationId(1), DEFAULT_VERTEX_LABEL, true).with_alias("n"),
        );
        let m = root.add_rte(
            RangeTableEntry::relation(RelationId(1), DEFAULT_VERTEX_LABEL, true).with_alias("m"),
        );

        let mut rels = vec![RelOptInfo::base(n, 1000.0), RelOptInfo::base(m, 1000.0)];
        for rel in rels.iter_mut() {
            rel.add_path(Path::seq_scan(rel.relid, 40.0, 0.0, 12.0));
            rel.set_cheapest();
        }

        reconciler.before_join_search(&root, 2, &mut rels).unwrap();
        assert_eq!(rels[0].rows, 40.0);
        assert_eq!(rels[1].rows, 1000.0);
    }

    #[test]
    fn test_reconcile_disabled_is_noop() {
        let context = InferenceContext::shared();
        context.write().add_inferred_labels("n", [LabelId(3)]);
        let reconciler = CostReconciler::new(context, InferLabelsFlag::new(false));

        let mut root = PlannerInfo::new();
        let n = root.add_rte(
            RangeTableEntry::relation(RelationId(1), DEFAULT_VERTEX_LABEL, true).with_alias("n"),
        );
        let mut rels = vec![RelOptInfo::base(n, 1000.0)];
        rels[0].add_path(Path::seq_scan(n, 40.0, 0.0, 12.0));
        rels[0].set_cheapest();

        reconciler.before_join_search(&root, 1, &mut rels).unwrap();
        assert_eq!(rels[0].rows, 1000.0);
    }
}
