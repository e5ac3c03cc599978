// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Host planner structures seen by the planner hooks
//!
//! A minimal model of the relational planner's per-query state: the range
//! table, one [`RelOptInfo`] per relation with its candidate [`Path`]s, and the
//! cheapest-path bookkeeping. A polymorphic vertex or edge scan is a relation
//! over a default label root whose paths are Append or MergeAppend nodes with
//! one child scan per label partition.

use super::cost::{append_cost, merge_append_cost, UnionCost};
use super::error::{PlanError, PlanResult};
use crate::catalog::types::{is_default_label, RelationId};
use std::cmp::Ordering;

/// 1-based position in the range table
pub type RtIndex = usize;

#[derive(Debug, Clone, PartialEq)]
pub enum RteKind {
    Relation {
        relation_id: RelationId,
        /// Whether the scan also covers child partitions
        inherited: bool,
    },
    Subquery,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeTableEntry {
    pub kind: RteKind,
    pub relation_name: Option<String>,
    /// Set by the query parser to the pattern variable name
    pub alias: Option<String>,
}

impl RangeTableEntry {
    pub fn relation(relation_id: RelationId, name: &str, inherited: bool) -> Self {
        Self {
            kind: RteKind::Relation {
                relation_id,
                inherited,
            },
            relation_name: Some(name.to_string()),
            alias: None,
        }
    }

    pub fn subquery() -> Self {
        Self {
            kind: RteKind::Subquery,
            relation_name: None,
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    pub fn relation_id(&self) -> Option<RelationId> {
        match self.kind {
            RteKind::Relation { relation_id, .. } => Some(relation_id),
            _ => None,
        }
    }

    /// Pattern variable of an inherited scan over a default label root
    ///
    /// `None` for every other entry, including unaliased root scans.
    pub fn polymorphic_variable(&self) -> Option<&str> {
        let RteKind::Relation {
            inherited: true, ..
        } = self.kind
        else {
            return None;
        };
        let name = self.relation_name.as_deref()?;
        if !is_default_label(name) {
            return None;
        }
        self.alias.as_deref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlannerInfo {
    range_table: Vec<RangeTableEntry>,
}

impl PlannerInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, returning its index
    pub fn add_rte(&mut self, rte: RangeTableEntry) -> RtIndex {
        self.range_table.push(rte);
        self.range_table.len()
    }

    pub fn rte(&self, index: RtIndex) -> Option<&RangeTableEntry> {
        index
            .checked_sub(1)
            .and_then(|i| self.range_table.get(i))
    }

    pub fn rte_checked(&self, index: RtIndex) -> PlanResult<&RangeTableEntry> {
        self.rte(index)
            .ok_or(PlanError::InvalidRangeTableIndex(index))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PathKind {
    SeqScan,
    /// Unordered union of child paths
    Append { subpaths: Vec<Path> },
    /// Ordered union merging sorted child paths
    MergeAppend { subpaths: Vec<Path> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    /// Range table index of the relation this path produces
    pub parent: RtIndex,
    pub kind: PathKind,
    pub rows: f64,
    pub startup_cost: f64,
    pub total_cost: f64,
    /// Sort order of the output; empty when unordered
    pub pathkeys: Vec<String>,
}

impl Path {
    pub fn seq_scan(parent: RtIndex, rows: f64, startup_cost: f64, total_cost: f64) -> Self {
        Self {
            parent,
            kind: PathKind::SeqScan,
            rows,
            startup_cost,
            total_cost,
            pathkeys: Vec::new(),
        }
    }

    /// Append over `subpaths`, costed by the union rules
    pub fn append(parent: RtIndex, subpaths: Vec<Path>, pathkeys: Vec<String>) -> Self {
        let cost = append_cost(&subpaths, !pathkeys.is_empty());
        Self::union(parent, PathKind::Append { subpaths }, pathkeys, cost)
    }

    /// MergeAppend over `subpaths`, costed by the union rules
    pub fn merge_append(parent: RtIndex, subpaths: Vec<Path>, pathkeys: Vec<String>) -> Self {
        let cost = merge_append_cost(&subpaths);
        Self::union(parent, PathKind::MergeAppend { subpaths }, pathkeys, cost)
    }

    fn union(parent: RtIndex, kind: PathKind, pathkeys: Vec<String>, cost: UnionCost) -> Self {
        Self {
            parent,
            kind,
            rows: cost.rows,
            startup_cost: cost.startup_cost,
            total_cost: cost.total_cost,
            pathkeys,
        }
    }

    pub fn is_union(&self) -> bool {
        matches!(
            self.kind,
            PathKind::Append { .. } | PathKind::MergeAppend { .. }
        )
    }

    pub fn subpaths(&self) -> Option<&[Path]> {
        match &self.kind {
            PathKind::Append { subpaths } | PathKind::MergeAppend { subpaths } => Some(subpaths),
            _ => None,
        }
    }

    pub fn is_ordered(&self) -> bool {
        !self.pathkeys.is_empty()
    }

    /// Short operator name for logs
    pub fn node_name(&self) -> &'static str {
        match self.kind {
            PathKind::SeqScan => "SeqScan",
            PathKind::Append { .. } => "Append",
            PathKind::MergeAppend { .. } => "MergeAppend",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelOptKind {
    BaseRel,
    JoinRel,
    OtherMemberRel,
}

/// Planner state for one relation
#[derive(Debug, Clone)]
pub struct RelOptInfo {
    pub relid: RtIndex,
    pub kind: RelOptKind,
    /// Estimated output rows, fixed before paths are built
    pub rows: f64,
    pub pathlist: Vec<Path>,
    /// Paths usable below a parallel gather
    pub partial_pathlist: Vec<Path>,
    cheapest_startup: Option<usize>,
    cheapest_total: Option<usize>,
}

impl RelOptInfo {
    pub fn base(relid: RtIndex, rows: f64) -> Self {
        Self {
            relid,
            kind: RelOptKind::BaseRel,
            rows,
            pathlist: Vec::new(),
            partial_pathlist: Vec::new(),
            cheapest_startup: None,
            cheapest_total: None,
        }
    }

    pub fn add_path(&mut self, path: Path) {
        self.pathlist.push(path);
    }

    pub fn add_partial_path(&mut self, path: Path) {
        self.partial_pathlist.push(path);
    }

    /// Recompute the cheapest startup and total paths
    pub fn set_cheapest(&mut self) {
        self.cheapest_total = pick_cheapest(&self.pathlist, |a, b| {
            a.total_cost
                .total_cmp(&b.total_cost)
                .then(a.startup_cost.total_cmp(&b.startup_cost))
        });
        self.cheapest_startup = pick_cheapest(&self.pathlist, |a, b| {
            a.startup_cost
                .total_cmp(&b.startup_cost)
                .then(a.total_cost.total_cmp(&b.total_cost))
        });
    }

    pub fn cheapest_total_path(&self) -> Option<&Path> {
        self.cheapest_total.and_then(|i| self.pathlist.get(i))
    }

    pub fn cheapest_startup_path(&self) -> Option<&Path> {
        self.cheapest_startup.and_then(|i| self.pathlist.get(i))
    }
}

/// First path that no later path beats
fn pick_cheapest<F>(paths: &[Path], cmp: F) -> Option<usize>
where
    F: Fn(&Path, &Path) -> Ordering,
{
    let mut best: Option<usize> = None;
    for (i, path) in paths.iter().enumerate() {
        match best {
            Some(b) if cmp(path, &paths[b]) != Ordering::Less => {}
            _ => best = Some(i),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::types::{DEFAULT_EDGE_LABEL, DEFAULT_VERTEX_LABEL};

    #[test]
    fn test_polymorphic_variable_requires_inherited_aliased_root() {
        let root = RangeTableEntry::relation(RelationId(1), DEFAULT_VERTEX_LABEL, true).with_alias("n");
        assert_eq!(root.polymorphic_variable(), Some("n"));

        let edge_root = RangeTableEntry::relation(RelationId(2), DEFAULT_EDGE_LABEL, true).with_alias("e");
        assert_eq!(edge_root.polymorphic_variable(), Some("e"));

        let unaliased = RangeTableEntry::relation(RelationId(1), DEFAULT_VERTEX_LABEL, true);
        assert_eq!(unaliased.polymorphic_variable(), None);

        let only = RangeTableEntry::relation(RelationId(1), DEFAULT_VERTEX_LABEL, false).with_alias("n");
        assert_eq!(only.polymorphic_variable(), None);

        let person = RangeTableEntry::relation(RelationId(3), "Person", true).with_alias("n");
        assert_eq!(person.polymorphic_variable(), None);

        assert_eq!(RangeTableEntry::subquery().with_alias("n").polymorphic_variable(), None);
    }

    #[test]
    fn test_range_table_is_one_based() {
        let mut root = PlannerInfo::new();
        let idx = root.add_rte(RangeTableEntry::subquery());
        assert_eq!(idx, 1);
        assert!(root.rte(0).is_none());
        assert!(root.rte(1).is_some());
        assert!(matches!(
            root.rte_checked(2),
            Err(PlanError::InvalidRangeTableIndex(2))
        ));
    }

    #[test]
    fn test_set_cheapest_breaks_ties_on_other_cost() {
        let mut rel = RelOptInfo::base(1, 100.0);
        rel.add_path(Path::seq_scan(1, 100.0, 5.0, 50.0));
        rel.add_path(Path::seq_scan(1, 100.0, 1.0, 50.0));
        rel.add_path(Path::seq_scan(1, 100.0, 0.0, 80.0));
        rel.set_cheapest();

        assert_eq!(rel.cheapest_total_path().unwrap().startup_cost, 1.0);
        assert_eq!(rel.cheapest_startup_path().unwrap().total_cost, 80.0);
    }

    #[test]
    fn test_set_cheapest_on_empty_pathlist() {
        let mut rel = RelOptInfo::base(1, 10.0);
        rel.set_cheapest();
        assert!(rel.cheapest_total_path().is_none());
    }
}
