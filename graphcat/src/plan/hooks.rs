// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Planner extension points
//!
//! The host planner exposes two hook chains. Path-list hooks run after the
//! paths of a relation are generated, oldest registration first, so each hook
//! sees what earlier ones produced. Join-search hooks run before join
//! enumeration, newest registration first, and every hook always runs.

use super::error::PlanResult;
use super::physical::{PlannerInfo, RangeTableEntry, RelOptInfo, RtIndex};
use parking_lot::RwLock;
use std::sync::Arc;

/// Called after a relation's candidate paths exist
pub trait RelPathlistHook: Send + Sync {
    fn name(&self) -> &str;

    fn set_rel_pathlist(
        &self,
        root: &PlannerInfo,
        rel: &mut RelOptInfo,
        rti: RtIndex,
        rte: &RangeTableEntry,
    ) -> PlanResult<()>;
}

/// Called before the join search over the base relations
pub trait JoinSearchHook: Send + Sync {
    fn name(&self) -> &str;

    fn before_join_search(
        &self,
        root: &PlannerInfo,
        levels_needed: usize,
        initial_rels: &mut [RelOptInfo],
    ) -> PlanResult<()>;
}

/// Registered hook chains of one planner
#[derive(Default)]
pub struct PlannerHooks {
    pathlist: RwLock<Vec<Arc<dyn RelPathlistHook>>>,
    join_search: RwLock<Vec<Arc<dyn JoinSearchHook>>>,
}

impl PlannerHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_pathlist_hook(&self, hook: Arc<dyn RelPathlistHook>) {
        log::debug!("registered path-list hook '{}'", hook.name());
        self.pathlist.write().push(hook);
    }

    pub fn add_join_search_hook(&self, hook: Arc<dyn JoinSearchHook>) {
        log::debug!("registered join-search hook '{}'", hook.name());
        self.join_search.write().push(hook);
    }

    /// Remove every hook registered under `name`, leaving others in order
    ///
    /// Returns the number of hooks removed.
    pub fn remove(&self, name: &str) -> usize {
        let mut removed = 0;
        {
            let mut hooks = self.pathlist.write();
            let before = hooks.len();
            hooks.retain(|h| h.name() != name);
            removed += before - hooks.len();
        }
        {
            let mut hooks = self.join_search.write();
            let before = hooks.len();
            hooks.retain(|h| h.name() != name);
            removed += before - hooks.len();
        }
        removed
    }

    pub fn pathlist_hook_names(&self) -> Vec<String> {
        self.pathlist.read().iter().map(|h| h.name().to_string()).collect()
    }

    pub fn join_search_hook_names(&self) -> Vec<String> {
        self.join_search
            .read()
            .iter()
            .map(|h| h.name().to_string())
            .collect()
    }

    /// Run the path-list chain for range table entry `rti`
    pub fn run_set_rel_pathlist(
        &self,
        root: &PlannerInfo,
        rel: &mut RelOptInfo,
        rti: RtIndex,
    ) -> PlanResult<()> {
        let rte = root.rte_checked(rti)?;
        let hooks = self.pathlist.read().clone();
        for hook in hooks {
            hook.set_rel_pathlist(root, rel, rti, rte)
                .map_err(|e| e.in_hook(hook.name()))?;
        }
        Ok(())
    }

    /// Run the join-search chain
    pub fn run_join_search(
        &self,
        root: &PlannerInfo,
        levels_needed: usize,
        initial_rels: &mut [RelOptInfo],
    ) -> PlanResult<()> {
        let hooks = self.join_search.read().clone();
        for hook in hooks.iter().rev() {
            hook.before_join_search(root, levels_needed, initial_rels)
                .map_err(|e| e.in_hook(hook.name()))?;
        }
        Ok(())
    }
}
