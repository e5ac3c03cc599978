// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Planner integration for label inference
//!
//! This module plugs into the host relational planner. [`install`] registers
//! the [`LabelInferencePruner`] on the path-list chain and the
//! [`CostReconciler`] on the join-search chain; [`uninstall`] removes both
//! and leaves any other registered hooks in place.

pub mod cost;
pub mod error;
pub mod hooks;
pub mod inference;
pub mod physical;
pub mod pruner;

pub use cost::{append_cost, merge_append_cost, CostReconciler, UnionCost};
pub use error::{PlanError, PlanResult};
pub use hooks::{JoinSearchHook, PlannerHooks, RelPathlistHook};
pub use inference::{Endpoint, InferenceContext, SharedInferenceContext};
pub use physical::{Path, PathKind, PlannerInfo, RangeTableEntry, RelOptInfo, RelOptKind, RtIndex};
pub use pruner::LabelInferencePruner;

use crate::catalog::manager::GraphCatalog;
use crate::config::GraphCatConfig;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Runtime switch for label inference, shared by both hooks
#[derive(Debug, Clone)]
pub struct InferLabelsFlag(Arc<AtomicBool>);

impl InferLabelsFlag {
    pub fn new(enabled: bool) -> Self {
        Self(Arc::new(AtomicBool::new(enabled)))
    }

    pub fn get(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set(&self, enabled: bool) {
        self.0.store(enabled, Ordering::Relaxed);
    }
}

/// Handles returned by [`install`]
#[derive(Debug, Clone)]
pub struct LabelInference {
    pub context: SharedInferenceContext,
    pub infer_labels: InferLabelsFlag,
}

/// Register the pruner and the cost reconciler on `hooks`
///
/// # Arguments
/// * `hooks` - Planner hook chains to extend
/// * `catalog` - Catalog used to map child relations to labels
/// * `config` - Supplies the initial `infer_labels` setting
///
/// # Returns
/// * The shared inference context and the runtime switch
pub fn install(
    hooks: &PlannerHooks,
    catalog: Arc<GraphCatalog>,
    config: &GraphCatConfig,
) -> LabelInference {
    let context = InferenceContext::shared();
    let infer_labels = InferLabelsFlag::new(config.infer_labels);

    hooks.add_pathlist_hook(Arc::new(LabelInferencePruner::new(
        catalog,
        Arc::clone(&context),
        infer_labels.clone(),
    )));
    hooks.add_join_search_hook(Arc::new(CostReconciler::new(
        Arc::clone(&context),
        infer_labels.clone(),
    )));
    log::info!(
        "label inference hooks installed (infer_labels={})",
        config.infer_labels
    );

    LabelInference {
        context,
        infer_labels,
    }
}

/// Remove the hooks registered by [`install`]
pub fn uninstall(hooks: &PlannerHooks) {
    let removed = hooks.remove(LabelInferencePruner::NAME) + hooks.remove(CostReconciler::NAME);
    log::info!("label inference hooks uninstalled ({} removed)", removed);
}
