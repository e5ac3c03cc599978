// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! GraphCat - graph catalog caching and label inference for a relational planner
//!
//! GraphCat keeps the catalog of a property graph layered on a relational
//! engine: graphs, their vertex and edge labels, and the observed
//! `(edge, start, end)` label combinations. On top of it sits a per-query
//! label inference context and two planner hooks that use it.
//!
//! # Features
//!
//! - **Catalog caches**: graph, label and edge schema lookups served from
//!   per-process caches kept coherent by catalog change events
//! - **Edge schema**: the label combinations each edge label has connected
//! - **Label inference**: per-variable label sets narrowed by intersection
//! - **Plan pruning**: polymorphic Append/MergeAppend scans reduced to the
//!   label partitions that can match
//! - **Cost reconciliation**: pruned row estimates propagated to join planning
//!
//! # Usage
//!
//! ```no_run
//! use graphcat::{plan, GraphCatConfig, GraphCatalog, PlannerHooks};
//! use std::sync::Arc;
//!
//! let config = GraphCatConfig::in_memory();
//! let catalog = Arc::new(GraphCatalog::open(&config).unwrap());
//! let hooks = PlannerHooks::new();
//! let inference = plan::install(&hooks, Arc::clone(&catalog), &config);
//! inference.context.write().reset();
//! ```

pub mod cache;
pub mod catalog;
pub mod config;
pub mod plan;
pub mod storage;

pub use cache::{CacheConfig, CatalogCache, InvalidationBus};
pub use catalog::{
    CatalogError, CatalogResult, EdgeSchemaEntry, GraphCatalog, GraphId, LabelId, LabelKind,
    RelationId,
};
pub use config::GraphCatConfig;
pub use plan::{InferenceContext, PlanError, PlannerHooks};

/// GraphCat version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// GraphCat crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
