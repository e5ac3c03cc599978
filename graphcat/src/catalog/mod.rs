// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Graph catalog
//!
//! Durable graph, label and edge schema records, their equality scans, and the
//! [`GraphCatalog`] facade resolving them through the cache service.

pub mod error;
pub mod manager;
pub mod scan;
pub mod store;
pub mod types;

pub use error::{CatalogError, CatalogResult};
pub use manager::{EdgeLabelSchema, GraphCatalog};
pub use store::CatalogStore;
pub use types::{
    CatalogName, EdgeSchemaEntry, GraphEntityId, GraphId, GraphRecord, LabelId, LabelKind,
    LabelRecord, NamespaceId, RelationId, DEFAULT_EDGE_LABEL, DEFAULT_VERTEX_LABEL,
};
