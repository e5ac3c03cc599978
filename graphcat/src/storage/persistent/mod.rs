// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Persistent storage backends
//!
//! Trait-based key-value drivers holding the catalog tables. The catalog store
//! opens one tree per table and encodes rows with bincode.
//!
//! ```text
//! CatalogStore (graph, label, edge schema rows)
//!     ↓
//! StorageDriver (key-value abstraction)
//!     ↓
//! Concrete Implementations (Memory, Sled)
//! ```

pub mod factory;
pub mod traits;
pub mod types;

pub mod memory;
#[cfg(feature = "sled-backend")]
pub mod sled;

pub use factory::{create_storage_driver, DynStorageDriver};
pub use traits::{StorageDriver, StorageTree, TreeIter};
pub use types::{StorageDriverError, StorageResult, StorageType};
