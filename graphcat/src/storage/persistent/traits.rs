// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Storage driver traits
//!
//! Every driver exposes named trees of ordered byte keys. The catalog store keeps
//! one tree per catalog table and encodes rows itself.

use super::types::{StorageResult, StorageType};
use std::path::Path;

/// Iterator over the `(key, value)` pairs of a tree, in ascending key order
pub type TreeIter<'a> = Box<dyn Iterator<Item = StorageResult<(Vec<u8>, Vec<u8>)>> + 'a>;

/// A named collection of key-value pairs within a storage driver
pub trait StorageTree: Send + Sync {
    /// Insert a key-value pair, replacing any previous value
    fn insert(&self, key: &[u8], value: &[u8]) -> StorageResult<()>;

    /// Get a value by key
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>>;

    /// Remove a key, returning whether it was present
    fn remove(&self, key: &[u8]) -> StorageResult<bool>;

    /// Iterate over all key-value pairs in ascending key order
    fn iter(&self) -> StorageResult<TreeIter<'_>>;

    /// Greatest key currently stored
    fn last_key(&self) -> StorageResult<Option<Vec<u8>>>;

    /// Flush any pending writes to disk
    fn flush(&self) -> StorageResult<()>;
}

/// Main storage driver trait
pub trait StorageDriver: Send + Sync {
    /// Type of tree used by this driver
    type Tree: StorageTree;

    /// Open or create a storage driver at the given path
    fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self>
    where
        Self: Sized;

    /// Open or create a named tree
    fn open_tree(&self, name: &str) -> StorageResult<Self::Tree>;

    /// Flush all pending writes to disk
    fn flush(&self) -> StorageResult<()>;

    fn storage_type(&self) -> StorageType;
}

// Lets drivers hand out boxed trees behind `dyn StorageDriver`
impl StorageTree for Box<dyn StorageTree> {
    fn insert(&self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        (**self).insert(key, value)
    }

    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn remove(&self, key: &[u8]) -> StorageResult<bool> {
        (**self).remove(key)
    }

    fn iter(&self) -> StorageResult<TreeIter<'_>> {
        (**self).iter()
    }

    fn last_key(&self) -> StorageResult<Option<Vec<u8>>> {
        (**self).last_key()
    }

    fn flush(&self) -> StorageResult<()> {
        (**self).flush()
    }
}
