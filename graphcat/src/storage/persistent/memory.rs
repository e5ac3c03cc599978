// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! In-memory storage driver, the default backend for catalog stores in tests

use super::traits::{StorageDriver, StorageTree, TreeIter};
use super::types::{StorageResult, StorageType};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

type TreeData = Arc<RwLock<BTreeMap<Vec<u8>, Vec<u8>>>>;

/// In-memory storage driver
///
/// Trees opened twice under the same name share their contents.
#[derive(Default)]
pub struct MemoryStorageDriver {
    trees: RwLock<HashMap<String, TreeData>>,
}

/// In-memory tree implementation
pub struct MemoryTree {
    data: TreeData,
}

impl MemoryStorageDriver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageTree for MemoryTree {
    fn insert(&self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        self.data.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.data.read().get(key).cloned())
    }

    fn remove(&self, key: &[u8]) -> StorageResult<bool> {
        Ok(self.data.write().remove(key).is_some())
    }

    fn iter(&self) -> StorageResult<TreeIter<'_>> {
        // Snapshot so callers may mutate the tree while iterating
        let items: Vec<_> = self
            .data
            .read()
            .iter()
            .map(|(k, v)| Ok((k.clone(), v.clone())))
            .collect();
        Ok(Box::new(items.into_iter()))
    }

    fn last_key(&self) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.data.read().keys().next_back().cloned())
    }

    fn flush(&self) -> StorageResult<()> {
        Ok(())
    }
}

impl StorageDriver for MemoryStorageDriver {
    type Tree = Box<dyn StorageTree>;

    fn open<P: AsRef<Path>>(_path: P) -> StorageResult<Self> {
        Ok(Self::new())
    }

    fn open_tree(&self, name: &str) -> StorageResult<Self::Tree> {
        let data = self
            .trees
            .write()
            .entry(name.to_string())
            .or_default()
            .clone();
        Ok(Box::new(MemoryTree { data }) as Box<dyn StorageTree>)
    }

    fn flush(&self) -> StorageResult<()> {
        Ok(())
    }

    fn storage_type(&self) -> StorageType {
        StorageType::Memory
    }
}
