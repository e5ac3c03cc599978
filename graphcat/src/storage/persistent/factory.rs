// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Storage driver factory

use super::memory::MemoryStorageDriver;
use super::traits::{StorageDriver, StorageTree};
use super::types::{StorageResult, StorageType};
use std::path::Path;

/// Boxed driver handed to the catalog store
pub type DynStorageDriver = Box<dyn StorageDriver<Tree = Box<dyn StorageTree>>>;

/// Create a storage driver based on configuration
///
/// # Arguments
/// * `storage_type` - The type of storage driver to create
/// * `path` - Filesystem path for durable drivers; ignored by the memory driver
///
/// # Returns
/// A boxed trait object that implements StorageDriver
pub fn create_storage_driver<P: AsRef<Path>>(
    storage_type: StorageType,
    path: P,
) -> StorageResult<DynStorageDriver> {
    match storage_type {
        #[cfg(feature = "sled-backend")]
        StorageType::Sled => {
            use super::sled::SledDriver;
            let driver = SledDriver::open(path)?;
            Ok(Box::new(driver) as DynStorageDriver)
        }
        #[cfg(not(feature = "sled-backend"))]
        StorageType::Sled => Err(super::types::StorageDriverError::BackendSpecific(
            "sled storage backend not compiled in (enable feature `sled-backend`)".to_string(),
        )),
        StorageType::Memory => {
            let driver = MemoryStorageDriver::open(path)?;
            Ok(Box::new(driver) as DynStorageDriver)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_memory_driver() {
        let driver = create_storage_driver(StorageType::Memory, "").unwrap();
        assert_eq!(driver.storage_type(), StorageType::Memory);
    }

    #[cfg(feature = "sled-backend")]
    #[test]
    fn test_create_sled_driver() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let driver = create_storage_driver(StorageType::Sled, temp_dir.path()).unwrap();
        assert_eq!(driver.storage_type(), StorageType::Sled);
    }
}
