// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Durable key-value storage for the catalog tables

pub mod persistent;

pub use persistent::{
    create_storage_driver, DynStorageDriver, StorageDriver, StorageDriverError, StorageTree,
    StorageType,
};
