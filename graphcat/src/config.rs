// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Runtime configuration for the catalog, its caches and label inference

use crate::cache::cache_config::CacheConfig;
use crate::storage::StorageType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphCatConfig {
    /// Use inferred labels to prune polymorphic scans and fix their row estimates
    pub infer_labels: bool,

    /// Backend holding the catalog tables
    pub storage: StorageType,

    /// Directory for durable backends
    pub data_dir: Option<PathBuf>,

    pub cache: CacheConfig,
}

impl Default for GraphCatConfig {
    fn default() -> Self {
        Self {
            infer_labels: true,
            storage: StorageType::Memory,
            data_dir: None,
            cache: CacheConfig::default(),
        }
    }
}

impl GraphCatConfig {
    /// In-memory catalog with caching and inference enabled
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Sled-backed catalog stored under `path`
    pub fn persistent<P: AsRef<Path>>(path: P) -> Self {
        Self {
            storage: StorageType::Sled,
            data_dir: Some(path.as_ref().to_path_buf()),
            ..Self::default()
        }
    }

    /// In-memory catalog with plan pruning and row reconciliation turned off
    pub fn without_inference() -> Self {
        Self {
            infer_labels: false,
            ..Self::default()
        }
    }

    /// Load a configuration document; missing fields take their defaults
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: GraphCatConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.storage == StorageType::Sled && self.data_dir.is_none() {
            return Err(ConfigError::Invalid(
                "sled storage requires data_dir".to_string(),
            ));
        }
        self.cache.validate().map_err(ConfigError::Invalid)
    }
}
