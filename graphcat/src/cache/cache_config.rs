// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog cache configuration

use serde::{Deserialize, Serialize};

/// Configuration shared by every catalog cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// When false every lookup reads the catalog store directly
    pub enabled: bool,

    /// Initial bucket capacity of each cache map
    pub initial_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_capacity: 16,
        }
    }
}

impl CacheConfig {
    /// Configuration that sends every lookup to the store
    pub fn bypass() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.enabled && self.initial_capacity == 0 {
            return Err("Cache initial_capacity must be > 0 when caching is enabled".to_string());
        }
        Ok(())
    }
}
