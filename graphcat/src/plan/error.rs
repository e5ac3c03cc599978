// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for planner integration

use crate::catalog::error::CatalogError;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum PlanError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("range table index {0} is out of range")]
    InvalidRangeTableIndex(usize),

    #[error("planner hook '{hook}' failed: {source}")]
    HookFailed {
        hook: String,
        #[source]
        source: Box<PlanError>,
    },
}

impl PlanError {
    /// Attribute an error to the hook that raised it
    pub fn in_hook(self, hook: &str) -> Self {
        match self {
            already @ PlanError::HookFailed { .. } => already,
            other => PlanError::HookFailed {
                hook: hook.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// Whether the underlying cause is a corrupted catalog cache
    pub fn is_fatal(&self) -> bool {
        match self {
            PlanError::Catalog(e) => e.is_fatal(),
            PlanError::HookFailed { source, .. } => source.is_fatal(),
            PlanError::InvalidRangeTableIndex(_) => false,
        }
    }
}

pub type PlanResult<T> = Result<T, PlanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_hook_wraps_once_and_keeps_fatality() {
        let err = PlanError::from(CatalogError::InternalInconsistency("x".into()))
            .in_hook("inner")
            .in_hook("outer");
        match &err {
            PlanError::HookFailed { hook, .. } => assert_eq!(hook, "inner"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(err.is_fatal());
        assert!(!PlanError::InvalidRangeTableIndex(3).in_hook("h").is_fatal());
    }
}
