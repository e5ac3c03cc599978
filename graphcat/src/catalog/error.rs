// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for the graph catalog

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The named or numbered catalog object does not exist
    #[error("{0} does not exist")]
    UndefinedObject(String),

    /// A unique index of a catalog table rejected the row
    #[error("duplicate key value violates unique index \"{index}\": {detail}")]
    UniqueViolation { index: &'static str, detail: String },

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Cache state no longer matches what the cache believed it held; not recoverable
    #[error("catalog cache corrupted: {0}")]
    InternalInconsistency(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CatalogError {
    /// Whether this error leaves the cache layer in an unusable state
    pub fn is_fatal(&self) -> bool {
        matches!(self, CatalogError::InternalInconsistency(_))
    }
}

impl From<crate::storage::StorageDriverError> for CatalogError {
    fn from(err: crate::storage::StorageDriverError) -> Self {
        CatalogError::Storage(err.to_string())
    }
}

impl From<bincode::Error> for CatalogError {
    fn from(err: bincode::Error) -> Self {
        CatalogError::Serialization(err.to_string())
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_message_names_index() {
        let err = CatalogError::UniqueViolation {
            index: "ag_label_name_graph_index",
            detail: "(name, graph)=(Person, 7)".to_string(),
        };
        assert!(err.to_string().contains("ag_label_name_graph_index"));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_only_inconsistency_is_fatal() {
        assert!(CatalogError::InternalInconsistency("x".into()).is_fatal());
        assert!(!CatalogError::UndefinedObject("label \"x\"".into()).is_fatal());
    }
}
