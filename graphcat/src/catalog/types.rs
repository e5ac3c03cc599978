// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog record types and identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum stored length of a catalog name, in bytes
pub const NAME_MAX_LEN: usize = 63;

/// Name of the polymorphic root partition holding every vertex of a graph
pub const DEFAULT_VERTEX_LABEL: &str = "_ag_label_vertex";

/// Name of the polymorphic root partition holding every edge of a graph
pub const DEFAULT_EDGE_LABEL: &str = "_ag_label_edge";

/// Number of low bits of a [`GraphEntityId`] holding the entry id
pub const ENTRY_ID_BITS: u32 = 48;

/// Whether `name` is one of the two polymorphic root labels
pub fn is_default_label(name: &str) -> bool {
    name == DEFAULT_VERTEX_LABEL || name == DEFAULT_EDGE_LABEL
}

/// Identifier of a graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GraphId(pub u32);

/// Identifier of the namespace a graph owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NamespaceId(pub u32);

/// Identifier of the physical relation backing a label partition
///
/// Zero is never a valid relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RelationId(pub u32);

impl RelationId {
    pub fn is_valid(self) -> bool {
        self.0 != 0
    }
}

/// Identifier of a label, unique within its graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LabelId(pub i32);

impl LabelId {
    /// Reserved sentinel meaning "no label"
    pub const INVALID: LabelId = LabelId(0);
    pub const MIN: i32 = 1;
    pub const MAX: i32 = 65535;

    pub fn is_valid(self) -> bool {
        (Self::MIN..=Self::MAX).contains(&self.0)
    }
}

macro_rules! display_inner {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        })*
    };
}

display_inner!(GraphId, NamespaceId, RelationId, LabelId);

/// A catalog name, truncated to [`NAME_MAX_LEN`] bytes on a char boundary
///
/// Comparison is case-sensitive and byte-exact after truncation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CatalogName(String);

impl CatalogName {
    pub fn new(name: &str) -> Self {
        let mut end = name.len().min(NAME_MAX_LEN);
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        CatalogName(name[..end].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for CatalogName {
    fn from(name: &str) -> Self {
        CatalogName::new(name)
    }
}

impl fmt::Display for CatalogName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of a label partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LabelKind {
    Vertex,
    Edge,
}

impl LabelKind {
    /// Single-character catalog code (`v` or `e`)
    pub fn code(self) -> char {
        match self {
            LabelKind::Vertex => 'v',
            LabelKind::Edge => 'e',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'v' => Some(LabelKind::Vertex),
            'e' => Some(LabelKind::Edge),
            _ => None,
        }
    }
}

impl fmt::Display for LabelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelKind::Vertex => write!(f, "vertex"),
            LabelKind::Edge => write!(f, "edge"),
        }
    }
}

/// A row of the graph table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphRecord {
    pub graph_id: GraphId,
    pub name: CatalogName,
    pub namespace: NamespaceId,
}

/// A row of the label table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRecord {
    pub name: CatalogName,
    pub graph_id: GraphId,
    pub label_id: LabelId,
    pub kind: LabelKind,
    pub relation_id: RelationId,
    pub sequence_name: CatalogName,
}

impl LabelRecord {
    pub fn is_default(&self) -> bool {
        is_default_label(self.name.as_str())
    }
}

/// Observed (edge label, start label, end label) combination within a graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeSchemaEntry {
    pub graph_id: GraphId,
    pub edge_label_id: LabelId,
    pub start_label_id: LabelId,
    pub end_label_id: LabelId,
}

impl EdgeSchemaEntry {
    pub fn new(graph_id: GraphId, edge: LabelId, start: LabelId, end: LabelId) -> Self {
        Self {
            graph_id,
            edge_label_id: edge,
            start_label_id: start,
            end_label_id: end,
        }
    }

    /// Whether `label` is either endpoint of this entry
    pub fn touches_vertex(&self, label: LabelId) -> bool {
        self.start_label_id == label || self.end_label_id == label
    }
}

/// Packed vertex/edge identifier: label id in the upper 16 bits, entry id below
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GraphEntityId(pub u64);

impl GraphEntityId {
    const ENTRY_MASK: u64 = (1 << ENTRY_ID_BITS) - 1;

    pub fn new(label: LabelId, entry_id: u64) -> Self {
        let label_bits = (label.0 as u64 & 0xFFFF) << ENTRY_ID_BITS;
        GraphEntityId(label_bits | (entry_id & Self::ENTRY_MASK))
    }

    pub fn label_id(self) -> LabelId {
        LabelId((self.0 >> ENTRY_ID_BITS) as i32)
    }

    pub fn entry_id(self) -> u64 {
        self.0 & Self::ENTRY_MASK
    }
}

/// Relation name of the id sequence backing a label
pub fn sequence_name_for(label_name: &str) -> CatalogName {
    CatalogName::new(&format!("{}_id_seq", label_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_name_truncates_on_char_boundary() {
        let long = "a".repeat(70);
        assert_eq!(CatalogName::new(&long).as_str().len(), NAME_MAX_LEN);

        // 62 ASCII bytes followed by a two-byte char straddling the limit
        let straddle = format!("{}é", "b".repeat(62));
        let name = CatalogName::new(&straddle);
        assert_eq!(name.as_str(), "b".repeat(62));
    }

    #[test]
    fn test_catalog_name_is_case_sensitive() {
        assert_ne!(CatalogName::new("Person"), CatalogName::new("person"));
    }

    #[test]
    fn test_label_id_domain() {
        assert!(!LabelId::INVALID.is_valid());
        assert!(LabelId(1).is_valid());
        assert!(LabelId(65535).is_valid());
        assert!(!LabelId(65536).is_valid());
        assert!(!LabelId(-3).is_valid());
    }

    #[test]
    fn test_graph_entity_id_packing() {
        let id = GraphEntityId::new(LabelId(3), 42);
        assert_eq!(id.label_id(), LabelId(3));
        assert_eq!(id.entry_id(), 42);
        assert_eq!(id.0, (3u64 << 48) | 42);
    }

    #[test]
    fn test_label_kind_codes() {
        assert_eq!(LabelKind::from_code('v'), Some(LabelKind::Vertex));
        assert_eq!(LabelKind::from_code(LabelKind::Edge.code()), Some(LabelKind::Edge));
        assert_eq!(LabelKind::from_code('x'), None);
    }

    #[test]
    fn test_sequence_name() {
        assert_eq!(sequence_name_for("Person").as_str(), "Person_id_seq");
        assert!(is_default_label(DEFAULT_EDGE_LABEL));
        assert!(!is_default_label("Person"));
    }
}
