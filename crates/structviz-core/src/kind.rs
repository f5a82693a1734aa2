//! Classification tags for structured values.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// The kind of data structure a [`Value`](crate::value::Value) represents.
///
/// Every value is assigned exactly one kind. [`StructureKind::Object`] and
/// [`StructureKind::Unknown`] are classification results only; no layout
/// exists for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureKind {
    Array,
    Grid,
    Tree,
    Graph,
    LinkedList,
    Heap,
    HashTable,
    Object,
    Unknown,
}

impl StructureKind {
    /// All kinds, in declaration order.
    pub const ALL: [StructureKind; 9] = [
        StructureKind::Array,
        StructureKind::Grid,
        StructureKind::Tree,
        StructureKind::Graph,
        StructureKind::LinkedList,
        StructureKind::Heap,
        StructureKind::HashTable,
        StructureKind::Object,
        StructureKind::Unknown,
    ];

    /// Returns `true` if a layout engine exists for this kind.
    pub fn has_layout(self) -> bool {
        !matches!(self, StructureKind::Object | StructureKind::Unknown)
    }

    /// The lowercase tag used in share tokens, config files and the CLI.
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Human readable title, e.g. `"Linked List"`.
    pub fn title(self) -> &'static str {
        match self {
            StructureKind::Array => "Array",
            StructureKind::Grid => "Grid",
            StructureKind::Tree => "Tree",
            StructureKind::Graph => "Graph",
            StructureKind::LinkedList => "Linked List",
            StructureKind::Heap => "Heap",
            StructureKind::HashTable => "Hash Table",
            StructureKind::Object => "Object",
            StructureKind::Unknown => "Unknown",
        }
    }
}

impl From<StructureKind> for &'static str {
    fn from(kind: StructureKind) -> Self {
        match kind {
            StructureKind::Array => "array",
            StructureKind::Grid => "grid",
            StructureKind::Tree => "tree",
            StructureKind::Graph => "graph",
            StructureKind::LinkedList => "linkedlist",
            StructureKind::Heap => "heap",
            StructureKind::HashTable => "hashtable",
            StructureKind::Object => "object",
            StructureKind::Unknown => "unknown",
        }
    }
}

impl FromStr for StructureKind {
    type Err = UnknownKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "array" => Ok(Self::Array),
            "grid" | "matrix" => Ok(Self::Grid),
            "tree" => Ok(Self::Tree),
            "graph" => Ok(Self::Graph),
            "linkedlist" | "linked-list" | "linked_list" => Ok(Self::LinkedList),
            "heap" => Ok(Self::Heap),
            "hashtable" | "hash-table" | "hash_table" => Ok(Self::HashTable),
            "object" => Ok(Self::Object),
            "unknown" => Ok(Self::Unknown),
            _ => Err(UnknownKindError(s.to_string())),
        }
    }
}

impl fmt::Display for StructureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a [`StructureKind`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown structure type `{0}`")]
pub struct UnknownKindError(pub String);

/// Parses a user supplied type choice where `auto` means "classify".
///
/// # Examples
///
/// ```
/// use structviz_core::kind::{StructureKind, parse_forced_kind};
///
/// assert_eq!(parse_forced_kind("auto").unwrap(), None);
/// assert_eq!(parse_forced_kind("grid").unwrap(), Some(StructureKind::Grid));
/// ```
pub fn parse_forced_kind(s: &str) -> Result<Option<StructureKind>, UnknownKindError> {
    if s.trim().is_empty() || s.trim().eq_ignore_ascii_case("auto") {
        Ok(None)
    } else {
        s.parse().map(Some)
    }
}
