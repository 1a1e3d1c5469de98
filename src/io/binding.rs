//! Transient identifier rebinding.

use crate::models::NodeId;
use std::collections::HashMap;
use std::fmt;

/// Identifier written to a node's index column.
///
/// Only meaningful inside the archive it was written to. Compared after
/// trimming surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransientId(String);

impl TransientId {
    /// Parses a cell into a transient id. Returns `None` for blank cells.
    #[must_use]
    pub fn parse(cell: &str) -> Option<Self> {
        let trimmed = cell.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    /// Returns the id text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<NodeId> for TransientId {
    fn from(id: NodeId) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for TransientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Maps transient ids to the node ids assigned on import.
#[derive(Debug, Default)]
pub struct IdentifierBindingTable {
    bindings: HashMap<TransientId, NodeId>,
}

impl IdentifierBindingTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a binding. Returns the previous node id if one existed.
    pub fn bind(&mut self, transient: TransientId, node: NodeId) -> Option<NodeId> {
        self.bindings.insert(transient, node)
    }

    /// Looks up the node bound to a transient id.
    #[must_use]
    pub fn resolve(&self, transient: &TransientId) -> Option<NodeId> {
        self.bindings.get(transient).copied()
    }

    /// Number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns true if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
