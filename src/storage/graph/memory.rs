//! In-memory graph store.
//!
//! Provides a non-persistent implementation of [`GraphStore`] used by the
//! binary (loaded from and saved to JSON snapshots) and by tests.
//!
//! Transactions are snapshot based: `begin_transaction` clones the current
//! state, `rollback_transaction` restores it. Identifier counters live outside
//! the snapshot, so identifiers handed out inside a rolled-back transaction
//! are never reused.

use crate::models::graph::{
    Direction, Node, NodeId, PropertyMap, PropertyValue, Relationship, RelationshipId,
};
use crate::storage::traits::graph::{GraphStats, GraphStore};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};

/// Serializable view of a whole graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// All nodes.
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// All relationships.
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

#[derive(Debug, Clone, Default)]
struct GraphState {
    nodes: BTreeMap<NodeId, Node>,
    relationships: BTreeMap<RelationshipId, Relationship>,
}

#[derive(Debug, Default)]
enum TransactionState {
    #[default]
    Idle,
    Open(GraphState),
    Finished,
}

/// In-memory graph store.
///
/// Uses `RwLock` for the graph state and `Mutex` for the transaction slot.
/// Nodes and relationships are kept in identifier order.
///
/// # Example
///
/// ```rust
/// use tabgraph::storage::graph::InMemoryGraphStore;
/// use tabgraph::storage::GraphStore;
///
/// let store = InMemoryGraphStore::new();
/// let alice = store.create_node(&["Person".to_string()], Default::default()).unwrap();
/// let bob = store.create_node(&["Person".to_string()], Default::default()).unwrap();
/// store.create_relationship(alice, bob, "KNOWS", Default::default()).unwrap();
/// assert_eq!(store.node_count(), 2);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryGraphStore {
    state: RwLock<GraphState>,
    transaction: Mutex<TransactionState>,
    next_node_id: AtomicU64,
    next_relationship_id: AtomicU64,
}

fn poisoned(operation: &str) -> Error {
    Error::OperationFailed {
        operation: operation.to_string(),
        cause: "Lock poisoned".to_string(),
    }
}

impl InMemoryGraphStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from a snapshot, keeping the snapshot's identifiers.
    ///
    /// # Errors
    ///
    /// Returns an error if identifiers are duplicated or a relationship
    /// references a node missing from the snapshot.
    pub fn from_snapshot(snapshot: GraphSnapshot) -> Result<Self> {
        let mut state = GraphState::default();
        for node in snapshot.nodes {
            let id = node.id;
            if state.nodes.insert(id, node).is_some() {
                return Err(Error::InvalidInput(format!(
                    "duplicate node id {id} in snapshot"
                )));
            }
        }
        for rel in snapshot.relationships {
            if !state.nodes.contains_key(&rel.source)
                || !state.nodes.contains_key(&rel.destination)
            {
                return Err(Error::InvalidInput(format!(
                    "relationship {} references a missing node",
                    rel.id
                )));
            }
            let id = rel.id;
            if state.relationships.insert(id, rel).is_some() {
                return Err(Error::InvalidInput(format!(
                    "duplicate relationship id {id} in snapshot"
                )));
            }
        }

        let next_node = state.nodes.keys().next_back().map_or(0, |id| id.get() + 1);
        let next_rel = state
            .relationships
            .keys()
            .next_back()
            .map_or(0, |id| id.get() + 1);

        Ok(Self {
            state: RwLock::new(state),
            transaction: Mutex::new(TransactionState::Idle),
            next_node_id: AtomicU64::new(next_node),
            next_relationship_id: AtomicU64::new(next_rel),
        })
    }

    /// Returns a snapshot of the current state.
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned.
    pub fn snapshot(&self) -> Result<GraphSnapshot> {
        let state = self.state.read().map_err(|_| poisoned("snapshot"))?;
        Ok(GraphSnapshot {
            nodes: state.nodes.values().cloned().collect(),
            relationships: state.relationships.values().cloned().collect(),
        })
    }

    /// Loads a store from a JSON snapshot file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_json(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_graph_snapshot".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;
        let snapshot: GraphSnapshot =
            serde_json::from_str(&contents).map_err(|e| Error::OperationFailed {
                operation: "parse_graph_snapshot".to_string(),
                cause: e.to_string(),
            })?;
        Self::from_snapshot(snapshot)
    }

    /// Saves the current state as a JSON snapshot file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let snapshot = self.snapshot()?;
        let json = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| Error::operation("serialize_graph_snapshot", e))?;
        std::fs::write(path, json).map_err(|e| Error::OperationFailed {
            operation: "write_graph_snapshot".to_string(),
            cause: format!("{}: {e}", path.display()),
        })
    }

    /// Returns the number of nodes stored.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.state.read().map(|s| s.nodes.len()).unwrap_or(0)
    }

    /// Returns the number of relationships stored.
    #[must_use]
    pub fn relationship_count(&self) -> usize {
        self.state.read().map(|s| s.relationships.len()).unwrap_or(0)
    }

    /// Returns true while a transaction is open.
    #[must_use]
    pub fn in_transaction(&self) -> bool {
        self.transaction
            .lock()
            .map(|t| matches!(*t, TransactionState::Open(_)))
            .unwrap_or(false)
    }

    fn allocate_node_id(&self) -> NodeId {
        NodeId::new(self.next_node_id.fetch_add(1, Ordering::Relaxed))
    }

    fn allocate_relationship_id(&self) -> RelationshipId {
        RelationshipId::new(self.next_relationship_id.fetch_add(1, Ordering::Relaxed))
    }
}

impl GraphStore for InMemoryGraphStore {
    fn begin_transaction(&self) -> Result<()> {
        let mut tx = self
            .transaction
            .lock()
            .map_err(|_| poisoned("begin_transaction"))?;
        if matches!(*tx, TransactionState::Open(_)) {
            return Err(Error::operation(
                "begin_transaction",
                "a transaction is already open",
            ));
        }
        let state = self.state.read().map_err(|_| poisoned("begin_transaction"))?;
        *tx = TransactionState::Open(state.clone());
        Ok(())
    }

    fn commit_transaction(&self) -> Result<()> {
        let mut tx = self
            .transaction
            .lock()
            .map_err(|_| poisoned("commit_transaction"))?;
        if !matches!(*tx, TransactionState::Open(_)) {
            return Err(Error::operation("commit_transaction", "no open transaction"));
        }
        *tx = TransactionState::Finished;
        Ok(())
    }

    fn rollback_transaction(&self) -> Result<()> {
        let mut tx = self
            .transaction
            .lock()
            .map_err(|_| poisoned("rollback_transaction"))?;
        if !matches!(*tx, TransactionState::Open(_)) {
            return Err(Error::operation("rollback_transaction", "no open transaction"));
        }
        let TransactionState::Open(saved) = std::mem::replace(&mut *tx, TransactionState::Finished)
        else {
            return Ok(());
        };
        let mut state = self
            .state
            .write()
            .map_err(|_| poisoned("rollback_transaction"))?;
        *state = saved;
        Ok(())
    }

    fn release_transaction(&self) -> Result<()> {
        let mut tx = self
            .transaction
            .lock()
            .map_err(|_| poisoned("release_transaction"))?;
        if let TransactionState::Open(saved) = std::mem::take(&mut *tx) {
            // Released without commit: behave like a rollback.
            tracing::warn!("transaction released while open, discarding changes");
            let mut state = self
                .state
                .write()
                .map_err(|_| poisoned("release_transaction"))?;
            *state = saved;
        }
        Ok(())
    }

    fn create_node(&self, labels: &[String], properties: PropertyMap) -> Result<NodeId> {
        let mut state = self.state.write().map_err(|_| poisoned("create_node"))?;
        let id = self.allocate_node_id();
        let mut node = Node::new(id, labels.iter().cloned());
        node.properties = properties;
        state.nodes.insert(id, node);
        Ok(id)
    }

    fn add_node_label(&self, id: NodeId, label: &str) -> Result<()> {
        let mut state = self.state.write().map_err(|_| poisoned("add_node_label"))?;
        let node = state
            .nodes
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("node {id}")))?;
        node.add_label(label);
        Ok(())
    }

    fn set_node_property(&self, id: NodeId, key: &str, value: PropertyValue) -> Result<()> {
        let mut state = self
            .state
            .write()
            .map_err(|_| poisoned("set_node_property"))?;
        let node = state
            .nodes
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("node {id}")))?;
        node.properties.insert(key.to_string(), value);
        Ok(())
    }

    fn get_node(&self, id: NodeId) -> Result<Option<Node>> {
        let state = self.state.read().map_err(|_| poisoned("get_node"))?;
        Ok(state.nodes.get(&id).cloned())
    }

    fn find_nodes(&self, label: &str) -> Result<Vec<Node>> {
        let state = self.state.read().map_err(|_| poisoned("find_nodes"))?;
        Ok(state
            .nodes
            .values()
            .filter(|n| n.has_label(label))
            .cloned()
            .collect())
    }

    fn create_relationship(
        &self,
        source: NodeId,
        destination: NodeId,
        rel_type: &str,
        properties: PropertyMap,
    ) -> Result<RelationshipId> {
        let mut state = self
            .state
            .write()
            .map_err(|_| poisoned("create_relationship"))?;
        for endpoint in [source, destination] {
            if !state.nodes.contains_key(&endpoint) {
                return Err(Error::NotFound(format!("node {endpoint}")));
            }
        }
        let id = self.allocate_relationship_id();
        let mut rel = Relationship::new(id, rel_type, source, destination);
        rel.properties = properties;
        state.relationships.insert(id, rel);
        Ok(id)
    }

    fn set_relationship_property(
        &self,
        id: RelationshipId,
        key: &str,
        value: PropertyValue,
    ) -> Result<()> {
        let mut state = self
            .state
            .write()
            .map_err(|_| poisoned("set_relationship_property"))?;
        let rel = state
            .relationships
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("relationship {id}")))?;
        rel.properties.insert(key.to_string(), value);
        Ok(())
    }

    fn relationships(&self, node: NodeId, direction: Direction) -> Result<Vec<Relationship>> {
        let state = self.state.read().map_err(|_| poisoned("relationships"))?;
        Ok(state
            .relationships
            .values()
            .filter(|r| r.touches(node, direction))
            .cloned()
            .collect())
    }

    fn stats(&self) -> Result<GraphStats> {
        let state = self.state.read().map_err(|_| poisoned("stats"))?;
        Ok(GraphStats {
            node_count: state.nodes.len(),
            relationship_count: state.relationships.len(),
        })
    }
}
