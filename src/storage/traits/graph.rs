//! Graph store capability trait.
//!
//! The exporter never talks to a concrete database. It depends only on the
//! narrow capability set below: create entities, read and write scalar
//! properties, enumerate labels and relationships, look up nodes by label or
//! by identifier, and scope the whole run in a transaction.
//!
//! # Error Modes and Guarantees
//!
//! All methods return `Result<T>` with errors propagated via [`crate::Error`].
//! The orchestrators treat any `Err` from a lookup or transaction method as an
//! unrecoverable run condition (the store is unreachable or inconsistent).
//! An `Err` from a create/set method costs only the row being imported,
//! except [`crate::Error::OperationFailed`], which means the store itself
//! failed and aborts the run.
//!
//! ## Entity Operations
//!
//! | Operation | Notes |
//! |-----------|-------|
//! | `create_node` | Assigns a fresh identifier, never reused |
//! | `add_node_label` | Idempotent |
//! | `set_node_property` | Inserts or overwrites one key |
//! | `create_relationship` | Both endpoints must exist |
//! | `find_nodes` | Ordered by identifier |
//! | `relationships` | Ordered by identifier |
//!
//! ## Transactions
//!
//! One transaction wraps one export or import run. The orchestrators call
//! `begin_transaction` once, then exactly one of `commit_transaction` or
//! `rollback_transaction`, then `release_transaction` exactly once, including
//! when the run unwinds early. See [`crate::io::transaction::TransactionScope`].

use crate::Result;
use crate::models::graph::{
    Direction, Node, NodeId, PropertyMap, PropertyValue, Relationship, RelationshipId,
};

/// Capability interface a graph store exposes to the exporter.
///
/// # Implementor Notes
///
/// - Methods use `&self` so a store can be shared by reference across the
///   orchestrator call chain; use interior mutability for state.
/// - Identifiers must stay unique for the lifetime of the store, including
///   across rolled-back transactions.
/// - `find_nodes` and `relationships` should return entities in a stable order
///   so exported files diff cleanly between runs.
pub trait GraphStore {
    // ========================================================================
    // Transaction Scope
    // ========================================================================

    /// Opens the transaction that wraps a run.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or a transaction is
    /// already open.
    fn begin_transaction(&self) -> Result<()>;

    /// Makes every change since `begin_transaction` durable.
    ///
    /// # Errors
    ///
    /// Returns an error if no transaction is open or the commit fails.
    fn commit_transaction(&self) -> Result<()>;

    /// Discards every change since `begin_transaction`.
    ///
    /// # Errors
    ///
    /// Returns an error if no transaction is open.
    fn rollback_transaction(&self) -> Result<()>;

    /// Releases resources held by the transaction.
    ///
    /// Called exactly once per run after commit or rollback.
    ///
    /// # Errors
    ///
    /// Returns an error if releasing fails.
    fn release_transaction(&self) -> Result<()> {
        Ok(())
    }

    // ========================================================================
    // Node Operations
    // ========================================================================

    /// Creates a node tagged with `labels` and carrying `properties`.
    ///
    /// # Errors
    ///
    /// Returns an error if the node cannot be stored.
    fn create_node(&self, labels: &[String], properties: PropertyMap) -> Result<NodeId>;

    /// Adds a label to an existing node.
    ///
    /// # Errors
    ///
    /// Returns an error if the node does not exist.
    fn add_node_label(&self, id: NodeId, label: &str) -> Result<()>;

    /// Sets one property on an existing node.
    ///
    /// # Errors
    ///
    /// Returns an error if the node does not exist or the value is rejected.
    fn set_node_property(&self, id: NodeId, key: &str, value: PropertyValue) -> Result<()>;

    /// Looks up a node by identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    fn get_node(&self, id: NodeId) -> Result<Option<Node>>;

    /// Returns all nodes carrying `label`.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    fn find_nodes(&self, label: &str) -> Result<Vec<Node>>;

    /// Returns the labels of a node, or an empty list if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    fn node_labels(&self, id: NodeId) -> Result<Vec<String>> {
        Ok(self.get_node(id)?.map(|n| n.labels).unwrap_or_default())
    }

    // ========================================================================
    // Relationship Operations
    // ========================================================================

    /// Creates a relationship of `rel_type` from `source` to `destination`.
    ///
    /// # Errors
    ///
    /// Returns an error if either endpoint does not exist.
    fn create_relationship(
        &self,
        source: NodeId,
        destination: NodeId,
        rel_type: &str,
        properties: PropertyMap,
    ) -> Result<RelationshipId>;

    /// Sets one property on an existing relationship.
    ///
    /// # Errors
    ///
    /// Returns an error if the relationship does not exist.
    fn set_relationship_property(
        &self,
        id: RelationshipId,
        key: &str,
        value: PropertyValue,
    ) -> Result<()>;

    /// Returns the relationships of a node in the given direction.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    fn relationships(&self, node: NodeId, direction: Direction) -> Result<Vec<Relationship>>;

    // ========================================================================
    // Statistics
    // ========================================================================

    /// Returns node and relationship counts.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    fn stats(&self) -> Result<GraphStats>;
}

/// Entity counts for a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphStats {
    /// Number of nodes.
    pub node_count: usize,
    /// Number of relationships.
    pub relationship_count: usize,
}
