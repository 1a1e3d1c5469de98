//! Scoped store transactions.

use crate::Result;
use crate::storage::GraphStore;

/// Guard over one store transaction.
///
/// Begins on [`TransactionScope::begin`]. Consuming it with
/// [`commit`](Self::commit) or [`rollback`](Self::rollback) finishes the
/// transaction; dropping it unfinished rolls back. The store's
/// `release_transaction` is called exactly once in every case.
pub struct TransactionScope<'a, S: GraphStore + ?Sized> {
    store: &'a S,
    finished: bool,
    released: bool,
}

impl<'a, S: GraphStore + ?Sized> TransactionScope<'a, S> {
    /// Begins a transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot begin a transaction.
    pub fn begin(store: &'a S) -> Result<Self> {
        store.begin_transaction()?;
        Ok(Self {
            store,
            finished: false,
            released: false,
        })
    }

    /// Commits and releases.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails; the transaction is then rolled
    /// back when the guard drops.
    pub fn commit(mut self) -> Result<()> {
        self.store.commit_transaction()?;
        self.finished = true;
        self.release()
    }

    /// Rolls back and releases.
    ///
    /// # Errors
    ///
    /// Returns an error if the rollback or release fails.
    pub fn rollback(mut self) -> Result<()> {
        self.finished = true;
        let rolled_back = self.store.rollback_transaction();
        let released = self.release();
        rolled_back.and(released)
    }

    fn release(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        self.store.release_transaction()
    }
}

impl<S: GraphStore + ?Sized> Drop for TransactionScope<'_, S> {
    fn drop(&mut self) {
        if !self.finished {
            self.finished = true;
            if let Err(e) = self.store.rollback_transaction() {
                tracing::error!(error = %e, "Rollback on drop failed");
            }
        }
        if let Err(e) = self.release() {
            tracing::error!(error = %e, "Transaction release failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Direction, Node, NodeId, PropertyMap, PropertyValue, Relationship, RelationshipId,
    };
    use crate::storage::{GraphStats, InMemoryGraphStore};
    use std::sync::Mutex;

    /// Records transaction calls and delegates data calls.
    #[derive(Default)]
    struct RecordingStore {
        inner: InMemoryGraphStore,
        calls: Mutex<Vec<&'static str>>,
        fail_commit: bool,
    }

    impl RecordingStore {
        fn record(&self, call: &'static str) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl GraphStore for RecordingStore {
        fn begin_transaction(&self) -> Result<()> {
            self.record("begin");
            self.inner.begin_transaction()
        }

        fn commit_transaction(&self) -> Result<()> {
            self.record("commit");
            if self.fail_commit {
                return Err(crate::Error::operation("commit_transaction", "refused"));
            }
            self.inner.commit_transaction()
        }

        fn rollback_transaction(&self) -> Result<()> {
            self.record("rollback");
            self.inner.rollback_transaction()
        }

        fn release_transaction(&self) -> Result<()> {
            self.record("release");
            self.inner.release_transaction()
        }

        fn create_node(&self, labels: &[String], properties: PropertyMap) -> Result<NodeId> {
            self.inner.create_node(labels, properties)
        }

        fn add_node_label(&self, id: NodeId, label: &str) -> Result<()> {
            self.inner.add_node_label(id, label)
        }

        fn set_node_property(&self, id: NodeId, key: &str, value: PropertyValue) -> Result<()> {
            self.inner.set_node_property(id, key, value)
        }

        fn get_node(&self, id: NodeId) -> Result<Option<Node>> {
            self.inner.get_node(id)
        }

        fn find_nodes(&self, label: &str) -> Result<Vec<Node>> {
            self.inner.find_nodes(label)
        }

        fn create_relationship(
            &self,
            source: NodeId,
            destination: NodeId,
            rel_type: &str,
            properties: PropertyMap,
        ) -> Result<RelationshipId> {
            self.inner
                .create_relationship(source, destination, rel_type, properties)
        }

        fn set_relationship_property(
            &self,
            id: RelationshipId,
            key: &str,
            value: PropertyValue,
        ) -> Result<()> {
            self.inner.set_relationship_property(id, key, value)
        }

        fn relationships(&self, node: NodeId, direction: Direction) -> Result<Vec<Relationship>> {
            self.inner.relationships(node, direction)
        }

        fn stats(&self) -> Result<GraphStats> {
            self.inner.stats()
        }
    }

    #[test]
    fn test_commit_releases_once() {
        let store = RecordingStore::default();
        let scope = TransactionScope::begin(&store).unwrap();
        store.create_node(&["A".to_string()], PropertyMap::new()).unwrap();
        scope.commit().unwrap();

        assert_eq!(store.calls(), ["begin", "commit", "release"]);
        assert_eq!(store.inner.node_count(), 1);
    }

    #[test]
    fn test_explicit_rollback() {
        let store = RecordingStore::default();
        let scope = TransactionScope::begin(&store).unwrap();
        store.create_node(&["A".to_string()], PropertyMap::new()).unwrap();
        scope.rollback().unwrap();

        assert_eq!(store.calls(), ["begin", "rollback", "release"]);
        assert_eq!(store.inner.node_count(), 0);
    }

    #[test]
    fn test_drop_rolls_back() {
        let store = RecordingStore::default();
        {
            let _scope = TransactionScope::begin(&store).unwrap();
            store.create_node(&["A".to_string()], PropertyMap::new()).unwrap();
        }
        assert_eq!(store.calls(), ["begin", "rollback", "release"]);
        assert_eq!(store.inner.node_count(), 0);
    }

    #[test]
    fn test_failed_commit_rolls_back_on_drop() {
        let store = RecordingStore {
            fail_commit: true,
            ..RecordingStore::default()
        };
        let scope = TransactionScope::begin(&store).unwrap();
        store.create_node(&["A".to_string()], PropertyMap::new()).unwrap();
        assert!(scope.commit().is_err());

        assert_eq!(store.calls(), ["begin", "commit", "rollback", "release"]);
        assert_eq!(store.inner.node_count(), 0);
    }
}
