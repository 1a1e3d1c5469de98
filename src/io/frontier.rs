//! Category frontier for label-driven export.
//!
//! A breadth-first walk at label granularity: labels are popped from the
//! front of the open queue, exported, and closed. With neighbor discovery
//! enabled, the labels of nodes at the other end of any relationship of an
//! exported node are appended to the back unless already open or closed.
//! Each label moves from open to closed once, so the walk terminates on any
//! finite graph.

use crate::Result;
use crate::models::{Direction, NodeId};
use crate::storage::GraphStore;
use std::collections::{BTreeSet, VecDeque};

/// Open and closed label sets for one export run.
#[derive(Debug, Clone, Default)]
pub struct FrontierExplorer {
    open: VecDeque<String>,
    closed: BTreeSet<String>,
    consider_neighbors: bool,
}

impl FrontierExplorer {
    /// Creates a frontier seeded with `labels` in caller order.
    ///
    /// Duplicate labels are kept once, at their first position.
    #[must_use]
    pub fn new<I, S>(labels: I, consider_neighbors: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut explorer = Self {
            open: VecDeque::new(),
            closed: BTreeSet::new(),
            consider_neighbors,
        };
        for label in labels {
            explorer.discover(label.into());
        }
        explorer
    }

    /// Pops the next label to export.
    pub fn next_category(&mut self) -> Option<String> {
        self.open.pop_front()
    }

    /// Marks a label as fully handled.
    pub fn close(&mut self, label: impl Into<String>) {
        self.closed.insert(label.into());
    }

    /// Queues a label unless it is already open or closed.
    ///
    /// Returns true if the label was queued.
    pub fn discover(&mut self, label: String) -> bool {
        if self.closed.contains(&label) || self.open.contains(&label) {
            return false;
        }
        self.open.push_back(label);
        true
    }

    /// Queues the labels of every neighbor of `node`.
    ///
    /// Does nothing unless neighbor discovery is enabled. Returns the number
    /// of newly queued labels.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lookups fail.
    pub fn explore_neighbors<S>(&mut self, store: &S, node: NodeId) -> Result<usize>
    where
        S: GraphStore + ?Sized,
    {
        if !self.consider_neighbors {
            return Ok(0);
        }
        let mut queued = 0;
        for relationship in store.relationships(node, Direction::Both)? {
            let neighbor = relationship.other_node(node);
            for label in store.node_labels(neighbor)? {
                if self.discover(label.clone()) {
                    tracing::debug!(label = %label, via = %relationship.rel_type, "Discovered neighbor label");
                    queued += 1;
                }
            }
        }
        Ok(queued)
    }

    /// Number of labels still queued.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.open.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PropertyMap;
    use crate::storage::InMemoryGraphStore;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    #[test]
    fn test_initial_order_deduplicated() {
        let mut frontier = FrontierExplorer::new(["B", "A", "B"], false);
        assert_eq!(frontier.pending(), 2);
        assert_eq!(frontier.next_category().as_deref(), Some("B"));
        assert_eq!(frontier.next_category().as_deref(), Some("A"));
        assert_eq!(frontier.next_category(), None);
    }

    #[test]
    fn test_closed_labels_not_requeued() {
        let mut frontier = FrontierExplorer::new(["A"], true);
        let label = frontier.next_category().unwrap();
        frontier.close(label);
        assert!(!frontier.discover("A".to_string()));
        assert!(frontier.discover("B".to_string()));
        assert!(!frontier.discover("B".to_string()));
    }

    #[test]
    fn test_explore_neighbors_appends_to_back() {
        let store = InMemoryGraphStore::new();
        let person = store.create_node(&labels(&["Person"]), PropertyMap::new()).unwrap();
        let city = store.create_node(&labels(&["City"]), PropertyMap::new()).unwrap();
        let pet = store.create_node(&labels(&["Pet", "Animal"]), PropertyMap::new()).unwrap();
        store.create_relationship(person, city, "LIVES_IN", PropertyMap::new()).unwrap();
        store.create_relationship(pet, person, "OWNED_BY", PropertyMap::new()).unwrap();

        let mut frontier = FrontierExplorer::new(["Person", "Extra"], true);
        let first = frontier.next_category().unwrap();
        assert_eq!(frontier.explore_neighbors(&store, person).unwrap(), 3);
        frontier.close(first);

        let order: Vec<_> = std::iter::from_fn(|| frontier.next_category()).collect();
        assert_eq!(order, ["Extra", "City", "Pet", "Animal"]);
    }

    #[test]
    fn test_explore_neighbors_disabled() {
        let store = InMemoryGraphStore::new();
        let a = store.create_node(&labels(&["A"]), PropertyMap::new()).unwrap();
        let b = store.create_node(&labels(&["B"]), PropertyMap::new()).unwrap();
        store.create_relationship(a, b, "R", PropertyMap::new()).unwrap();

        let mut frontier = FrontierExplorer::new(["A"], false);
        let first = frontier.next_category().unwrap();
        frontier.close(first);
        assert_eq!(frontier.explore_neighbors(&store, a).unwrap(), 0);
        assert_eq!(frontier.pending(), 0);
    }

    #[test]
    fn test_self_label_not_rediscovered() {
        let store = InMemoryGraphStore::new();
        let a = store.create_node(&labels(&["A"]), PropertyMap::new()).unwrap();
        let b = store.create_node(&labels(&["A"]), PropertyMap::new()).unwrap();
        store.create_relationship(a, b, "KNOWS", PropertyMap::new()).unwrap();

        let mut frontier = FrontierExplorer::new(["A"], true);
        let label = frontier.next_category().unwrap();
        frontier.close(label);
        assert_eq!(frontier.explore_neighbors(&store, a).unwrap(), 0);
        assert_eq!(frontier.pending(), 0);
    }
}
