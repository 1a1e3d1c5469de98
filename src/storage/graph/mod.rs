//! Graph store implementations.
//!
//! # Available Stores
//!
//! | Store | Use Case | Features |
//! |-------|----------|----------|
//! | [`InMemoryGraphStore`] | CLI snapshots, testing | Snapshot transactions, JSON persistence |

mod memory;

pub use memory::{GraphSnapshot, InMemoryGraphStore};

// Re-export trait for convenience
pub use crate::storage::traits::graph::{GraphStats, GraphStore};
