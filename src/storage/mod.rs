//! Storage layer abstraction.
//!
//! The exporter depends on a graph store only through the [`GraphStore`]
//! capability trait. [`InMemoryGraphStore`] is the bundled implementation.

pub mod graph;
pub mod traits;

pub use graph::{GraphSnapshot, InMemoryGraphStore};
pub use traits::{GraphStats, GraphStore};
