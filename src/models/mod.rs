//! Data models for tabgraph.
//!
//! This module contains the entity types shared by the store abstraction and
//! the tabular codec.

pub mod graph;

pub use graph::{
    Direction, Node, NodeId, OffsetTime, PropertyMap, PropertyValue, Relationship, RelationshipId,
};
