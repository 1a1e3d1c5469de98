//! Tabular format adapters.
//!
//! CSV is the only table format; the delimiter and reserved column names come
//! from [`IoConfig`](crate::config::IoConfig).

pub mod csv;

pub use self::csv::{
    CsvTableWriter, NodeRow, NodeTableReader, RelationshipRow, RelationshipTableReader,
};
