//! # Tabgraph
//!
//! Friendly exporter for labeled property graphs.
//!
//! Tabgraph converts a property graph into flat, spreadsheet-editable CSV
//! files (one per node label, one per relationship type), packages them into a
//! zip archive, and rebuilds an equivalent graph from such an archive or from a
//! plain folder of the same files.
//!
//! ## Features
//!
//! - Label-driven export with optional neighbor-label discovery
//! - Stable, sorted column sets merged from heterogeneous property sets
//! - Typed value codec with best-effort type inference on re-import
//! - Transient identifiers rebound to fresh store identifiers on import
//! - Partial-failure tolerance with itemised run summaries
//!
//! ## Example
//!
//! ```rust,ignore
//! use tabgraph::io::{ExportOptions, ExportService};
//! use tabgraph::storage::graph::InMemoryGraphStore;
//!
//! let store = InMemoryGraphStore::new();
//! let service = ExportService::new(&store, IoConfig::default());
//! let result = service.export(
//!     &ExportOptions::new(["Person"], "/tmp/out").with_archive_name("people"),
//! )?;
//! for line in result.summary() {
//!     println!("{line}");
//! }
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod cli;
pub mod config;
pub mod io;
pub mod models;
pub mod observability;
pub mod storage;

// Re-exports for convenience
pub use config::{IoConfig, LoggingSettings, TabgraphConfig};
pub use io::{ExportOptions, ExportResult, ExportService, ImportOptions, ImportResult, ImportService};
pub use models::{Direction, Node, NodeId, PropertyMap, PropertyValue, Relationship, RelationshipId};
pub use storage::{GraphStore, InMemoryGraphStore};

/// Error type for tabgraph operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait implementations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Empty label list, bad delimiter, malformed configuration |
/// | `NotFound` | Import path missing, node or relationship id unknown to the store |
/// | `OperationFailed` | I/O errors, archive errors, store failures |
/// | `CorruptedFile` | Table file that cannot be read, lacks a required column, or has no importable row |
/// | `NoEntities` | A requested label has no nodes |
///
/// `CorruptedFile` and `NoEntities` are recoverable: the orchestrators record
/// them on the run result and continue.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    ///
    /// Raised when:
    /// - No labels are passed to an export
    /// - The configured delimiter or file tokens are unusable
    /// - A label cannot be turned into a file name
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A required resource does not exist.
    ///
    /// Raised when:
    /// - The import archive or folder does not exist
    /// - A store lookup targets an unknown node or relationship
    #[error("not found: {0}")]
    NotFound(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - Filesystem I/O errors occur
    /// - The archive cannot be created, opened or read
    /// - The store rejects a transaction call
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// A table file is structurally unusable.
    #[error("corrupted file '{file}': {reason}")]
    CorruptedFile {
        /// File or archive entry name.
        file: String,
        /// What is wrong with it.
        reason: String,
    },

    /// No nodes carry the requested label.
    #[error("no nodes found with label '{label}'")]
    NoEntities {
        /// The label that matched nothing.
        label: String,
    },
}

impl Error {
    /// Builds an [`Error::OperationFailed`] from an operation name and cause.
    pub fn operation(operation: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::OperationFailed {
            operation: operation.into(),
            cause: cause.to_string(),
        }
    }

    /// Returns true for conditions the orchestrators record and skip.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::CorruptedFile { .. } | Self::NoEntities { .. })
    }
}

/// Result type alias for tabgraph operations.
pub type Result<T> = std::result::Result<T, Error>;
