//! Graph ⇄ table I/O subsystem.
//!
//! Converts a labeled property graph into one CSV table per node label and
//! per relationship type, bundles them into a zip archive, and rebuilds a
//! graph from such an archive or from a folder of the same files.
//!
//! # Architecture
//!
//! - **Value codec** ([`value`]) turns single property values into cell text
//!   and back, inferring types on the way in
//! - **Schema union** ([`schema`]) computes a sorted column set per category
//! - **Frontier** ([`frontier`]) decides which labels to export
//! - **Table codec** ([`formats::csv`]) writes and reads one category per file
//! - **Archive** ([`archive`]) packs tables and exposes archives and folders
//!   as a [`TableSource`]
//! - **Services** orchestrate the above inside one store transaction
//!
//! # File Layout
//!
//! | File | Header |
//! |------|--------|
//! | `node_<Label>.csv` | `id;<sorted properties>` |
//! | `relationship_<TYPE>.csv` | `source;destination;<sorted properties>` |
//!
//! Prefixes, extension, delimiter and reserved column names come from
//! [`IoConfig`](crate::config::IoConfig).
//!
//! # Examples
//!
//! ## Export two labels with their neighbors
//!
//! ```rust,ignore
//! use tabgraph::io::{ExportOptions, ExportService};
//!
//! let service = ExportService::new(&store, IoConfig::default());
//! let result = service.export(
//!     &ExportOptions::new(["Person", "City"], "/tmp/out")
//!         .with_neighbors(true)
//!         .with_archive_name("people"),
//! )?;
//! println!("Exported {} nodes", result.nodes_written);
//! ```
//!
//! ## Import an archive
//!
//! ```rust,ignore
//! use tabgraph::io::{ImportOptions, ImportService};
//!
//! let service = ImportService::new(&store, IoConfig::default());
//! let result = service.import(&ImportOptions::new("/tmp/out/people.zip"))?;
//! for line in result.summary() {
//!     println!("{line}");
//! }
//! ```

pub mod archive;
pub mod binding;
pub mod formats;
pub mod frontier;
pub mod naming;
pub mod schema;
pub mod services;
pub mod traits;
pub mod transaction;
pub mod validation;
pub mod value;

// Re-exports for convenience
pub use binding::{IdentifierBindingTable, TransientId};
pub use frontier::FrontierExplorer;
pub use naming::TableKind;
pub use schema::SchemaAggregator;
pub use services::export::{ExportOptions, ExportResult, ExportService, ExportSession};
pub use services::import::{ImportOptions, ImportResult, ImportService, ImportSession};
pub use services::state::{RunKind, RunState};
pub use traits::TableSource;
pub use transaction::TransactionScope;
pub use value::ValueCodec;
