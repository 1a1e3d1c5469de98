//! CLI command implementations.
//!
//! Thin adapters between the binary's arguments and the I/O services. Both
//! commands work on a JSON graph snapshot so the binary needs no database.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `save` | Export labels from a snapshot to CSV tables, optionally zipped |
//! | `load` | Import a zip archive or folder of tables into a snapshot |
//!
//! # Example Usage
//!
//! ```bash
//! # Export people and their neighbors into people.zip
//! tabgraph save --graph graph.json --output out --archive people --neighbors Person
//!
//! # Import the archive into a fresh snapshot
//! tabgraph load out/people.zip --graph imported.json
//! ```

mod load;
mod save;

pub use load::LoadCommand;
pub use save::SaveCommand;
