//! Load CLI command.

use crate::Result;
use crate::config::IoConfig;
use crate::io::{ImportOptions, ImportService};
use crate::storage::InMemoryGraphStore;
use std::path::PathBuf;

/// Load command handler.
#[derive(Debug, Clone)]
pub struct LoadCommand {
    /// Zip archive or folder to import.
    pub path: PathBuf,
    /// Snapshot to import into; created if missing, rewritten on success.
    pub graph: PathBuf,
}

impl LoadCommand {
    /// Runs the import and returns the summary lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be read or written, or the
    /// import fails.
    pub fn run(&self, config: &IoConfig) -> Result<Vec<String>> {
        let store = if self.graph.exists() {
            InMemoryGraphStore::load_json(&self.graph)?
        } else {
            InMemoryGraphStore::new()
        };

        let result = ImportService::new(&store, config.clone())
            .import(&ImportOptions::new(&self.path))?;
        store.save_json(&self.graph)?;

        let mut summary = result.summary();
        summary.push(format!("Graph saved to {}", self.graph.display()));
        Ok(summary)
    }
}
