//! Save CLI command.

use crate::Result;
use crate::config::IoConfig;
use crate::io::{ExportOptions, ExportService};
use crate::storage::InMemoryGraphStore;
use std::path::PathBuf;

/// Save command handler.
#[derive(Debug, Clone)]
pub struct SaveCommand {
    /// Graph snapshot to export from.
    pub graph: PathBuf,
    /// Labels to export.
    pub labels: Vec<String>,
    /// Output folder.
    pub output: PathBuf,
    /// Archive name; empty or absent leaves loose files.
    pub archive: Option<String>,
    /// Export relationships between exported nodes.
    pub save_relationships: bool,
    /// Discover neighbor labels.
    pub consider_neighbors: bool,
}

impl SaveCommand {
    /// Runs the export and returns the summary lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be loaded or the export fails.
    pub fn run(&self, config: &IoConfig) -> Result<Vec<String>> {
        let store = InMemoryGraphStore::load_json(&self.graph)?;
        let mut options = ExportOptions::new(self.labels.iter().cloned(), &self.output)
            .with_relationships(self.save_relationships)
            .with_neighbors(self.consider_neighbors);
        if let Some(name) = &self.archive {
            options = options.with_archive_name(name.clone());
        }

        let result = ExportService::new(&store, config.clone()).export(&options)?;
        Ok(result.summary())
    }
}
