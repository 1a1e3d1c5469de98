//! Graph import service.
//!
//! Rebuilds a graph from an archive or folder of tables in two passes: every
//! node table first, binding each transient id to the node it created, then
//! every relationship table, resolving endpoints through those bindings.

use crate::config::IoConfig;
use crate::io::archive;
use crate::io::binding::IdentifierBindingTable;
use crate::io::formats::{NodeRow, NodeTableReader, RelationshipRow, RelationshipTableReader};
use crate::io::naming::TableKind;
use crate::io::services::state::{RunKind, RunState, RunTracker};
use crate::io::traits::TableSource;
use crate::io::transaction::TransactionScope;
use crate::storage::GraphStore;
use crate::{Error, Result};
use std::path::PathBuf;
use tracing::instrument;

/// Options for graph import.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Zip archive or folder holding the tables.
    pub path: PathBuf,
}

impl ImportOptions {
    /// Creates import options for an archive or folder.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Mutable state of one import run.
#[derive(Debug, Default)]
pub struct ImportSession {
    /// Transient id to created node.
    pub bindings: IdentifierBindingTable,
}

/// Result of an import operation.
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    /// Archive or folder that was read.
    pub source: String,
    /// Node tables processed.
    pub node_files_processed: usize,
    /// Relationship tables processed.
    pub relationship_files_processed: usize,
    /// Entries that were not table files or could not be read.
    pub files_ignored: usize,
    /// Nodes created.
    pub nodes_created: usize,
    /// Rows that added a label to an already imported node.
    pub nodes_merged: usize,
    /// Relationships created.
    pub relationships_created: usize,
    /// Relationships skipped because an endpoint was never imported.
    pub relationships_skipped: usize,
    /// Rows that failed and were skipped.
    pub rows_failed: usize,
    /// Why files were ignored.
    pub issues: Vec<String>,
    /// States the run went through.
    pub states: Vec<RunState>,
}

impl ImportResult {
    /// Returns whether anything was created.
    #[must_use]
    pub const fn has_imports(&self) -> bool {
        self.nodes_created > 0 || self.relationships_created > 0
    }

    /// Human-readable run summary, one line per item.
    #[must_use]
    pub fn summary(&self) -> Vec<String> {
        vec![
            format!(
                "{} file(s) containing a label were found and processed.",
                self.node_files_processed
            ),
            format!(
                "{} file(s) containing relationships were found and processed.",
                self.relationship_files_processed
            ),
            format!(
                "{} file(s) were ignored. Check logs for more information.",
                self.files_ignored
            ),
            format!(
                "{} node(s) and {} relationship(s) were created during the import.",
                self.nodes_created, self.relationships_created
            ),
            format!(
                "{} relationship(s) were skipped because an endpoint was not imported.",
                self.relationships_skipped
            ),
            format!("{} row(s) failed and were skipped.", self.rows_failed),
        ]
    }

    fn ignore(&mut self, file: &str, reason: &str) {
        tracing::warn!(file = %file, reason = %reason, "Ignoring file");
        self.files_ignored += 1;
        self.issues.push(format!("{file}: {reason}"));
    }
}

/// Service for importing tables into a graph.
pub struct ImportService<'a, S: GraphStore + ?Sized> {
    store: &'a S,
    config: IoConfig,
}

impl<'a, S: GraphStore + ?Sized> ImportService<'a, S> {
    /// Creates a new import service.
    #[must_use]
    pub const fn new(store: &'a S, config: IoConfig) -> Self {
        Self { store, config }
    }

    /// Imports an archive or folder.
    ///
    /// Unrecognized or corrupted files, failing rows and relationships with an
    /// unknown endpoint are counted on the result. A table whose rows all
    /// fail is ignored. The run fails, rolling back the store transaction,
    /// when the path is missing or unreadable, the store reports
    /// [`Error::OperationFailed`], or no table file could be processed.
    ///
    /// # Errors
    ///
    /// Returns an error for the unrecoverable conditions above.
    #[instrument(skip(self, options), fields(path = %options.path.display()))]
    pub fn import(&self, options: &ImportOptions) -> Result<ImportResult> {
        let mut tracker = RunTracker::new(RunKind::Import);
        match self.run(options, &mut tracker) {
            Ok(mut result) => {
                result.states = tracker.history().to_vec();
                tracing::info!(
                    nodes = result.nodes_created,
                    relationships = result.relationships_created,
                    skipped = result.relationships_skipped,
                    ignored = result.files_ignored,
                    "Import complete"
                );
                Ok(result)
            },
            Err(e) => {
                tracing::error!(state = %tracker.state(), error = %e, "Import failed");
                tracker.fail();
                Err(e)
            },
        }
    }

    fn run(&self, options: &ImportOptions, tracker: &mut RunTracker) -> Result<ImportResult> {
        self.config.validate()?;

        tracker.advance(RunState::ValidatingPath)?;
        if !options.path.exists() {
            return Err(Error::NotFound(format!(
                "import path {} does not exist",
                options.path.display()
            )));
        }

        tracker.advance(RunState::Unpacking)?;
        let mut source = archive::open_source(&options.path)?;
        let mut result = ImportResult {
            source: source.location(),
            ..ImportResult::default()
        };

        let mut node_tables = Vec::new();
        let mut relationship_tables = Vec::new();
        for name in source.entry_names() {
            match TableKind::classify(&name, &self.config) {
                TableKind::Node(label) => node_tables.push((name, label)),
                TableKind::Relationship(rel_type) => relationship_tables.push((name, rel_type)),
                TableKind::Unrecognized => result.ignore(&name, "not a table file"),
            }
        }

        let scope = TransactionScope::begin(self.store)?;
        tracker.advance(RunState::Processing)?;

        let mut session = ImportSession::default();
        for (name, label) in &node_tables {
            match self.import_node_table(source.as_mut(), name, label, &mut session, &mut result) {
                Ok(()) => result.node_files_processed += 1,
                Err(e) if e.is_recoverable() => result.ignore(name, &e.to_string()),
                Err(e) => return Err(e),
            }
        }
        tracing::debug!(bound = session.bindings.len(), "Node tables imported");
        if session.bindings.is_empty() && !relationship_tables.is_empty() {
            tracing::warn!("No node was bound, every relationship will be skipped");
        }
        for (name, rel_type) in &relationship_tables {
            match self.import_relationship_table(source.as_mut(), name, rel_type, &session, &mut result)
            {
                Ok(()) => result.relationship_files_processed += 1,
                Err(e) if e.is_recoverable() => result.ignore(name, &e.to_string()),
                Err(e) => return Err(e),
            }
        }

        if result.node_files_processed + result.relationship_files_processed == 0 {
            return Err(Error::OperationFailed {
                operation: "import".to_string(),
                cause: format!("no table file could be processed in {}", result.source),
            });
        }

        tracker.advance(RunState::Committing)?;
        scope.commit()?;
        tracker.advance(RunState::Done)?;
        Ok(result)
    }

    fn import_node_table(
        &self,
        source: &mut dyn TableSource,
        name: &str,
        label: &str,
        session: &mut ImportSession,
        result: &mut ImportResult,
    ) -> Result<()> {
        let reader = source.open_entry(name).map_err(|e| unreadable(name, &e))?;
        let rows = NodeTableReader::new(reader, name, &self.config)?;
        tracing::debug!(file = %name, keys = ?rows.property_keys(), "Reading node table");
        let (mut created, mut merged, mut failed) = (0_usize, 0_usize, 0_usize);
        for row in rows {
            let outcome = match row {
                Ok(row) => self.import_node_row(label, row, session),
                Err(e) => Err(unreadable(name, &e)),
            };
            match outcome {
                Ok(true) => created += 1,
                Ok(false) => merged += 1,
                Err(e) => {
                    skip_row(name, e)?;
                    failed += 1;
                },
            }
        }
        result.rows_failed += failed;
        if failed > 0 && created + merged == 0 {
            return Err(no_row_imported(name, failed));
        }
        tracing::info!(file = %name, label = %label, created, merged, failed, "Imported node table");
        result.nodes_created += created;
        result.nodes_merged += merged;
        Ok(())
    }

    /// Returns true if a node was created, false if the row was merged into
    /// a node bound by an earlier table.
    fn import_node_row(&self, label: &str, row: NodeRow, session: &mut ImportSession) -> Result<bool> {
        if let Some(existing) = session.bindings.resolve(&row.id) {
            self.store.add_node_label(existing, label)?;
            let node = self
                .store
                .get_node(existing)?
                .ok_or_else(|| Error::NotFound(format!("node {existing}")))?;
            for (key, value) in row.properties {
                if !node.properties.contains_key(&key) {
                    self.store.set_node_property(existing, &key, value)?;
                }
            }
            return Ok(false);
        }

        let id = self.store.create_node(&[label.to_string()], row.properties)?;
        session.bindings.bind(row.id, id);
        Ok(true)
    }

    fn import_relationship_table(
        &self,
        source: &mut dyn TableSource,
        name: &str,
        rel_type: &str,
        session: &ImportSession,
        result: &mut ImportResult,
    ) -> Result<()> {
        let reader = source.open_entry(name).map_err(|e| unreadable(name, &e))?;
        let rows = RelationshipTableReader::new(reader, name, &self.config)?;
        let (mut created, mut skipped, mut failed) = (0_usize, 0_usize, 0_usize);
        for row in rows {
            let outcome = match row {
                Ok(row) => self.import_relationship_row(rel_type, row, session),
                Err(e) => Err(unreadable(name, &e)),
            };
            match outcome {
                Ok(true) => created += 1,
                Ok(false) => skipped += 1,
                Err(e) => {
                    skip_row(name, e)?;
                    failed += 1;
                },
            }
        }
        result.rows_failed += failed;
        if failed > 0 && created + skipped == 0 {
            return Err(no_row_imported(name, failed));
        }
        tracing::info!(file = %name, rel_type = %rel_type, created, skipped, failed, "Imported relationship table");
        result.relationships_created += created;
        result.relationships_skipped += skipped;
        Ok(())
    }

    /// Returns false when an endpoint is unbound.
    fn import_relationship_row(
        &self,
        rel_type: &str,
        row: RelationshipRow,
        session: &ImportSession,
    ) -> Result<bool> {
        let (Some(source), Some(destination)) = (
            session.bindings.resolve(&row.source),
            session.bindings.resolve(&row.destination),
        ) else {
            tracing::debug!(
                source = %row.source,
                destination = %row.destination,
                "Endpoint not imported, skipping relationship"
            );
            return Ok(false);
        };
        self.store
            .create_relationship(source, destination, rel_type, row.properties)?;
        Ok(true)
    }
}

/// Reading a table is never fatal for the run; the file is ignored instead.
fn unreadable(file: &str, error: &Error) -> Error {
    Error::CorruptedFile {
        file: file.to_string(),
        reason: error.to_string(),
    }
}

fn no_row_imported(file: &str, failed: usize) -> Error {
    Error::CorruptedFile {
        file: file.to_string(),
        reason: format!("no row could be imported ({failed} failed)"),
    }
}

/// Logs a failed row, or hands back a store failure to abort the run.
fn skip_row(file: &str, error: Error) -> Result<()> {
    match error {
        Error::OperationFailed { .. } => Err(error),
        other => {
            tracing::warn!(file = %file, error = %other, "Skipping row");
            Ok(())
        },
    }
}
