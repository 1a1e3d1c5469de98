//! Graph export service.
//!
//! Walks the requested labels (optionally discovering neighbor labels), writes
//! one node table per label, then one relationship table per type covering
//! only relationships between exported nodes, and finally bundles the tables
//! into an archive.

use crate::config::IoConfig;
use crate::io::archive;
use crate::io::binding::TransientId;
use crate::io::formats::CsvTableWriter;
use crate::io::frontier::FrontierExplorer;
use crate::io::naming::{archive_file_name, node_file_name, relationship_file_name};
use crate::io::schema::SchemaAggregator;
use crate::io::services::state::{RunKind, RunState, RunTracker};
use crate::io::transaction::TransactionScope;
use crate::models::{Direction, NodeId, Relationship};
use crate::storage::GraphStore;
use crate::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Options for graph export.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Labels to export, in order.
    pub labels: Vec<String>,
    /// Folder the tables (and archive) are written to.
    pub output_dir: PathBuf,
    /// Archive name; `None` leaves the loose tables in place.
    pub archive_name: Option<String>,
    /// Also export relationships between exported nodes.
    pub save_relationships: bool,
    /// Follow relationships to discover more labels.
    pub consider_neighbors: bool,
}

impl ExportOptions {
    /// Creates options with relationships on and neighbor discovery off.
    #[must_use]
    pub fn new<I, S>(labels: I, output_dir: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
            output_dir: output_dir.into(),
            archive_name: None,
            save_relationships: true,
            consider_neighbors: false,
        }
    }

    /// Sets the archive name. An empty name disables packaging.
    #[must_use]
    pub fn with_archive_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.archive_name = (!name.trim().is_empty()).then_some(name);
        self
    }

    /// Enables or disables relationship export.
    #[must_use]
    pub const fn with_relationships(mut self, save: bool) -> Self {
        self.save_relationships = save;
        self
    }

    /// Enables or disables neighbor label discovery.
    #[must_use]
    pub const fn with_neighbors(mut self, consider: bool) -> Self {
        self.consider_neighbors = consider;
        self
    }
}

/// Mutable state of one export run.
#[derive(Debug)]
pub struct ExportSession {
    /// Every node written to a node table.
    pub visited_node_ids: BTreeSet<NodeId>,
    /// Label frontier.
    pub frontier: FrontierExplorer,
    /// Table files written, in order.
    pub produced_files: Vec<String>,
}

impl ExportSession {
    /// Creates a session for the given options.
    #[must_use]
    pub fn new(options: &ExportOptions) -> Self {
        Self {
            visited_node_ids: BTreeSet::new(),
            frontier: FrontierExplorer::new(options.labels.iter().cloned(), options.consider_neighbors),
            produced_files: Vec::new(),
        }
    }

    fn record_file(&mut self, name: &str) {
        if !self.produced_files.iter().any(|f| f == name) {
            self.produced_files.push(name.to_string());
        }
    }
}

/// Result of an export operation.
#[derive(Debug, Clone, Default)]
pub struct ExportResult {
    /// Labels in the order they were processed.
    pub labels_processed: Vec<String>,
    /// Node tables written.
    pub node_files: Vec<String>,
    /// Relationship tables written.
    pub relationship_files: Vec<String>,
    /// Distinct nodes written.
    pub nodes_written: usize,
    /// Relationships written.
    pub relationships_written: usize,
    /// Per-label and per-file problems that were skipped.
    pub failures: Vec<String>,
    /// `<category>.<key>` properties not exported because the key names a
    /// reserved column of that table.
    pub shadowed_properties: Vec<String>,
    /// Folder the tables were written to.
    pub output_dir: PathBuf,
    /// Archive path, when packaging was requested.
    pub archive: Option<PathBuf>,
    /// States the run went through.
    pub states: Vec<RunState>,
}

impl ExportResult {
    /// Returns whether any table was written.
    #[must_use]
    pub fn has_exports(&self) -> bool {
        !self.node_files.is_empty()
    }

    /// Human-readable run summary, one line per item.
    #[must_use]
    pub fn summary(&self) -> Vec<String> {
        let mut lines = vec![
            format!(
                "{} file(s) containing a label were written.",
                self.node_files.len()
            ),
            format!(
                "{} file(s) containing relationships were written.",
                self.relationship_files.len()
            ),
            format!(
                "{} node(s) and {} relationship(s) were exported.",
                self.nodes_written, self.relationships_written
            ),
        ];
        lines.extend(self.failures.iter().map(|f| format!("Skipped: {f}")));
        if !self.shadowed_properties.is_empty() {
            lines.push(format!(
                "Not exported, name taken by a reserved column: {}",
                self.shadowed_properties.join(", ")
            ));
        }
        match &self.archive {
            Some(path) => lines.push(format!("Archive written to {}", path.display())),
            None => lines.push(format!(
                "Files left in {} (no archive requested)",
                self.output_dir.display()
            )),
        }
        lines
    }

    fn record_shadowed(&mut self, category: &str, schema: &SchemaAggregator) {
        self.shadowed_properties
            .extend(schema.dropped().into_iter().map(|key| format!("{category}.{key}")));
    }
}

/// Service for exporting a graph to tables.
pub struct ExportService<'a, S: GraphStore + ?Sized> {
    store: &'a S,
    config: IoConfig,
}

impl<'a, S: GraphStore + ?Sized> ExportService<'a, S> {
    /// Creates a new export service.
    #[must_use]
    pub const fn new(store: &'a S, config: IoConfig) -> Self {
        Self { store, config }
    }

    /// Exports the requested labels.
    ///
    /// Missing labels and unwritable tables are recorded on the result. The
    /// run fails, rolling back the store transaction, when the output folder
    /// cannot be created, the store fails, the archive cannot be written, or
    /// no label produced a node table.
    ///
    /// # Errors
    ///
    /// Returns an error for the unrecoverable conditions above.
    #[instrument(
        skip(self, options),
        fields(labels = ?options.labels, output = %options.output_dir.display())
    )]
    pub fn export(&self, options: &ExportOptions) -> Result<ExportResult> {
        let mut tracker = RunTracker::new(RunKind::Export);
        match self.run(options, &mut tracker) {
            Ok(mut result) => {
                result.states = tracker.history().to_vec();
                tracing::info!(
                    nodes = result.nodes_written,
                    relationships = result.relationships_written,
                    failures = result.failures.len(),
                    "Export complete"
                );
                Ok(result)
            },
            Err(e) => {
                tracing::error!(state = %tracker.state(), error = %e, "Export failed");
                tracker.fail();
                Err(e)
            },
        }
    }

    fn run(&self, options: &ExportOptions, tracker: &mut RunTracker) -> Result<ExportResult> {
        if options.labels.is_empty() {
            return Err(Error::InvalidInput("no labels to export".to_string()));
        }
        self.config.validate()?;

        tracker.advance(RunState::ValidatingPath)?;
        std::fs::create_dir_all(&options.output_dir).map_err(|e| Error::OperationFailed {
            operation: "create_output_dir".to_string(),
            cause: format!("{}: {e}", options.output_dir.display()),
        })?;

        let scope = TransactionScope::begin(self.store)?;
        tracker.advance(RunState::Processing)?;

        let mut session = ExportSession::new(options);
        let mut result = ExportResult {
            output_dir: options.output_dir.clone(),
            ..ExportResult::default()
        };

        self.export_nodes(&mut session, &mut result, &options.output_dir)?;
        if !result.has_exports() {
            return Err(Error::OperationFailed {
                operation: "export".to_string(),
                cause: format!("no node table was produced ({})", result.failures.join("; ")),
            });
        }

        if options.save_relationships {
            self.export_relationships(&mut session, &mut result, &options.output_dir)?;
        }

        if let Some(name) = &options.archive_name {
            tracker.advance(RunState::Packaging)?;
            let archive_path = options
                .output_dir
                .join(archive_file_name(name, &self.config));
            let report = archive::pack(&options.output_dir, &session.produced_files, &archive_path)?;
            result
                .failures
                .extend(report.failures.into_iter().map(|f| format!("not archived: {f}")));
            result.archive = Some(report.archive);
        }

        tracker.advance(RunState::Committing)?;
        scope.commit()?;
        tracker.advance(RunState::Done)?;
        Ok(result)
    }

    /// Node pass: drains the frontier, one table per label.
    fn export_nodes(
        &self,
        session: &mut ExportSession,
        result: &mut ExportResult,
        dir: &Path,
    ) -> Result<()> {
        while let Some(label) = session.frontier.next_category() {
            session.frontier.close(label.clone());
            result.labels_processed.push(label.clone());

            match self.export_label(&label, session, result, dir) {
                Ok((file, count)) => {
                    tracing::info!(
                        label = %label,
                        nodes = count,
                        file = %file,
                        pending = session.frontier.pending(),
                        "Wrote node table"
                    );
                    result.node_files.push(file);
                },
                Err(e) if e.is_recoverable() || matches!(e, Error::InvalidInput(_)) => {
                    tracing::warn!(label = %label, error = %e, "Skipping label");
                    result.failures.push(e.to_string());
                },
                Err(e) => return Err(e),
            }
        }
        result.nodes_written = session.visited_node_ids.len();
        Ok(())
    }

    fn export_label(
        &self,
        label: &str,
        session: &mut ExportSession,
        result: &mut ExportResult,
        dir: &Path,
    ) -> Result<(String, usize)> {
        let file_name = node_file_name(label, &self.config)?;
        let nodes = self.store.find_nodes(label)?;
        if nodes.is_empty() {
            return Err(Error::NoEntities {
                label: label.to_string(),
            });
        }

        let schema = SchemaAggregator::from_entities(
            nodes.iter().map(|n| &n.properties),
            &self.config.node_reserved_columns(),
        );
        result.record_shadowed(label, &schema);
        let header = schema.columns();
        let mut writer = CsvTableWriter::for_nodes(create_table(dir, &file_name)?, header, &self.config)?;
        for node in &nodes {
            writer.write_node(node)?;
            session.visited_node_ids.insert(node.id);
            session.frontier.explore_neighbors(self.store, node.id)?;
        }
        finish_table(writer, &file_name)?;

        session.record_file(&file_name);
        Ok((file_name, nodes.len()))
    }

    /// Relationship pass: runs after every node table is closed.
    fn export_relationships(
        &self,
        session: &mut ExportSession,
        result: &mut ExportResult,
        dir: &Path,
    ) -> Result<()> {
        let mut by_type: BTreeMap<String, Vec<Relationship>> = BTreeMap::new();
        for &node in &session.visited_node_ids {
            for relationship in self.store.relationships(node, Direction::Outgoing)? {
                if session.visited_node_ids.contains(&relationship.destination) {
                    by_type
                        .entry(relationship.rel_type.clone())
                        .or_default()
                        .push(relationship);
                }
            }
        }

        for (rel_type, relationships) in by_type {
            let file_name = match relationship_file_name(&rel_type, &self.config) {
                Ok(name) => name,
                Err(e) => {
                    tracing::warn!(rel_type = %rel_type, error = %e, "Skipping relationship type");
                    result.failures.push(e.to_string());
                    continue;
                },
            };

            let schema = SchemaAggregator::from_entities(
                relationships.iter().map(|r| &r.properties),
                &self.config.relationship_reserved_columns(),
            );
            result.record_shadowed(&rel_type, &schema);
            let header = schema.columns();
            let mut writer =
                CsvTableWriter::for_relationships(create_table(dir, &file_name)?, header, &self.config)?;
            for relationship in &relationships {
                writer.write_relationship(
                    &TransientId::from(relationship.source),
                    &TransientId::from(relationship.destination),
                    &relationship.properties,
                )?;
            }
            finish_table(writer, &file_name)?;

            tracing::info!(
                rel_type = %rel_type,
                relationships = relationships.len(),
                file = %file_name,
                "Wrote relationship table"
            );
            result.relationships_written += relationships.len();
            result.relationship_files.push(file_name.clone());
            session.record_file(&file_name);
        }
        Ok(())
    }
}

fn create_table(dir: &Path, file_name: &str) -> Result<BufWriter<File>> {
    let path = dir.join(file_name);
    let file = File::create(&path).map_err(|e| Error::OperationFailed {
        operation: "create_table_file".to_string(),
        cause: format!("{}: {e}", path.display()),
    })?;
    Ok(BufWriter::new(file))
}

fn finish_table(writer: CsvTableWriter<BufWriter<File>>, file_name: &str) -> Result<()> {
    writer.finish()?.flush().map_err(|e| Error::OperationFailed {
        operation: "close_table_file".to_string(),
        cause: format!("{file_name}: {e}"),
    })
}
