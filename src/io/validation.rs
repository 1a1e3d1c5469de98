//! Header validation for table files.
//!
//! A header is checked once per file before any row is read. Problems that
//! make the whole file unusable become [`Error::CorruptedFile`]; the
//! orchestrators count such files as ignored and move on.

use crate::config::IoConfig;
use crate::{Error, Result};
use std::collections::HashSet;

/// A property column and its position in the row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyColumn {
    /// Zero-based field index.
    pub position: usize,
    /// Property key.
    pub key: String,
}

/// Column layout of a node file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeLayout {
    /// Position of the index column.
    pub index: usize,
    /// Property columns, in header order.
    pub properties: Vec<PropertyColumn>,
}

/// Column layout of a relationship file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipLayout {
    /// Position of the source column.
    pub source: usize,
    /// Position of the destination column.
    pub destination: usize,
    /// Property columns, in header order.
    pub properties: Vec<PropertyColumn>,
}

/// Validates a node file header.
///
/// # Errors
///
/// Returns [`Error::CorruptedFile`] if the header is empty, has duplicate
/// columns, or lacks the index column.
pub fn validate_node_header(file: &str, header: &[String], config: &IoConfig) -> Result<NodeLayout> {
    check_shape(file, header)?;
    let index = require_column(file, header, &config.index_column)?;
    Ok(NodeLayout {
        index,
        properties: property_columns(header, &config.node_reserved_columns()),
    })
}

/// Validates a relationship file header.
///
/// # Errors
///
/// Returns [`Error::CorruptedFile`] if the header is empty, has duplicate
/// columns, or lacks the source or destination column.
pub fn validate_relationship_header(
    file: &str,
    header: &[String],
    config: &IoConfig,
) -> Result<RelationshipLayout> {
    check_shape(file, header)?;
    let source = require_column(file, header, &config.source_column)?;
    let destination = require_column(file, header, &config.destination_column)?;
    Ok(RelationshipLayout {
        source,
        destination,
        properties: property_columns(header, &config.relationship_reserved_columns()),
    })
}

fn check_shape(file: &str, header: &[String]) -> Result<()> {
    if header.iter().all(|column| column.trim().is_empty()) {
        return Err(corrupted(file, "header is empty"));
    }
    let mut seen = HashSet::new();
    for column in header {
        if !column.is_empty() && !seen.insert(column.as_str()) {
            return Err(corrupted(file, &format!("duplicate column '{column}'")));
        }
    }
    Ok(())
}

fn require_column(file: &str, header: &[String], column: &str) -> Result<usize> {
    header
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| corrupted(file, &format!("missing required column '{column}'")))
}

/// Every named column except the table's reserved ones.
fn property_columns(header: &[String], reserved: &[&str]) -> Vec<PropertyColumn> {
    header
        .iter()
        .enumerate()
        .filter(|(_, key)| {
            if key.is_empty() {
                tracing::warn!("Ignoring column with empty header");
                return false;
            }
            !reserved.contains(&key.as_str())
        })
        .map(|(position, key)| PropertyColumn {
            position,
            key: key.clone(),
        })
        .collect()
}

fn corrupted(file: &str, reason: &str) -> Error {
    Error::CorruptedFile {
        file: file.to_string(),
        reason: reason.to_string(),
    }
}
