//! File naming and CSV dialect settings.

use crate::{Error, Result};
use serde::Deserialize;

/// Tokens that shape the tabular files.
///
/// | Field | Default | Used for |
/// |-------|---------|----------|
/// | `delimiter` | `;` | Field separator |
/// | `extension` | `.csv` | Table file suffix |
/// | `index_column` | `id` | Node transient identifier column |
/// | `source_column` | `source` | Relationship start column |
/// | `destination_column` | `destination` | Relationship end column |
/// | `node_prefix` | `node_` | Node file prefix |
/// | `relationship_prefix` | `relationship_` | Relationship file prefix |
/// | `archive_extension` | `.zip` | Appended to archive names lacking it |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoConfig {
    /// Field delimiter. Must be a single ASCII character.
    pub delimiter: char,
    /// Table file extension, including the dot.
    pub extension: String,
    /// Header of the node index column.
    pub index_column: String,
    /// Header of the relationship source column.
    pub source_column: String,
    /// Header of the relationship destination column.
    pub destination_column: String,
    /// File name prefix for node tables.
    pub node_prefix: String,
    /// File name prefix for relationship tables.
    pub relationship_prefix: String,
    /// Archive file extension, including the dot.
    pub archive_extension: String,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            delimiter: ';',
            extension: ".csv".to_string(),
            index_column: "id".to_string(),
            source_column: "source".to_string(),
            destination_column: "destination".to_string(),
            node_prefix: "node_".to_string(),
            relationship_prefix: "relationship_".to_string(),
            archive_extension: ".zip".to_string(),
        }
    }
}

/// `[io]` section of the config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileIo {
    /// Field delimiter.
    pub delimiter: Option<char>,
    /// Table file extension.
    pub extension: Option<String>,
    /// Index column header.
    pub index_column: Option<String>,
    /// Source column header.
    pub source_column: Option<String>,
    /// Destination column header.
    pub destination_column: Option<String>,
    /// Node file prefix.
    pub node_prefix: Option<String>,
    /// Relationship file prefix.
    pub relationship_prefix: Option<String>,
    /// Archive extension.
    pub archive_extension: Option<String>,
}

impl IoConfig {
    /// Overlays the fields present in a config file section.
    #[must_use]
    pub fn with_overrides(mut self, file: ConfigFileIo) -> Self {
        if let Some(delimiter) = file.delimiter {
            self.delimiter = delimiter;
        }
        if let Some(extension) = file.extension {
            self.extension = extension;
        }
        if let Some(index_column) = file.index_column {
            self.index_column = index_column;
        }
        if let Some(source_column) = file.source_column {
            self.source_column = source_column;
        }
        if let Some(destination_column) = file.destination_column {
            self.destination_column = destination_column;
        }
        if let Some(node_prefix) = file.node_prefix {
            self.node_prefix = node_prefix;
        }
        if let Some(relationship_prefix) = file.relationship_prefix {
            self.relationship_prefix = relationship_prefix;
        }
        if let Some(archive_extension) = file.archive_extension {
            self.archive_extension = archive_extension;
        }
        self
    }

    /// Sets the delimiter.
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Returns the delimiter as the byte the CSV reader and writer expect.
    ///
    /// # Errors
    ///
    /// Returns an error if the delimiter is not ASCII.
    pub fn delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "delimiter '{}' must be a single ASCII character",
                    self.delimiter
                ))
            })
    }

    /// Columns a node table reserves for identifiers.
    #[must_use]
    pub fn node_reserved_columns(&self) -> [&str; 1] {
        [self.index_column.as_str()]
    }

    /// Columns a relationship table reserves for endpoints.
    #[must_use]
    pub fn relationship_reserved_columns(&self) -> [&str; 2] {
        [self.source_column.as_str(), self.destination_column.as_str()]
    }

    fn reserved_columns(&self) -> [&str; 3] {
        [
            self.index_column.as_str(),
            self.source_column.as_str(),
            self.destination_column.as_str(),
        ]
    }

    /// Checks that the tokens can round-trip labels through file names.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.delimiter_byte()?;
        if matches!(self.delimiter, '"' | '\n' | '\r') {
            return Err(Error::InvalidInput(format!(
                "delimiter {:?} conflicts with CSV quoting or line breaks",
                self.delimiter
            )));
        }

        for (name, value) in [
            ("extension", &self.extension),
            ("node_prefix", &self.node_prefix),
            ("relationship_prefix", &self.relationship_prefix),
            ("archive_extension", &self.archive_extension),
        ] {
            if value.is_empty() {
                return Err(Error::InvalidInput(format!("{name} must not be empty")));
            }
        }

        if self.node_prefix.starts_with(&self.relationship_prefix)
            || self.relationship_prefix.starts_with(&self.node_prefix)
        {
            return Err(Error::InvalidInput(format!(
                "file prefixes '{}' and '{}' are ambiguous",
                self.node_prefix, self.relationship_prefix
            )));
        }

        let [index, source, destination] = self.reserved_columns();
        if index.is_empty() || source.is_empty() || destination.is_empty() {
            return Err(Error::InvalidInput(
                "reserved column names must not be empty".to_string(),
            ));
        }
        if index == source || index == destination || source == destination {
            return Err(Error::InvalidInput(format!(
                "reserved columns '{index}', '{source}' and '{destination}' must differ"
            )));
        }

        Ok(())
    }
}
