//! CSV table codec.
//!
//! Writes one category as a header row followed by one row per entity, and
//! reads such files back into typed rows. Reserved columns lead the header;
//! property columns follow in the order given by the schema union.

use crate::config::IoConfig;
use crate::io::binding::TransientId;
use crate::io::validation::{
    NodeLayout, PropertyColumn, RelationshipLayout, validate_node_header,
    validate_relationship_header,
};
use crate::io::value::ValueCodec;
use crate::models::{Node, PropertyMap};
use crate::{Error, Result};
use std::io::{Read, Write};

fn write_error(e: &csv::Error) -> Error {
    Error::OperationFailed {
        operation: "write_csv".to_string(),
        cause: e.to_string(),
    }
}

/// Encodes rows of one category.
pub struct CsvTableWriter<W: Write> {
    writer: csv::Writer<W>,
    properties: Vec<String>,
    rows: usize,
}

impl<W: Write> CsvTableWriter<W> {
    /// Creates a node table writer and writes the header.
    ///
    /// # Errors
    ///
    /// Returns an error if the delimiter is unusable or the header cannot be
    /// written.
    pub fn for_nodes(writer: W, properties: Vec<String>, config: &IoConfig) -> Result<Self> {
        Self::new(writer, &[config.index_column.as_str()], properties, config)
    }

    /// Creates a relationship table writer and writes the header.
    ///
    /// # Errors
    ///
    /// Returns an error if the delimiter is unusable or the header cannot be
    /// written.
    pub fn for_relationships(
        writer: W,
        properties: Vec<String>,
        config: &IoConfig,
    ) -> Result<Self> {
        Self::new(
            writer,
            &[
                config.source_column.as_str(),
                config.destination_column.as_str(),
            ],
            properties,
            config,
        )
    }

    fn new(writer: W, leading: &[&str], properties: Vec<String>, config: &IoConfig) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(config.delimiter_byte()?)
            .quote_style(csv::QuoteStyle::Necessary)
            .has_headers(false)
            .from_writer(writer);

        writer
            .write_record(leading.iter().copied().chain(properties.iter().map(String::as_str)))
            .map_err(|e| Error::OperationFailed {
                operation: "write_csv_headers".to_string(),
                cause: e.to_string(),
            })?;

        Ok(Self {
            writer,
            properties,
            rows: 0,
        })
    }

    /// Writes one node row keyed by its transient id.
    ///
    /// # Errors
    ///
    /// Returns an error if the row cannot be written.
    pub fn write_node(&mut self, node: &Node) -> Result<()> {
        let id = TransientId::from(node.id);
        self.write_row(&[id.as_str()], &node.properties)
    }

    /// Writes one relationship row.
    ///
    /// # Errors
    ///
    /// Returns an error if the row cannot be written.
    pub fn write_relationship(
        &mut self,
        source: &TransientId,
        destination: &TransientId,
        properties: &PropertyMap,
    ) -> Result<()> {
        self.write_row(&[source.as_str(), destination.as_str()], properties)
    }

    fn write_row(&mut self, leading: &[&str], properties: &PropertyMap) -> Result<()> {
        let cells: Vec<String> = self
            .properties
            .iter()
            .map(|key| {
                properties
                    .get(key)
                    .and_then(ValueCodec::encode)
                    .unwrap_or_default()
            })
            .collect();
        self.writer
            .write_record(leading.iter().copied().chain(cells.iter().map(String::as_str)))
            .map_err(|e| write_error(&e))?;
        self.rows += 1;
        Ok(())
    }

    /// Number of data rows written.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Flushes and returns the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    pub fn finish(self) -> Result<W> {
        self.writer.into_inner().map_err(|e| Error::OperationFailed {
            operation: "flush_csv".to_string(),
            cause: e.to_string(),
        })
    }
}

/// One decoded node row.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRow {
    /// Transient id from the index column.
    pub id: TransientId,
    /// Non-empty property cells, decoded.
    pub properties: PropertyMap,
}

/// One decoded relationship row.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipRow {
    /// Transient id of the start node.
    pub source: TransientId,
    /// Transient id of the end node.
    pub destination: TransientId,
    /// Non-empty property cells, decoded.
    pub properties: PropertyMap,
}

/// Reads records after the header, stopping on I/O failure.
struct RecordReader<R: Read> {
    reader: csv::Reader<R>,
    file: String,
    done: bool,
}

impl<R: Read> RecordReader<R> {
    fn open(reader: R, file: &str, config: &IoConfig) -> Result<(Self, Vec<String>)> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(config.delimiter_byte()?)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let header: Vec<String> = reader
            .headers()
            .map_err(|e| Error::CorruptedFile {
                file: file.to_string(),
                reason: format!("unreadable header: {e}"),
            })?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        Ok((
            Self {
                reader,
                file: file.to_string(),
                done: false,
            },
            header,
        ))
    }

    fn next_record(&mut self) -> Option<Result<csv::StringRecord>> {
        if self.done {
            return None;
        }
        let mut record = csv::StringRecord::new();
        match self.reader.read_record(&mut record) {
            Ok(true) => Some(Ok(record)),
            Ok(false) => {
                self.done = true;
                None
            },
            Err(e) => {
                if matches!(e.kind(), csv::ErrorKind::Io(_)) {
                    self.done = true;
                }
                Some(Err(Error::OperationFailed {
                    operation: "read_csv".to_string(),
                    cause: format!("{}: {e}", self.file),
                }))
            },
        }
    }
}

fn line_of(record: &csv::StringRecord) -> u64 {
    record.position().map_or(0, csv::Position::line)
}

fn decode_properties(record: &csv::StringRecord, columns: &[PropertyColumn]) -> PropertyMap {
    columns
        .iter()
        .filter_map(|column| {
            let cell = record.get(column.position)?;
            ValueCodec::decode(cell).map(|value| (column.key.clone(), value))
        })
        .collect()
}

fn required_id(record: &csv::StringRecord, position: usize, file: &str, column: &str) -> Result<TransientId> {
    record
        .get(position)
        .and_then(TransientId::parse)
        .ok_or_else(|| {
            Error::InvalidInput(format!(
                "{file} line {}: empty '{column}' cell",
                line_of(record)
            ))
        })
}

/// Decodes a node file row by row.
pub struct NodeTableReader<R: Read> {
    records: RecordReader<R>,
    layout: NodeLayout,
    index_column: String,
}

impl<R: Read> NodeTableReader<R> {
    /// Opens a node file and validates its header.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptedFile`] if the header is unusable.
    pub fn new(reader: R, file: &str, config: &IoConfig) -> Result<Self> {
        let (records, header) = RecordReader::open(reader, file, config)?;
        let layout = validate_node_header(file, &header, config)?;
        Ok(Self {
            records,
            layout,
            index_column: config.index_column.clone(),
        })
    }

    /// Property keys in header order.
    #[must_use]
    pub fn property_keys(&self) -> Vec<&str> {
        self.layout.properties.iter().map(|c| c.key.as_str()).collect()
    }
}

impl<R: Read> Iterator for NodeTableReader<R> {
    type Item = Result<NodeRow>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next_record()? {
            Ok(record) => record,
            Err(e) => return Some(Err(e)),
        };
        let row = required_id(
            &record,
            self.layout.index,
            &self.records.file,
            &self.index_column,
        )
        .map(|id| NodeRow {
            id,
            properties: decode_properties(&record, &self.layout.properties),
        });
        Some(row)
    }
}

/// Decodes a relationship file row by row.
pub struct RelationshipTableReader<R: Read> {
    records: RecordReader<R>,
    layout: RelationshipLayout,
    source_column: String,
    destination_column: String,
}

impl<R: Read> RelationshipTableReader<R> {
    /// Opens a relationship file and validates its header.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptedFile`] if the header is unusable.
    pub fn new(reader: R, file: &str, config: &IoConfig) -> Result<Self> {
        let (records, header) = RecordReader::open(reader, file, config)?;
        let layout = validate_relationship_header(file, &header, config)?;
        Ok(Self {
            records,
            layout,
            source_column: config.source_column.clone(),
            destination_column: config.destination_column.clone(),
        })
    }
}

impl<R: Read> Iterator for RelationshipTableReader<R> {
    type Item = Result<RelationshipRow>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next_record()? {
            Ok(record) => record,
            Err(e) => return Some(Err(e)),
        };
        let file = &self.records.file;
        let row = required_id(&record, self.layout.source, file, &self.source_column).and_then(
            |source| {
                let destination = required_id(
                    &record,
                    self.layout.destination,
                    file,
                    &self.destination_column,
                )?;
                Ok(RelationshipRow {
                    source,
                    destination,
                    properties: decode_properties(&record, &self.layout.properties),
                })
            },
        );
        Some(row)
    }
}
