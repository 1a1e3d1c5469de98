//! Core traits for import.
//!
//! Defines [`TableSource`], the listing and streaming view the import
//! orchestrator reads table files through. Zip archives and plain folders both
//! implement it.

use crate::Result;
use std::io::Read;

/// A set of named table entries.
///
/// # Example Implementation
///
/// ```rust,ignore
/// impl TableSource for MemorySource {
///     fn entry_names(&self) -> Vec<String> {
///         self.files.keys().cloned().collect()
///     }
///
///     fn open_entry(&mut self, name: &str) -> Result<Box<dyn Read + '_>> {
///         Ok(Box::new(self.files[name].as_bytes()))
///     }
///
///     fn location(&self) -> String {
///         "memory".to_string()
///     }
/// }
/// ```
pub trait TableSource {
    /// Names of all file entries, sorted.
    fn entry_names(&self) -> Vec<String>;

    /// Opens one entry for streaming.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry does not exist or cannot be read.
    fn open_entry(&mut self, name: &str) -> Result<Box<dyn Read + '_>>;

    /// Human-readable location, for logs and summaries.
    fn location(&self) -> String;
}
