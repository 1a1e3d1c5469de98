//! Archive packaging and unpacking.
//!
//! Export bundles the produced table files into one zip archive and removes
//! the loose copies. Import reads either such an archive or a plain folder of
//! the same files through [`TableSource`].

use crate::io::traits::TableSource;
use crate::{Error, Result};
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Outcome of packing a set of files.
#[derive(Debug, Clone, Default)]
pub struct PackReport {
    /// Path of the written archive.
    pub archive: PathBuf,
    /// Files stored in the archive.
    pub packed: Vec<String>,
    /// Files that could not be stored, with the reason. They stay on disk.
    pub failures: Vec<String>,
}

/// Packs `files` (names relative to `dir`) into `archive`.
///
/// A file that cannot be added is logged and left in place; the rest are
/// still packed. Loose copies of packed files are removed once the archive is
/// closed.
///
/// # Errors
///
/// Returns an error if the archive cannot be created or finalized.
pub fn pack(dir: &Path, files: &[String], archive: &Path) -> Result<PackReport> {
    let out = File::create(archive).map_err(|e| Error::OperationFailed {
        operation: "create_archive".to_string(),
        cause: format!("{}: {e}", archive.display()),
    })?;
    let mut writer = ZipWriter::new(out);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut report = PackReport {
        archive: archive.to_path_buf(),
        ..PackReport::default()
    };

    for name in files {
        match add_entry(&mut writer, dir, name, options) {
            Ok(()) => report.packed.push(name.clone()),
            Err(e) => {
                tracing::warn!(file = %name, error = %e, "Failed to add file to archive");
                report.failures.push(format!("{name}: {e}"));
            },
        }
    }

    writer.finish().map_err(|e| Error::OperationFailed {
        operation: "finish_archive".to_string(),
        cause: format!("{}: {e}", archive.display()),
    })?;

    for name in &report.packed {
        let path = dir.join(name);
        if let Err(e) = fs::remove_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove packed file");
        }
    }

    tracing::info!(
        archive = %archive.display(),
        packed = report.packed.len(),
        failed = report.failures.len(),
        "Archive written"
    );
    Ok(report)
}

fn add_entry(
    writer: &mut ZipWriter<File>,
    dir: &Path,
    name: &str,
    options: SimpleFileOptions,
) -> Result<()> {
    let path = dir.join(name);
    let mut file = File::open(&path).map_err(|e| Error::operation("open_table_file", e))?;
    writer
        .start_file(name, options)
        .map_err(|e| Error::operation("start_archive_entry", e))?;
    if let Err(e) = std::io::copy(&mut file, writer) {
        // Drop the partial entry so the archive stays readable.
        if let Err(abort) = writer.abort_file() {
            tracing::warn!(entry = %name, error = %abort, "Failed to discard partial archive entry");
        }
        return Err(Error::operation("write_archive_entry", e));
    }
    Ok(())
}

/// Opens an archive or folder as a table source.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if `path` does not exist, or an error if it
/// cannot be opened as a folder or zip archive.
pub fn open_source(path: &Path) -> Result<Box<dyn TableSource>> {
    if !path.exists() {
        return Err(Error::NotFound(format!(
            "import path {} does not exist",
            path.display()
        )));
    }
    if path.is_dir() {
        Ok(Box::new(DirectoryTableSource::open(path)?))
    } else {
        Ok(Box::new(ZipTableSource::open(path)?))
    }
}

/// Entries of a zip archive.
pub struct ZipTableSource {
    path: PathBuf,
    archive: ZipArchive<BufReader<File>>,
}

impl ZipTableSource {
    /// Opens a zip archive.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or is not a zip archive.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::OperationFailed {
            operation: "open_archive".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;
        let archive = ZipArchive::new(BufReader::new(file)).map_err(|e| Error::OperationFailed {
            operation: "read_archive".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            archive,
        })
    }
}

impl TableSource for ZipTableSource {
    fn entry_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .archive
            .file_names()
            .filter(|name| !name.ends_with('/'))
            .map(String::from)
            .collect();
        names.sort();
        names
    }

    fn open_entry(&mut self, name: &str) -> Result<Box<dyn Read + '_>> {
        let entry = self.archive.by_name(name).map_err(|e| Error::OperationFailed {
            operation: "read_archive_entry".to_string(),
            cause: format!("{name}: {e}"),
        })?;
        Ok(Box::new(entry))
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Files of a plain folder. Subfolders are not descended into.
pub struct DirectoryTableSource {
    dir: PathBuf,
    names: Vec<String>,
}

impl DirectoryTableSource {
    /// Lists a folder.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder cannot be read.
    pub fn open(dir: &Path) -> Result<Self> {
        let entries = fs::read_dir(dir).map_err(|e| Error::OperationFailed {
            operation: "read_import_dir".to_string(),
            cause: format!("{}: {e}", dir.display()),
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::operation("read_import_dir", e))?;
            if !entry.path().is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(name) => {
                    tracing::warn!(file = ?name, "Skipping file with non UTF-8 name");
                },
            }
        }
        names.sort();

        Ok(Self {
            dir: dir.to_path_buf(),
            names,
        })
    }
}

impl TableSource for DirectoryTableSource {
    fn entry_names(&self) -> Vec<String> {
        self.names.clone()
    }

    fn open_entry(&mut self, name: &str) -> Result<Box<dyn Read + '_>> {
        let path = self.dir.join(name);
        let file = File::open(&path).map_err(|e| Error::OperationFailed {
            operation: "open_table_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn location(&self) -> String {
        self.dir.display().to_string()
    }
}
