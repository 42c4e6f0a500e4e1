//! Delimited text sources for frame construction
//!
//! A [`CsvFile`] only describes a file: where it lives on the server, the
//! schema its columns follow, and how to split it. The server resolves and
//! reads it when a frame is created from it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::errors::FrameCatalogError;
use super::schema::{FrameSchema, Value};

fn default_delimiter() -> char {
    ','
}

/// Description of a delimited file on the server's filesystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvFile {
    /// Absolute path, or a path relative to the server's datasets directory
    pub path: String,
    pub schema: FrameSchema,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Number of leading records to skip (usually the header line)
    #[serde(default)]
    pub skip_header_lines: usize,
}

/// Typed rows read from a source, plus how many records were rejected
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedRows {
    pub rows: Vec<Vec<Value>>,
    pub rejected: usize,
}

impl CsvFile {
    pub fn new(path: impl Into<String>, schema: FrameSchema) -> Self {
        CsvFile {
            path: path.into(),
            schema,
            delimiter: default_delimiter(),
            skip_header_lines: 0,
        }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_skip_header_lines(mut self, skip_header_lines: usize) -> Self {
        self.skip_header_lines = skip_header_lines;
        self
    }

    pub fn validate(&self) -> Result<(), FrameCatalogError> {
        if self.path.trim().is_empty() {
            return Err(FrameCatalogError::InvalidSource {
                message: "source path cannot be empty".to_string(),
            });
        }
        if !self.delimiter.is_ascii() || matches!(self.delimiter, '"' | '\n' | '\r') {
            return Err(FrameCatalogError::InvalidSource {
                message: format!("unsupported delimiter {:?}", self.delimiter),
            });
        }
        self.schema.validate()
    }

    /// Resolve the source path against the datasets directory
    pub fn resolve_path(&self, datasets_dir: Option<&Path>) -> PathBuf {
        let path = Path::new(&self.path);
        match datasets_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Read and type every record of the file.
    ///
    /// Records with the wrong number of fields or a cell that does not parse
    /// as its column type are rejected and counted, not loaded.
    pub fn load(&self, datasets_dir: Option<&Path>) -> Result<LoadedRows, FrameCatalogError> {
        self.validate()?;

        let path = self.resolve_path(datasets_dir);
        let display_path = path.display().to_string();
        if !path.is_file() {
            return Err(FrameCatalogError::SourceNotFound { path: display_path });
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter as u8)
            .has_headers(false)
            .flexible(true)
            .from_path(&path)
            .map_err(|e| FrameCatalogError::SourceRead {
                path: display_path.clone(),
                error: e.to_string(),
            })?;

        let columns = self.schema.columns();
        let mut loaded = LoadedRows::default();

        for (index, result) in reader.records().enumerate() {
            if index < self.skip_header_lines {
                continue;
            }

            let record = match result {
                Ok(record) => record,
                Err(e) if e.is_io_error() => {
                    return Err(FrameCatalogError::SourceRead {
                        path: display_path,
                        error: e.to_string(),
                    });
                }
                Err(e) => {
                    log::debug!("Rejecting record {} of {}: {}", index, display_path, e);
                    loaded.rejected += 1;
                    continue;
                }
            };

            if record.len() != columns.len() {
                log::debug!(
                    "Rejecting record {} of {}: expected {} fields, found {}",
                    index,
                    display_path,
                    columns.len(),
                    record.len()
                );
                loaded.rejected += 1;
                continue;
            }

            let row: Result<Vec<Value>, FrameCatalogError> = columns
                .iter()
                .zip(record.iter())
                .map(|(column, raw)| column.data_type.parse_value(&column.name, raw))
                .collect();

            match row {
                Ok(row) => loaded.rows.push(row),
                Err(e) => {
                    log::debug!("Rejecting record {} of {}: {}", index, display_path, e);
                    loaded.rejected += 1;
                }
            }
        }

        log::debug!(
            "Loaded {} rows from {} ({} rejected)",
            loaded.rows.len(),
            display_path,
            loaded.rejected
        );
        Ok(loaded)
    }
}
