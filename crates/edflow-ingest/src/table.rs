//! Header-addressed CSV tables.

use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::error::{IngestError, Result};

/// A CSV file read fully into memory, with column lookup by header name.
#[derive(Debug, Clone)]
pub struct CsvTable {
    path: PathBuf,
    headers: Vec<String>,
    records: Vec<StringRecord>,
}

impl CsvTable {
    /// Read a CSV file with a header row.
    ///
    /// Handles a UTF-8 BOM on the first header and trims whitespace from all
    /// fields.
    pub fn read(path: &Path) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_path(path)
            .map_err(|error| IngestError::open(path, error))?;

        let headers = reader
            .headers()
            .map_err(|error| IngestError::open(path, error))?
            .iter()
            .map(|header| header.trim_matches('\u{feff}').trim().to_string())
            .collect();

        let mut records = Vec::new();
        for record in reader.records() {
            records.push(record.map_err(|error| IngestError::open(path, error))?);
        }
        Ok(Self {
            path: path.to_path_buf(),
            headers,
            records,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[StringRecord] {
        &self.records
    }

    /// Index of the first header matching one of `names`, case-insensitively.
    pub fn find_column(&self, names: &[&str]) -> Option<usize> {
        names.iter().find_map(|name| {
            self.headers
                .iter()
                .position(|header| header.eq_ignore_ascii_case(name))
        })
    }

    /// Like [`find_column`](Self::find_column), but a miss is an error.
    pub fn require_column(&self, names: &[&str]) -> Result<usize> {
        self.find_column(names)
            .ok_or_else(|| IngestError::MissingColumn {
                column: names.first().copied().unwrap_or_default().to_string(),
                path: self.path.clone(),
            })
    }
}

/// Field value, or `None` when absent or blank.
pub fn field(record: &StringRecord, index: usize) -> Option<String> {
    record
        .get(index)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Optional column value; `None` when the column itself is absent.
pub fn optional_field(record: &StringRecord, index: Option<usize>) -> Option<String> {
    index.and_then(|index| field(record, index))
}
