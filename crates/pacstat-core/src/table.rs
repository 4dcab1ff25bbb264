//! Delimited text tables with header-driven column order.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim, WriterBuilder};
use log::debug;

use crate::cell::Cell;
use crate::errors::{ErrorInfo, PacError};

/// One row of a [`Table`], keyed by column name.
pub type Record = BTreeMap<String, Cell>;

/// In-memory delimited table with an ordered header.
///
/// The header drives both the positional zip on load and the column order
/// on save. Records are expected to cover every header column; the merge
/// and gain stages fill gaps with [`Cell::Missing`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    name: String,
    headers: Vec<String>,
    records: Vec<Record>,
}

impl Table {
    /// Creates an empty table with the given source label and header.
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            headers,
            records: Vec::new(),
        }
    }

    /// Source label, e.g. `Basic` or `DPS`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ordered column names.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Records in insertion order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Mutable access to the records; the header is left untouched.
    pub fn records_mut(&mut self) -> &mut [Record] {
        &mut self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether `column` is part of the header.
    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|header| header == column)
    }

    /// Appends a fully formed record. Key coverage is the caller's responsibility.
    pub fn append(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Adds `column` to the header unless it is already present.
    pub fn push_header(&mut self, column: impl Into<String>) {
        let column = column.into();
        if !self.has_column(&column) {
            self.headers.push(column);
        }
    }

    /// Loads a table from a comma separated file whose first line is the header.
    pub fn load(name: impl Into<String>, path: impl AsRef<Path>) -> Result<Self, PacError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| PacError::io("table-open", path, &err))?;
        let table = Self::from_reader(name, file).map_err(|err| with_source_path(err, path))?;
        debug!(
            "loaded {} records with {} columns from {}",
            table.len(),
            table.headers.len(),
            path.display()
        );
        Ok(table)
    }

    /// Parses delimited text from any reader.
    pub fn from_reader<R: Read>(name: impl Into<String>, reader: R) -> Result<Self, PacError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);
        let mut rows = reader.records();
        let header_row = match rows.next() {
            Some(row) => row.map_err(|err| wrap_csv("table-header", err))?,
            None => {
                return Err(PacError::Format(ErrorInfo::new(
                    "table-empty",
                    "input has no header line",
                )))
            }
        };
        let headers: Vec<String> = header_row.iter().map(|field| field.to_string()).collect();
        let mut seen = BTreeSet::new();
        for header in &headers {
            if !seen.insert(header.as_str()) {
                return Err(PacError::Format(
                    ErrorInfo::new("table-duplicate-column", "header repeats a column name")
                        .with_context("column", header.clone()),
                ));
            }
        }

        let mut table = Self::new(name, headers);
        for row in rows {
            let row = row.map_err(|err| wrap_csv("table-record", err))?;
            if row.len() != table.headers.len() {
                let line = row
                    .position()
                    .map(|pos| pos.line().to_string())
                    .unwrap_or_else(|| "?".to_string());
                return Err(PacError::Format(
                    ErrorInfo::new("table-field-count", "field count does not match header")
                        .with_context("line", line)
                        .with_context("expected", table.headers.len().to_string())
                        .with_context("found", row.len().to_string()),
                ));
            }
            let record = table
                .headers
                .iter()
                .zip(row.iter())
                .map(|(header, field)| (header.clone(), Cell::from_field(field)))
                .collect();
            table.records.push(record);
        }
        Ok(table)
    }

    /// Writes the table to `path`.
    ///
    /// Output goes to a sibling temporary file that is renamed into place,
    /// so a failed save never leaves a truncated table behind.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PacError> {
        let path = path.as_ref();
        ensure_parent(path)?;
        let staging = staging_path(path);
        let result = File::create(&staging)
            .map_err(|err| PacError::io("table-create", path, &err))
            .and_then(|file| {
                let mut writer = BufWriter::new(file);
                self.to_writer(&mut writer)
                    .map_err(|err| with_source_path(err, path))?;
                writer
                    .flush()
                    .map_err(|err| PacError::io("table-flush", path, &err))
            })
            .and_then(|()| {
                fs::rename(&staging, path).map_err(|err| PacError::io("table-rename", path, &err))
            });
        if result.is_err() {
            let _ = fs::remove_file(&staging);
        }
        result?;
        debug!("saved {} records to {}", self.len(), path.display());
        Ok(())
    }

    /// Serializes the header line and every record in header order.
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), PacError> {
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);
        writer
            .write_record(&self.headers)
            .map_err(|err| wrap_csv("table-write-header", err))?;
        for record in &self.records {
            let fields = self.headers.iter().map(|header| {
                record
                    .get(header)
                    .map(ToString::to_string)
                    .unwrap_or_else(|| Cell::Missing.to_string())
            });
            writer
                .write_record(fields)
                .map_err(|err| wrap_csv("table-write-row", err))?;
        }
        writer
            .flush()
            .map_err(|err| wrap_csv("table-flush", err.into()))?;
        Ok(())
    }
}

/// Ordered union of every table's header followed by `extra` columns.
///
/// First appearance wins, so the result is stable for a fixed input order.
pub fn union_headers(tables: &[Table], extra: &[&str]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    let columns = tables
        .iter()
        .flat_map(|table| table.headers.iter().map(String::as_str))
        .chain(extra.iter().copied());
    for column in columns {
        if !headers.iter().any(|existing| existing == column) {
            headers.push(column.to_string());
        }
    }
    headers
}

fn staging_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "table".to_string());
    path.with_file_name(format!(".{file_name}.tmp"))
}

fn ensure_parent(path: &Path) -> Result<(), PacError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|err| PacError::io("table-create-dir", parent, &err))?;
        }
    }
    Ok(())
}

fn with_source_path(err: PacError, path: &Path) -> PacError {
    let attach = |info: ErrorInfo| info.with_path(path);
    match err {
        PacError::Format(info) => PacError::Format(attach(info)),
        PacError::Schema(info) => PacError::Schema(attach(info)),
        PacError::Division(info) => PacError::Division(attach(info)),
        PacError::Io(info) => PacError::Io(attach(info)),
        PacError::Config(info) => PacError::Config(attach(info)),
    }
}

fn wrap_csv(code: &str, err: csv::Error) -> PacError {
    if err.is_io_error() {
        PacError::Io(ErrorInfo::new(code, "delimited IO failure").with_hint(err.to_string()))
    } else {
        PacError::Format(ErrorInfo::new(code, "malformed delimited text").with_hint(err.to_string()))
    }
}
