//! Tabular input: the [`Table`] the rest of the crate is built from, and the
//! [`TableSource`] seam through which a table is produced.
//!
//! [`CsvSource`] is the provided source. It reads a delimited file, infers a
//! [`ColumnType`] per column and converts every cell into a [`Value`].

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ErrorKind, ReaderBuilder, StringRecord};
use tracing::{debug, warn};

use crate::datatype::{ColumnType, DEFAULT_MISSING_MARKERS, Value};
use crate::error::{Result, SurveyGraphError};

// ------------- Table -------------
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Builds a table, checking that column names are unique and that every
    /// row carries exactly one value per column.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(SurveyGraphError::Schema {
                    message: format!("duplicate column '{}'", column),
                    row: None,
                });
            }
        }
        if let Some((row, values)) = rows
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != columns.len())
        {
            return Err(SurveyGraphError::Schema {
                message: format!(
                    "row {} has {} values but {} columns are declared",
                    row + 1,
                    values.len(),
                    columns.len()
                ),
                row: Some(row + 1),
            });
        }
        Ok(Self { columns, rows })
    }
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
    pub fn len(&self) -> usize {
        self.rows.len()
    }
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ------------- TableSource -------------
/// Anything that can yield ordered columns and ordered rows of scalars.
pub trait TableSource {
    /// Where the table came from, typically a file path.
    fn identifier(&self) -> &str;
    fn read_table(self) -> Result<Table>;
}

/// Options controlling how delimited text becomes a [`Table`].
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub delimiter: u8,
    pub infer_types: bool,
    pub missing_markers: Vec<String>,
}
impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            infer_types: true,
            missing_markers: DEFAULT_MISSING_MARKERS.iter().map(|m| m.to_string()).collect(),
        }
    }
}

// ------------- CsvSource -------------
pub struct CsvSource<R> {
    identifier: String,
    reader: R,
    options: LoadOptions,
}

impl CsvSource<File> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Ok(Self::from_reader(path.to_string_lossy(), file))
    }
}

impl<R: Read> CsvSource<R> {
    pub fn from_reader<S: Into<String>>(identifier: S, reader: R) -> Self {
        Self {
            identifier: identifier.into(),
            reader,
            options: LoadOptions::default(),
        }
    }
    pub fn with_options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }
}

fn format_error(e: csv::Error) -> SurveyGraphError {
    SurveyGraphError::Format(e.to_string())
}

// Pandas-style renaming: a repeat of `Q` becomes `Q.1`, and a name that is
// already taken gets its own suffix chained on, so `Q,Q,Q.1` reads `Q,Q.1,Q.1.1`.
fn unique_headers(headers: &StringRecord) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut columns = Vec::with_capacity(headers.len());
    for name in headers.iter() {
        let mut column = name.to_owned();
        let mut count = counts.get(&column).copied().unwrap_or(0);
        while count > 0 {
            counts.insert(column.clone(), count + 1);
            column = format!("{}.{}", column, count);
            count = counts.get(&column).copied().unwrap_or(0);
        }
        if column != name {
            warn!(column = name, renamed = %column, "duplicate header renamed");
        }
        counts.insert(column.clone(), count + 1);
        columns.push(column);
    }
    columns
}

impl<R: Read> TableSource for CsvSource<R> {
    fn identifier(&self) -> &str {
        &self.identifier
    }
    fn read_table(self) -> Result<Table> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.options.delimiter)
            .has_headers(true)
            .flexible(false)
            .from_reader(self.reader);
        let headers = reader.headers().map_err(format_error)?.clone();
        if headers.is_empty() {
            return Err(SurveyGraphError::Format(format!(
                "{} has no header row",
                self.identifier
            )));
        }
        let columns = unique_headers(&headers);

        let mut raw: Vec<StringRecord> = Vec::new();
        for (row, record) in reader.records().enumerate() {
            match record {
                Ok(record) => raw.push(record),
                Err(e) => {
                    if let ErrorKind::UnequalLengths { expected_len, len, .. } = e.kind() {
                        return Err(SurveyGraphError::Schema {
                            message: format!(
                                "row {} has {} fields but the header has {}",
                                row + 1,
                                len,
                                expected_len
                            ),
                            row: Some(row + 1),
                        });
                    }
                    return Err(format_error(e));
                }
            }
        }

        let missing: &[String] = &self.options.missing_markers;
        let types: Vec<ColumnType> = (0..columns.len())
            .map(|c| {
                if self.options.infer_types {
                    ColumnType::infer(raw.iter().map(|r| r.get(c).unwrap_or("")), missing)
                } else {
                    ColumnType::Text
                }
            })
            .collect();
        debug!(source = %self.identifier, ?types, "column types inferred");

        let rows = raw
            .iter()
            .map(|record| {
                types
                    .iter()
                    .enumerate()
                    .map(|(c, t)| t.convert(record.get(c).unwrap_or(""), missing))
                    .collect()
            })
            .collect();
        Table::new(columns, rows)
    }
}
