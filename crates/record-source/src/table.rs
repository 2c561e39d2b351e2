//! Immutable parsed CSV tables.

use crate::CsvSettings;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Error type for record-source operations.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Error reading the source file
    #[error("failed to read record source: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing CSV data
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Sequential reader consumed all rows
    #[error("record source exhausted after {rows} rows")]
    Exhausted { rows: usize },

    /// The table holds no rows but the reader requires at least one
    #[error("record source is empty")]
    EmptyTable,

    /// Weight column does not exist in the table
    #[error("weight column '{0}' not found")]
    MissingColumn(String),

    /// Weight cell is not a non-negative number
    #[error("row {row}: weight column '{column}' holds non-numeric value '{value}'")]
    BadWeight {
        row: usize,
        column: String,
        value: String,
    },

    /// All weights in the column sum to zero
    #[error("weight column '{0}' sums to zero")]
    ZeroWeightSum(String),
}

/// An immutable parsed CSV table: headers plus rows of string fields.
///
/// The table is shared read-only by all reader variants; readers hold
/// per-reader cursors, never a copy of the data.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RecordTable {
    /// Parse a table from any reader using the given settings.
    pub fn from_reader<R: Read>(reader: R, settings: &CsvSettings) -> Result<Self, SourceError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(settings.has_headers)
            .delimiter(settings.delimiter)
            .quote(settings.quote)
            .comment(settings.comment)
            .escape(settings.escape)
            .from_reader(reader);

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            rows.push(record.iter().map(|f| f.to_string()).collect());
        }

        let headers = if settings.has_headers {
            csv_reader
                .headers()?
                .iter()
                .map(|h| h.to_string())
                .collect()
        } else if let Some(ref names) = settings.column_names {
            names.clone()
        } else {
            // Synthesize column names from the widest row
            let width = rows.iter().map(Vec::len).max().unwrap_or(0);
            (0..width).map(|i| format!("column_{i}")).collect()
        };

        debug!(
            rows = rows.len(),
            columns = headers.len(),
            "parsed record table"
        );

        Ok(Self { headers, rows })
    }

    /// Parse a table from a file path.
    pub fn from_path<P: AsRef<Path>>(path: P, settings: &CsvSettings) -> Result<Self, SourceError> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(file, settings)
    }

    /// Column names, in file order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table holds no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Raw fields of row `index`.
    pub fn row(&self, index: usize) -> &[String] {
        &self.rows[index]
    }

    /// Row `index` as `(column, field)` pairs in column order.
    ///
    /// Rows narrower than the header set simply yield fewer pairs.
    pub fn record(&self, index: usize) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .zip(self.rows[index].iter())
            .map(|(h, f)| (h.as_str(), f.as_str()))
    }

    /// Index of the named column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}
