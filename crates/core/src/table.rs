//! Whole-file CSV tables: header plus rows, read once and written atomically.

use crate::error::{PipelineError, Result};
use crate::models::{
    Record, CATEGORY_COLUMN, CONFIDENCE_COLUMN, NAME_COLUMN, PREDICTED_COLUMN,
};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::warn;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Rows that carried more fields than the header. The extra fields are
    /// not written back out.
    pub truncated_rows: usize,
}

impl Table {
    pub fn read(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(PipelineError::InputNotFound {
                path: path.to_path_buf(),
            });
        }
        let bytes = fs::read(path)?;
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes[..]);
        let content = match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => {
                warn!(path = %path.display(), "input is not valid UTF-8, decoding lossily");
                String::from_utf8_lossy(bytes).into_owned()
            }
        };
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let width = headers.len();

        let mut rows = Vec::new();
        let mut truncated_rows = 0;
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            if row.len() > width {
                warn!(row = idx + 1, fields = row.len(), width, "dropping fields beyond header");
                truncated_rows += 1;
            }
            row.resize(width, String::new());
            rows.push(row);
        }
        Ok(Self {
            headers,
            rows,
            truncated_rows,
        })
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Index of `name`, appending an empty column if the header lacks it.
    /// Re-running a stage on its own output reuses the existing column.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column(name) {
            return idx;
        }
        self.headers.push(name.to_string());
        for row in &mut self.rows {
            row.push(String::new());
        }
        self.headers.len() - 1
    }

    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer
            .into_inner()
            .map_err(|e| PipelineError::Io(e.into_error()))
    }

    /// Writes through a temp file in the destination directory, so a failure
    /// never leaves a partial file at `path`.
    pub fn write_atomic(&self, path: &Path) -> Result<()> {
        let bytes = self.to_csv_bytes()?;
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.flush()?;
        tmp.persist(path).map_err(|e| PipelineError::Io(e.error))?;
        Ok(())
    }
}

/// Positions of the columns the audit and clean stages read.
#[derive(Debug, Clone, Copy)]
pub struct RecordColumns {
    name: Option<usize>,
    category: Option<usize>,
    predicted: Option<usize>,
    confidence: Option<usize>,
}

impl RecordColumns {
    /// Missing columns are tolerated and read as empty values.
    pub fn resolve(table: &Table) -> Self {
        let find = |name: &str| {
            let idx = table.column(name);
            if idx.is_none() {
                warn!(column = name, "column missing from input, reading as empty");
            }
            idx
        };
        Self {
            name: find(NAME_COLUMN),
            category: find(CATEGORY_COLUMN),
            predicted: find(PREDICTED_COLUMN),
            confidence: find(CONFIDENCE_COLUMN),
        }
    }

    pub fn record(&self, row: &[String]) -> Record {
        let field = |idx: Option<usize>| idx.and_then(|i| row.get(i)).map(String::as_str);
        Record::from_fields(
            field(self.name),
            field(self.category),
            field(self.predicted),
            field(self.confidence),
        )
    }
}
