use std::collections::BTreeSet;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::DatasetError;

// ---------------------------------------------------------------------------
// Cell – a single typed value from a row
// ---------------------------------------------------------------------------

/// A cell is numeric when its raw text parses as a finite float, text otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Numeric(f64),
    Text(String),
}

impl Cell {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Numeric(v) => Some(*v),
            Cell::Text(_) => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Numeric(v) => write!(f, "{v}"),
            Cell::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Raw cells exactly as the loader read them.
pub type RawRow = Vec<String>;

/// One row after the row parser has typed every cell.
pub type TypedRow = Vec<Cell>;

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// An immutable, rectangular table. Replaced wholesale by a new load.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<RawRow>,
}

impl Dataset {
    /// Build a dataset, rejecting ragged rows and repeated column names.
    pub fn new(columns: Vec<String>, rows: Vec<RawRow>) -> Result<Self, DatasetError> {
        let mut seen = BTreeSet::new();
        for col in &columns {
            if !seen.insert(col.as_str()) {
                return Err(DatasetError::DuplicateColumn(col.clone()));
            }
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(DatasetError::RaggedRow {
                    row: i,
                    expected: columns.len(),
                    found: row.len(),
                });
            }
        }
        Ok(Dataset { columns, rows })
    }

    /// A header with no rows.
    pub fn empty(columns: Vec<String>) -> Self {
        Dataset {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row(&self, index: usize) -> Option<&RawRow> {
        self.rows.get(index)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Record – one emitted tick
// ---------------------------------------------------------------------------

/// Column name → value pairs in header order, built once per tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    fields: Vec<(String, Cell)>,
}

impl Record {
    /// Zip column names with values. Both sides are header-aligned.
    pub fn new(columns: &[String], values: Vec<Cell>) -> Self {
        let fields = columns.iter().cloned().zip(values).collect();
        Record { fields }
    }

    pub fn fields(&self) -> &[(String, Cell)] {
        &self.fields
    }

    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, cell)| cell)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Serialises as a JSON object whose keys keep header order.
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, cell) in &self.fields {
            map.serialize_entry(name, cell)?;
        }
        map.end()
    }
}
