//! Row/column access to tabular payloads.
//!
//! [`TableSource`] is the contract the catalog pipeline consumes: ordered
//! column names, row-indexed field access by position or name, and a stable
//! sort by a named column. [`Table`] is the in-memory implementation that
//! [`BinaryTable`] decodes into.

mod binary;

pub use binary::{BinaryTable, ColumnFormat};

use crate::{FitsError, Result};
use std::cmp::Ordering;
use std::fmt;

/// A single decoded table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl FieldValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Bool(_) => 0,
            Self::Int(_) | Self::Float(_) => 1,
            Self::String(_) => 2,
        }
    }

    /// Total ascending order. Numbers compare numerically across Int and
    /// Float; mixed kinds order Bool < number < String.
    pub fn ascending(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::String(a), Self::String(b)) => a.cmp(b),
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                _ => self.rank().cmp(&other.rank()),
            },
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
        }
    }
}

pub trait TableSource {
    fn column_names(&self) -> &[String];

    fn num_rows(&self) -> usize;

    fn field(&self, row: usize, column: usize) -> Option<&FieldValue>;

    /// Stable ascending sort of all rows by the named column.
    fn sort_by_column(&mut self, name: &str) -> Result<()>;

    /// Exact name match first, then a case-insensitive one.
    fn column_index(&self, name: &str) -> Option<usize> {
        let names = self.column_names();
        names
            .iter()
            .position(|n| n == name)
            .or_else(|| names.iter().position(|n| n.eq_ignore_ascii_case(name)))
    }

    fn field_by_name(&self, row: usize, name: &str) -> Option<&FieldValue> {
        self.field(row, self.column_index(name)?)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<FieldValue>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<FieldValue>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(FitsError::InvalidFormat(format!(
                "row has {} fields, table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn row(&self, index: usize) -> Option<&[FieldValue]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[FieldValue]> {
        self.rows.iter().map(Vec::as_slice)
    }
}

impl TableSource for Table {
    fn column_names(&self) -> &[String] {
        &self.columns
    }

    fn num_rows(&self) -> usize {
        self.rows.len()
    }

    fn field(&self, row: usize, column: usize) -> Option<&FieldValue> {
        self.rows.get(row)?.get(column)
    }

    fn sort_by_column(&mut self, name: &str) -> Result<()> {
        let column = self
            .column_index(name)
            .ok_or_else(|| FitsError::ColumnNotFound(name.to_string()))?;
        self.rows
            .sort_by(|a, b| a[column].ascending(&b[column]));
        Ok(())
    }
}
