//! Ad-hoc query interpretation for the patient table.
//!
//! Pipeline: trim input → classify against a closed set of shapes →
//! dispatch a parameterized statement. Everything outside the allow-list is
//! rejected; user-supplied literals are always bound parameters and the
//! identifiers in emitted SQL come only from static allow-lists.

mod interpreter;

pub use interpreter::*;

use thiserror::Error;

/// Columns the interpreter may select or filter on.
pub const VALID_COLUMNS: [&str; 5] = ["id", "name", "age", "gender", "phone_number"];

/// Query interpreter errors.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("{0}")]
    Unsupported(String),

    #[error("Invalid column(s): {}. Valid columns are: {}", .invalid.join(", "), VALID_COLUMNS.join(", "))]
    InvalidColumn { invalid: Vec<String> },
}

pub type QueryResult<T> = Result<T, QueryError>;

/// A single result cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Int(i64),
    Real(f64),
    Text(String),
}

impl Cell {
    /// Printable form; `None` for SQL NULL so the caller picks a placeholder.
    pub fn render(&self) -> Option<String> {
        match self {
            Cell::Null => None,
            Cell::Int(v) => Some(v.to_string()),
            Cell::Real(v) => Some(v.to_string()),
            Cell::Text(v) => Some(v.clone()),
        }
    }
}

impl From<rusqlite::types::ValueRef<'_>> for Cell {
    fn from(value: rusqlite::types::ValueRef<'_>) -> Self {
        use rusqlite::types::ValueRef;
        match value {
            ValueRef::Null => Cell::Null,
            ValueRef::Integer(v) => Cell::Int(v),
            ValueRef::Real(v) => Cell::Real(v),
            ValueRef::Text(v) => Cell::Text(String::from_utf8_lossy(v).into_owned()),
            // the patient schema has no blob columns
            ValueRef::Blob(_) => Cell::Null,
        }
    }
}

/// An executed query: ordered column names plus row cells in column order.
/// Zero rows yield an empty column list, matching the behavior of taking
/// column names from the first row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}
