//! Output sink traits and error types
//!
//! This module defines the trait interface for table sinks and the report
//! they return after a write.

use crate::schema::Tables;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unexpected header in {table}: expected {expected:?}, found {found:?}")]
    Header {
        table: String,
        expected: Vec<String>,
        found: Vec<String>,
    },
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// One table written by a sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableWritten {
    /// Table name
    pub name: &'static str,

    /// Where the rows went
    pub path: PathBuf,

    /// Data rows written, excluding the header
    pub rows: usize,
}

/// What a sink wrote in one call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    pub tables: Vec<TableWritten>,
}

impl WriteReport {
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|t| t.rows).sum()
    }

    pub fn rows_for(&self, name: &str) -> Option<usize> {
        self.tables.iter().find(|t| t.name == name).map(|t| t.rows)
    }
}

/// Destination for assembled tables
///
/// A sink may be called several times during a run; each call replaces
/// what the previous call wrote.
pub trait TableSink {
    /// Writes every table
    ///
    /// # Arguments
    ///
    /// * `tables` - Rows that already passed the integrity check
    ///
    /// # Returns
    ///
    /// The tables written, in load order
    fn write_tables(&mut self, tables: &Tables) -> OutputResult<WriteReport>;
}

/// Lets a caller keep ownership of the sink it hands to a run
impl<T: TableSink + ?Sized> TableSink for &mut T {
    fn write_tables(&mut self, tables: &Tables) -> OutputResult<WriteReport> {
        (**self).write_tables(tables)
    }
}
