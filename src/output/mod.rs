//! Output module for writing tables and run summaries
//!
//! This module handles:
//! - Writing the assembled tables as CSV files
//! - Counting what a run did and rendering it as markdown

mod csv_sink;
mod markdown;
pub mod stats;
mod traits;

pub use csv_sink::{read_table, CsvSink};
pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{PageFailure, RunSummary};
pub use traits::{OutputError, OutputResult, TableSink, TableWritten, WriteReport};

pub use crate::schema::LOAD_ORDER;
