//! Run statistics
//!
//! Counters collected while a scrape runs, and their log rendering.

use crate::extract::RowError;
use crate::schema::{IntegrityReport, Tables};
use crate::state::PageState;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// A page that did not contribute to the tables
#[derive(Debug, Clone, PartialEq)]
pub struct PageFailure {
    pub url: String,
    pub state: PageState,
    pub message: String,
}

/// Everything a run counted
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub config_hash: String,

    /// Final state of every page, by state
    pub pages_by_state: BTreeMap<PageState, u64>,

    /// Pages fetched, by page kind
    pub pages_by_kind: BTreeMap<&'static str, u64>,

    pub failures: Vec<PageFailure>,

    /// Skipped table rows, by reason
    pub skipped_rows: BTreeMap<&'static str, u64>,

    pub nominations_parsed: u64,

    /// Entries whose film title had no usable text after parsing
    pub rejected_titles: u64,

    /// Placeholder or empty person names that were not recorded
    pub rejected_names: u64,

    /// Times a category moved on to its next listing URL
    pub category_fallbacks: u64,

    /// Categories for which no URL yielded entries
    pub empty_categories: Vec<String>,

    /// Rows per table at the last write, in load order
    pub row_counts: Vec<(&'static str, usize)>,

    /// Rows dropped by the integrity check, by table
    pub integrity_drops: BTreeMap<&'static str, usize>,

    /// Intermediate writes before the final one
    pub flushes: u64,
}

impl RunSummary {
    pub fn new(config_hash: impl Into<String>) -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            config_hash: config_hash.into(),
            pages_by_state: BTreeMap::new(),
            pages_by_kind: BTreeMap::new(),
            failures: Vec::new(),
            skipped_rows: BTreeMap::new(),
            nominations_parsed: 0,
            rejected_titles: 0,
            rejected_names: 0,
            category_fallbacks: 0,
            empty_categories: Vec::new(),
            row_counts: Vec::new(),
            integrity_drops: BTreeMap::new(),
            flushes: 0,
        }
    }

    /// Records the terminal state of one page
    pub fn record_page(&mut self, kind: &'static str, state: PageState) {
        *self.pages_by_state.entry(state).or_insert(0) += 1;
        *self.pages_by_kind.entry(kind).or_insert(0) += 1;
    }

    pub fn record_failure(&mut self, url: &str, state: PageState, message: impl Into<String>) {
        self.failures.push(PageFailure {
            url: url.to_string(),
            state,
            message: message.into(),
        });
    }

    pub fn record_skipped_rows(&mut self, skipped: &[RowError]) {
        for error in skipped {
            *self.skipped_rows.entry(error.reason()).or_insert(0) += 1;
        }
    }

    /// Stores the final table sizes and integrity drops
    pub fn finish(&mut self, tables: &Tables, integrity: &IntegrityReport) {
        self.finished_at = Some(Utc::now());
        self.row_counts = tables.row_counts();
        self.integrity_drops = integrity.by_table();
    }

    pub fn total_pages(&self) -> u64 {
        self.pages_by_state.values().sum()
    }

    pub fn pages_in(&self, state: PageState) -> u64 {
        self.pages_by_state.get(&state).copied().unwrap_or(0)
    }

    pub fn total_skipped_rows(&self) -> u64 {
        self.skipped_rows.values().sum()
    }

    /// Processed pages as a percentage of all pages
    pub fn success_rate(&self) -> f64 {
        let total = self.total_pages();
        if total == 0 {
            return 0.0;
        }
        (self.pages_in(PageState::Processed) as f64 / total as f64) * 100.0
    }

    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    /// Writes the summary to the log
    pub fn log(&self) {
        tracing::info!(
            "Run finished: {} pages ({:.1}% processed), {} nominations parsed, {} rows skipped",
            self.total_pages(),
            self.success_rate(),
            self.nominations_parsed,
            self.total_skipped_rows()
        );
        if self.rejected_titles > 0 || self.rejected_names > 0 {
            tracing::warn!(
                "Rejected {} film titles and {} person names",
                self.rejected_titles,
                self.rejected_names
            );
        }

        for (state, count) in &self.pages_by_state {
            if state.is_error() {
                tracing::warn!("  {}: {}", state.label(), count);
            } else {
                tracing::info!("  {}: {}", state.label(), count);
            }
        }

        for (reason, count) in &self.skipped_rows {
            tracing::info!("  skipped rows ({}): {}", reason, count);
        }

        for (table, count) in &self.integrity_drops {
            tracing::warn!("  {} rows dropped from {}", count, table);
        }

        for category in &self.empty_categories {
            tracing::warn!("  no entries found for category {}", category);
        }

        for (table, rows) in &self.row_counts {
            tracing::debug!("  {}: {} rows", table, rows);
        }
    }
}
