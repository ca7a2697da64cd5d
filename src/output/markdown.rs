//! Markdown summary generation
//!
//! This module renders a [`RunSummary`] as a human-readable markdown file
//! next to the CSV tables.

use crate::output::stats::RunSummary;
use crate::output::traits::OutputResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Failures listed individually before the rest are elided
const MAX_LISTED_FAILURES: usize = 50;

/// Writes the markdown summary of a run
///
/// # Arguments
///
/// * `summary` - The run summary data
/// * `output_path` - Path where the markdown file should be written
pub fn generate_markdown_summary(summary: &RunSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a run summary as markdown
pub fn format_markdown_summary(summary: &RunSummary) -> String {
    let mut md = String::new();

    md.push_str("# Oscar-Ledger Run Summary\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Started**: {}\n", summary.started_at.to_rfc3339()));
    if let Some(finished) = &summary.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished.to_rfc3339()));
    }
    if let Some(duration) = summary.duration_seconds() {
        md.push_str(&format!(
            "- **Duration**: {} seconds ({:.2} minutes)\n",
            duration,
            duration as f64 / 60.0
        ));
    }
    md.push_str(&format!("- **Config Hash**: {}\n\n", summary.config_hash));

    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Total Pages**: {}\n", summary.total_pages()));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n",
        summary.success_rate()
    ));
    md.push_str(&format!(
        "- **Nominations Parsed**: {}\n",
        summary.nominations_parsed
    ));
    md.push_str(&format!(
        "- **Rows Skipped**: {}\n",
        summary.total_skipped_rows()
    ));
    md.push_str(&format!(
        "- **Film Titles Rejected**: {}\n",
        summary.rejected_titles
    ));
    md.push_str(&format!(
        "- **Person Names Rejected**: {}\n",
        summary.rejected_names
    ));
    md.push_str(&format!(
        "- **Category Fallbacks**: {}\n",
        summary.category_fallbacks
    ));
    md.push_str(&format!("- **Intermediate Flushes**: {}\n\n", summary.flushes));

    if !summary.pages_by_kind.is_empty() {
        md.push_str("## Pages by Kind\n\n");
        md.push_str("| Kind | Pages |\n");
        md.push_str("|------|-------|\n");
        for (kind, count) in &summary.pages_by_kind {
            md.push_str(&format!("| {} | {} |\n", kind, count));
        }
        md.push('\n');
    }

    md.push_str("## Page State Breakdown\n\n");
    md.push_str("| State | Count |\n");
    md.push_str("|-------|-------|\n");
    for (state, count) in &summary.pages_by_state {
        md.push_str(&format!("| {} | {} |\n", state.label(), count));
    }
    md.push('\n');

    if !summary.skipped_rows.is_empty() {
        md.push_str("## Skipped Rows\n\n");
        md.push_str("| Reason | Rows |\n");
        md.push_str("|--------|------|\n");
        for (reason, count) in &summary.skipped_rows {
            md.push_str(&format!("| {} | {} |\n", reason, count));
        }
        md.push('\n');
    }

    if !summary.row_counts.is_empty() {
        md.push_str("## Tables\n\n");
        md.push_str("| Table | Rows | Dropped |\n");
        md.push_str("|-------|------|---------|\n");
        for (table, rows) in &summary.row_counts {
            let dropped = summary.integrity_drops.get(table).copied().unwrap_or(0);
            md.push_str(&format!("| {} | {} | {} |\n", table, rows, dropped));
        }
        md.push('\n');
    }

    if !summary.empty_categories.is_empty() {
        md.push_str("## Categories Without Entries\n\n");
        for category in &summary.empty_categories {
            md.push_str(&format!("- {}\n", category));
        }
        md.push('\n');
    }

    if !summary.failures.is_empty() {
        md.push_str("## Failed Pages\n\n");
        md.push_str("| URL | State | Error |\n");
        md.push_str("|-----|-------|-------|\n");
        for failure in summary.failures.iter().take(MAX_LISTED_FAILURES) {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                failure.url,
                failure.state.label(),
                failure.message.replace('|', "\\|")
            ));
        }
        if summary.failures.len() > MAX_LISTED_FAILURES {
            md.push_str(&format!(
                "\n... and {} more\n",
                summary.failures.len() - MAX_LISTED_FAILURES
            ));
        }
        md.push('\n');
    }

    md
}
