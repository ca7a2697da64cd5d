//! Scrape coordinator - main pipeline loop
//!
//! This module drives one run from start to finish:
//! - Seeding the work queue with ceremony and category pages
//! - Fetching pages one at a time and handing them to the parsers
//! - Feeding parsed data into the assembler and queueing linked pages
//! - Falling back to alternate category URLs
//! - Writing tables periodically and at the end, plus the run summary

use crate::config::Config;
use crate::crawler::fetcher::{Fetcher, PageSource};
use crate::crawler::ingest::{
    ingest_category_page, ingest_ceremony_page, ingest_movie_page, ingest_person_page,
};
use crate::crawler::scheduler::{PageKind, QueuedPage, WorkQueue};
use crate::extract::{
    ordinal, parse_category_page, parse_ceremony_page, parse_movie_page, parse_person_page,
    EditionCalendar,
};
use crate::output::{generate_markdown_summary, CsvSink, RunSummary, TableSink};
use crate::schema::{Assembler, IntegrityReport, Tables};
use crate::state::PageState;
use crate::url::normalize_url;
use crate::LedgerError;
use std::path::PathBuf;
use url::Url;

/// Main pipeline coordinator
///
/// Owns every piece of mutable state of a run: the work queue, the
/// assembler and the summary counters.
pub struct Coordinator<S: PageSource, K: TableSink> {
    config: Config,
    source: S,
    sink: K,
    calendar: EditionCalendar,
    assembler: Assembler,
    queue: WorkQueue,
    summary: RunSummary,
    /// Whether each configured category has produced entries yet
    category_found: Vec<bool>,
    pages_since_flush: u32,
}

impl<S: PageSource, K: TableSink> Coordinator<S, K> {
    /// Creates a coordinator over a page source and a table sink
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    /// * `config_hash` - Hash of the configuration file, for the summary
    /// * `source` - Where pages come from
    /// * `sink` - Where tables go
    pub fn new(config: Config, config_hash: impl Into<String>, source: S, sink: K) -> Self {
        let calendar = EditionCalendar::new(config.editions.first_year);
        let assembler = Assembler::new(calendar, config.editions.count);
        let category_found = vec![false; config.categories.len()];

        Self {
            config,
            source,
            sink,
            calendar,
            assembler,
            queue: WorkQueue::new(),
            summary: RunSummary::new(config_hash),
            category_found,
            pages_since_flush: 0,
        }
    }

    pub fn assembler(&self) -> &Assembler {
        &self.assembler
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Queues every ceremony page (when enabled) and the first URL of each
    /// category
    pub fn seed(&mut self) {
        if self.config.editions.fetch_ceremonies {
            for edition in 1..=self.config.editions.count {
                let raw = ceremony_url(&self.config.editions.ceremony_url_template, edition);
                match normalize_url(&raw) {
                    Ok(url) => {
                        self.queue.push(&url, PageKind::Ceremony { edition });
                    }
                    Err(e) => {
                        tracing::warn!("Skipping ceremony {}: {}", edition, e);
                        self.summary
                            .record_failure(&raw, PageState::InvalidUrl, e.to_string());
                    }
                }
            }
        }

        for index in 0..self.config.categories.len() {
            self.queue_category(index, 0);
        }

        tracing::info!("Seeded {} pages", self.queue.len());
    }

    /// Runs the pipeline until the queue is empty
    ///
    /// # Returns
    ///
    /// The run summary, also written as markdown next to the tables
    pub async fn run(mut self) -> Result<RunSummary, LedgerError> {
        self.seed();
        let started = std::time::Instant::now();
        let mut pages = 0u64;

        while let Some(page) = self.queue.pop() {
            self.process_page(page).await;
            pages += 1;

            if pages % 10 == 0 {
                tracing::info!(
                    "Progress: {}/{} pages processed, {} queued, {} nominations, {:.2} pages/sec",
                    pages,
                    self.queue.seen_count(),
                    self.queue.len(),
                    self.assembler.nomination_count(),
                    pages as f64 / started.elapsed().as_secs_f64().max(f64::EPSILON)
                );
            }

            self.pages_since_flush += 1;
            let flush_every = self.config.output.flush_every;
            if flush_every > 0 && self.pages_since_flush >= flush_every && !self.queue.is_empty() {
                self.write_snapshot()?;
                self.summary.flushes += 1;
                self.pages_since_flush = 0;
            }
        }

        tracing::info!("Queue is empty, writing final tables");
        let (tables, report) = self.write_snapshot()?;
        self.summary.rejected_names = self.assembler.rejected_names() as u64;
        self.summary.finish(&tables, &report);

        let summary_path = PathBuf::from(&self.config.output.directory)
            .join(&self.config.output.summary_file);
        generate_markdown_summary(&self.summary, &summary_path)?;
        tracing::info!("Summary written to {}", summary_path.display());

        self.summary.log();
        Ok(self.summary)
    }

    async fn process_page(&mut self, page: QueuedPage) {
        let kind = page.kind;
        tracing::debug!("Fetching {} page {}", kind.as_str(), page.url);

        match self.source.fetch(&page.url).await {
            Ok(html) => {
                self.summary.record_page(kind.as_str(), PageState::Processed);
                self.handle_page(&page.url, kind, &html);
            }
            Err(error) => {
                let state = error.page_state();
                tracing::warn!("Failed to fetch {}: {} ({})", page.url, error, state);
                self.summary.record_page(kind.as_str(), state);
                self.summary
                    .record_failure(page.url.as_str(), state, error.to_string());

                if let PageKind::Category { index, attempt } = kind {
                    self.queue_category(index, attempt + 1);
                }
            }
        }
    }

    fn handle_page(&mut self, url: &Url, kind: PageKind, html: &str) {
        match kind {
            PageKind::Ceremony { edition } => {
                let details = parse_ceremony_page(html);
                ingest_ceremony_page(&mut self.assembler, edition, &details);
            }
            PageKind::Category { index, attempt } => {
                self.handle_category(url, index, attempt, html);
            }
            PageKind::Movie { movie_id } => {
                let details = parse_movie_page(html, url);
                ingest_movie_page(&mut self.assembler, movie_id, &details);
            }
            PageKind::Person { person_id } => {
                let details = parse_person_page(html);
                ingest_person_page(&mut self.assembler, person_id, &details);
            }
        }
    }

    fn handle_category(&mut self, url: &Url, index: usize, attempt: usize, html: &str) {
        let Some(name) = self.config.categories.get(index).map(|c| c.name.clone()) else {
            return;
        };

        let page = parse_category_page(html, url, &self.calendar);
        self.summary.record_skipped_rows(&page.skipped);
        if !page.skipped.is_empty() {
            tracing::warn!("Skipped {} rows on {}", page.skipped_count(), url);
        }

        if page.is_empty() {
            tracing::warn!("No nominations found for {} on {}", name, url);
            self.queue_category(index, attempt + 1);
            return;
        }

        let outcome = ingest_category_page(&mut self.assembler, &name, &page);
        tracing::info!(
            "{}: {} nominations from {} tables",
            name,
            outcome.nominations,
            page.tables_read
        );
        self.summary.nominations_parsed += outcome.nominations as u64;
        if outcome.rejected > 0 {
            tracing::warn!("{}: {} entries had no usable film title", name, outcome.rejected);
            self.summary.rejected_titles += outcome.rejected as u64;
        }
        self.category_found[index] = true;

        for (movie_id, link) in &outcome.movie_links {
            self.queue.push(link, PageKind::Movie { movie_id: *movie_id });
        }
        for (person_id, link) in &outcome.person_links {
            self.queue.push(link, PageKind::Person { person_id: *person_id });
        }
    }

    /// Queues listing URL `attempt` of a category, or the next one that is
    /// usable; records the category as empty when none are left
    fn queue_category(&mut self, index: usize, attempt: usize) {
        let Some(category) = self.config.categories.get(index) else {
            return;
        };
        if self.category_found[index] {
            return;
        }

        for (next, raw) in category.urls.iter().enumerate().skip(attempt) {
            let url = match normalize_url(raw) {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!("Skipping URL {} for {}: {}", raw, category.name, e);
                    self.summary
                        .record_failure(raw, PageState::InvalidUrl, e.to_string());
                    continue;
                }
            };

            if self.queue.push(&url, PageKind::Category { index, attempt: next }) {
                if next > 0 {
                    tracing::info!("Trying fallback URL {} for {}", url, category.name);
                    self.summary.category_fallbacks += 1;
                }
                return;
            }
        }

        tracing::warn!("No listing URL of {} produced nominations", category.name);
        self.summary.empty_categories.push(category.name.clone());
    }

    fn write_snapshot(&mut self) -> Result<(Tables, IntegrityReport), LedgerError> {
        let (tables, report) = self.assembler.snapshot();
        let written = self.sink.write_tables(&tables)?;
        tracing::info!(
            "Wrote {} rows across {} tables ({} dropped)",
            written.total_rows(),
            written.tables.len(),
            report.violations.len()
        );
        Ok((tables, report))
    }
}

/// Ceremony page URL for an edition
pub fn ceremony_url(template: &str, edition: u32) -> String {
    template.replace("{ordinal}", &ordinal(edition))
}

/// Runs a complete scrape over HTTP, writing CSV tables
///
/// # Arguments
///
/// * `config` - Validated configuration
/// * `config_hash` - Hash of the configuration file
pub async fn run_scrape(config: Config, config_hash: String) -> Result<RunSummary, LedgerError> {
    let fetcher = Fetcher::from_config(&config.fetcher, &config.user_agent)?;
    let sink = CsvSink::from_config(&config.output)?;

    tracing::info!(
        "Scraping {} categories into {}",
        config.categories.len(),
        sink.directory().display()
    );

    Coordinator::new(config, config_hash, fetcher, sink).run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::crawler::FetchError;
    use crate::output::{OutputResult, WriteReport};
    use std::collections::HashMap;
    use tempfile::TempDir;

    /// Serves fixed markup by URL; everything else is a 404
    #[derive(Default)]
    struct FixturePages {
        pages: HashMap<String, String>,
        requested: Vec<String>,
    }

    impl FixturePages {
        fn with(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), html.to_string());
            self
        }
    }

    impl PageSource for FixturePages {
        async fn fetch(&mut self, url: &Url) -> Result<String, FetchError> {
            self.requested.push(url.to_string());
            self.pages
                .get(url.as_str())
                .cloned()
                .ok_or(FetchError::Status(404))
        }
    }

    #[derive(Default)]
    struct MemorySink {
        last: Option<Tables>,
        writes: usize,
    }

    impl TableSink for MemorySink {
        fn write_tables(&mut self, tables: &Tables) -> OutputResult<WriteReport> {
            self.last = Some(tables.clone());
            self.writes += 1;
            Ok(WriteReport::default())
        }
    }

    fn config(dir: &TempDir, extra: &str) -> Config {
        let toml = format!(
            r#"
[fetcher]
delay-ms = 100

[user-agent]
crawler-name = "TestScraper"
crawler-version = "1.0"
contact-url = "https://example.com/about"
contact-email = "admin@example.com"

[editions]
count = 96
fetch-ceremonies = false

[output]
directory = "{}"
flush-every = 0

{}
"#,
            dir.path().display(),
            extra
        );
        parse_config(&toml).unwrap()
    }

    const BEST_PICTURE: &str = r#"
        <table class="wikitable">
          <caption>1972 (45th)</caption>
          <tr><th>Film</th><th>Producer(s)</th></tr>
          <tr style="background:#FAEB86"><td><a href="/wiki/The_Godfather">The Godfather</a></td><td>Albert S. Ruddy</td></tr>
          <tr><td><a href="/wiki/Cabaret_(1972_film)">Cabaret</a></td><td>Cy Feuer</td></tr>
        </table>"#;

    const GODFATHER: &str = r#"
        <h1>The Godfather</h1>
        <table class="infobox"><tr><th>Running time</th><td>175 minutes</td></tr></table>"#;

    #[test]
    fn test_ceremony_url() {
        let template = "https://en.wikipedia.org/wiki/{ordinal}_Academy_Awards";
        assert_eq!(
            ceremony_url(template, 1),
            "https://en.wikipedia.org/wiki/1st_Academy_Awards"
        );
        assert_eq!(
            ceremony_url(template, 93),
            "https://en.wikipedia.org/wiki/93rd_Academy_Awards"
        );
    }

    #[tokio::test]
    async fn test_category_fallback_and_enrichment() {
        let dir = TempDir::new().unwrap();
        let config = config(
            &dir,
            r#"
[[category]]
name = "Best Picture"
urls = ["https://en.wikipedia.org/wiki/Missing_Page",
        "https://en.wikipedia.org/wiki/Academy_Award_for_Best_Picture"]
"#,
        );
        let pages = FixturePages::default()
            .with("https://en.wikipedia.org/wiki/Academy_Award_for_Best_Picture", BEST_PICTURE)
            .with("https://en.wikipedia.org/wiki/The_Godfather", GODFATHER);

        let coordinator = Coordinator::new(config, "hash", pages, MemorySink::default());
        let summary = coordinator.run().await.unwrap();

        assert_eq!(summary.category_fallbacks, 1);
        assert_eq!(summary.nominations_parsed, 2);
        assert_eq!(summary.pages_in(PageState::DeadLink), 2);
        assert!(summary.empty_categories.is_empty());
        assert!(dir.path().join("run_summary.md").exists());
    }

    #[tokio::test]
    async fn test_tables_written_at_end() {
        let dir = TempDir::new().unwrap();
        let config = config(
            &dir,
            r#"
[[category]]
name = "Best Picture"
urls = ["https://en.wikipedia.org/wiki/Academy_Award_for_Best_Picture"]
"#,
        );
        let pages = FixturePages::default()
            .with("https://en.wikipedia.org/wiki/Academy_Award_for_Best_Picture", BEST_PICTURE)
            .with("https://en.wikipedia.org/wiki/The_Godfather", GODFATHER);

        let mut coordinator = Coordinator::new(config, "hash", pages, MemorySink::default());
        coordinator.seed();
        while let Some(page) = coordinator.queue.pop() {
            coordinator.process_page(page).await;
        }
        coordinator.write_snapshot().unwrap();

        let requested = &coordinator.source().requested;
        assert_eq!(requested[0], "https://en.wikipedia.org/wiki/Academy_Award_for_Best_Picture");
        assert_eq!(requested.len(), 3);

        let tables = coordinator.sink().last.clone().unwrap();
        assert_eq!(coordinator.sink().writes, 1);
        assert_eq!(tables.movies.len(), 2);
        let godfather = tables
            .movies
            .iter()
            .find(|m| m.movie_name == "The Godfather")
            .unwrap();
        assert_eq!(godfather.run_time, Some(175));
        assert_eq!(tables.nominations.iter().filter(|n| n.won).count(), 1);
        assert!(tables.nominations.iter().all(|n| n.award_edition_id == 45));
    }

    #[tokio::test]
    async fn test_intermediate_flushes() {
        let dir = TempDir::new().unwrap();
        let mut config = config(
            &dir,
            r#"
[[category]]
name = "Best Picture"
urls = ["https://en.wikipedia.org/wiki/Academy_Award_for_Best_Picture"]
"#,
        );
        config.output.flush_every = 1;

        let listing = r#"
            <table class="wikitable">
              <caption>1972 (45th)</caption>
              <tr><th>Film</th><th>Producer(s)</th></tr>
              <tr style="background:#FAEB86"><td><a href="/wiki/The_Godfather">The Godfather</a></td><td>Albert S. Ruddy</td></tr>
              <tr><td><a href="/wiki/Cabaret_(1972_film)">Cabaret</a></td><td>TBA</td></tr>
            </table>"#;
        let pages = FixturePages::default()
            .with("https://en.wikipedia.org/wiki/Academy_Award_for_Best_Picture", listing)
            .with("https://en.wikipedia.org/wiki/The_Godfather", GODFATHER);

        let mut sink = MemorySink::default();
        let summary = Coordinator::new(config, "hash", pages, &mut sink)
            .run()
            .await
            .unwrap();

        // Category, The Godfather and Cabaret; no flush once the queue is empty
        assert_eq!(summary.total_pages(), 3);
        assert_eq!(summary.flushes, 2);
        assert_eq!(sink.writes, 3);
        assert_eq!(summary.rejected_names, 1);
        assert_eq!(summary.rejected_titles, 0);

        let tables = sink.last.unwrap();
        assert_eq!(tables.nominations.len(), 2);
        assert_eq!(tables.nomination_person.len(), 1);
    }

    #[tokio::test]
    async fn test_category_without_entries_is_reported() {
        let dir = TempDir::new().unwrap();
        let config = config(
            &dir,
            r#"
[[category]]
name = "Best Sound"
urls = ["https://en.wikipedia.org/wiki/Empty_Page"]
"#,
        );
        let pages = FixturePages::default()
            .with("https://en.wikipedia.org/wiki/Empty_Page", "<p>No tables here</p>");

        let summary = Coordinator::new(config, "hash", pages, MemorySink::default())
            .run()
            .await
            .unwrap();

        assert_eq!(summary.empty_categories, vec!["Best Sound".to_string()]);
        assert_eq!(summary.nominations_parsed, 0);
    }

    #[tokio::test]
    async fn test_ceremony_pages_seeded_first() {
        let dir = TempDir::new().unwrap();
        let mut config = config(
            &dir,
            r#"
[[category]]
name = "Best Picture"
urls = ["https://en.wikipedia.org/wiki/Academy_Award_for_Best_Picture"]
"#,
        );
        config.editions.count = 2;
        config.editions.fetch_ceremonies = true;

        let ceremony = r#"<table class="infobox"><tr><th>Date</th><td>May 16, 1929</td></tr></table>"#;
        let pages = FixturePages::default()
            .with("https://en.wikipedia.org/wiki/1st_Academy_Awards", ceremony)
            .with("https://en.wikipedia.org/wiki/Academy_Award_for_Best_Picture", BEST_PICTURE);

        let mut coordinator = Coordinator::new(config, "hash", pages, MemorySink::default());
        coordinator.seed();
        while let Some(page) = coordinator.queue.pop() {
            coordinator.process_page(page).await;
        }

        let requested = &coordinator.source().requested;
        assert_eq!(requested[0], "https://en.wikipedia.org/wiki/1st_Academy_Awards");
        assert_eq!(requested[1], "https://en.wikipedia.org/wiki/2nd_Academy_Awards");

        let (tables, _) = coordinator.assembler().snapshot();
        assert_eq!(
            tables.award_editions[0].ceremony_date,
            chrono::NaiveDate::from_ymd_opt(1929, 5, 16)
        );
    }
}
