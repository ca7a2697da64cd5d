use serde::Deserialize;

/// Main configuration structure for Oscar-Ledger
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub fetcher: FetcherConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub editions: EditionsConfig,
    pub output: OutputConfig,
    #[serde(default, rename = "category")]
    pub categories: Vec<CategoryEntry>,
}

/// HTTP fetch behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// Minimum time between requests to the same host (milliseconds)
    #[serde(rename = "delay-ms")]
    pub delay_ms: u64,

    /// Retries allowed for transient failures
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Base backoff before the first retry (milliseconds)
    #[serde(rename = "backoff-ms", default = "default_backoff_ms")]
    pub backoff_ms: u64,

    /// Factor applied to the backoff after every attempt
    #[serde(rename = "backoff-multiplier", default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the scraper
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the scraper
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the scraper
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for scraper-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Which ceremonies exist and where their pages live
#[derive(Debug, Clone, Deserialize)]
pub struct EditionsConfig {
    /// Calendar year of the first ceremony
    #[serde(rename = "first-year", default = "default_first_year")]
    pub first_year: i32,

    /// Number of ceremonies to seed (editions 1..=count)
    #[serde(default = "default_edition_count")]
    pub count: u32,

    /// Whether ceremony pages are fetched for venue, date and staff details
    #[serde(rename = "fetch-ceremonies", default = "default_true")]
    pub fetch_ceremonies: bool,

    /// Ceremony page URL with an `{ordinal}` placeholder
    #[serde(
        rename = "ceremony-url-template",
        default = "default_ceremony_url_template"
    )]
    pub ceremony_url_template: String,
}

impl Default for EditionsConfig {
    fn default() -> Self {
        Self {
            first_year: default_first_year(),
            count: default_edition_count(),
            fetch_ceremonies: true,
            ceremony_url_template: default_ceremony_url_template(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory the CSV tables are written into
    pub directory: String,

    /// File name (inside `directory`) of the markdown run summary
    #[serde(rename = "summary-file", default = "default_summary_file")]
    pub summary_file: String,

    /// Single-character field delimiter
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Write intermediate tables every N processed pages (0 disables)
    #[serde(rename = "flush-every", default = "default_flush_every")]
    pub flush_every: u32,
}

/// One award category and the pages that list its nominees
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryEntry {
    /// Category display name (e.g., "Best Picture")
    pub name: String,

    /// Listing pages to try in order; later entries are fallbacks
    pub urls: Vec<String>,
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    2000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_first_year() -> i32 {
    1929
}

fn default_edition_count() -> u32 {
    96
}

fn default_true() -> bool {
    true
}

fn default_ceremony_url_template() -> String {
    "https://en.wikipedia.org/wiki/{ordinal}_Academy_Awards".to_string()
}

fn default_summary_file() -> String {
    "run_summary.md".to_string()
}

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_flush_every() -> u32 {
    50
}
