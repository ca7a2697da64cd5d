//! Crawler module for page fetching and pipeline orchestration
//!
//! This module contains the scraping loop, including:
//! - HTTP fetching with pacing and retry logic
//! - The work queue of ceremony, category, film and person pages
//! - Feeding parsed pages into the assembler
//! - Overall run coordination

mod coordinator;
mod fetcher;
pub mod ingest;
mod scheduler;

pub use coordinator::{ceremony_url, run_scrape, Coordinator};
pub use fetcher::{build_http_client, user_agent_string, FetchError, Fetcher, PageSource};
pub use scheduler::{PageKind, QueuedPage, WorkQueue};
