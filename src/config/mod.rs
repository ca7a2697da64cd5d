//! Configuration module for Oscar-Ledger
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use oscar_ledger::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("oscar-ledger.toml")).unwrap();
//! println!("Scraping {} categories", config.categories.len());
//! ```

mod parser;
mod types;
mod validation;

pub use types::{
    CategoryEntry, Config, EditionsConfig, FetcherConfig, OutputConfig, UserAgentConfig,
};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
