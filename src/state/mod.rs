//! State module for tracking scrape progress
//!
//! # Components
//!
//! - `PageState`: How each page fetch ended (processed, dead link, unreachable...)
//! - `HostState`: Tracks per-host request timing for politeness pacing

mod host_state;
mod page_state;

pub use host_state::HostState;
pub use page_state::PageState;
