/// Outcome of fetching a single page
use std::fmt;

/// How a page fetch ended
///
/// Pages are only recorded once their fetch has finished, so every state
/// here is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PageState {
    /// Fetched and its contents ingested
    Processed,

    /// HTTP 404 or another client error that retrying will not fix
    DeadLink,

    /// Timeout, connection failure, 5xx or 429 after every retry
    Unreachable,

    /// Response was not HTML
    ContentMismatch,

    /// URL could not be requested at all
    InvalidUrl,

    Failed,
}

impl PageState {
    pub fn is_error(&self) -> bool {
        !matches!(self, Self::Processed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::DeadLink => "dead_link",
            Self::Unreachable => "unreachable",
            Self::ContentMismatch => "content_mismatch",
            Self::InvalidUrl => "invalid_url",
            Self::Failed => "failed",
        }
    }

    /// Human-readable label for summary tables
    pub fn label(&self) -> &'static str {
        match self {
            Self::Processed => "Processed",
            Self::DeadLink => "Dead Link (4xx)",
            Self::Unreachable => "Unreachable",
            Self::ContentMismatch => "Not HTML",
            Self::InvalidUrl => "Invalid URL",
            Self::Failed => "Failed",
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_error() {
        assert!(PageState::DeadLink.is_error());
        assert!(PageState::Unreachable.is_error());
        assert!(PageState::InvalidUrl.is_error());
        assert!(!PageState::Processed.is_error());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", PageState::Processed), "processed");
        assert_eq!(format!("{}", PageState::DeadLink), "dead_link");
    }

    #[test]
    fn test_summary_order() {
        // BTreeMap keys in the run summary list successes first
        assert!(PageState::Processed < PageState::DeadLink);
        assert!(PageState::DeadLink < PageState::Unreachable);
    }
}
