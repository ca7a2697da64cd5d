//! URL handling module for Oscar-Ledger
//!
//! This module provides URL normalization for the visited set, host
//! extraction for pacing, and the rules for which links inside a page point
//! at another encyclopedia article worth following.

mod host;
mod normalize;

use url::Url;

pub use host::extract_host;
pub use normalize::normalize_url;

/// Namespaces whose pages are never articles
const NON_ARTICLE_PREFIXES: &[&str] = &[
    "File:",
    "Image:",
    "Category:",
    "Help:",
    "Special:",
    "Template:",
    "Template_talk:",
    "Talk:",
    "Portal:",
    "Wikipedia:",
    "User:",
];

/// Resolves a link href to an absolute URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links
/// - invalid URLs
/// - non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    if absolute.scheme() == "http" || absolute.scheme() == "https" {
        Some(absolute)
    } else {
        None
    }
}

/// Checks whether a resolved link points at an article on the same site
///
/// Red links (pages that do not exist yet) carry `redlink=1` and are
/// rejected, as are links into non-article namespaces and links to other
/// hosts.
pub fn is_article_link(url: &Url, page_url: &Url) -> bool {
    if url.host_str() != page_url.host_str() || url.port() != page_url.port() {
        return false;
    }

    if url
        .query_pairs()
        .any(|(key, value)| key == "redlink" && value == "1")
    {
        return false;
    }

    let Some(title) = url.path().strip_prefix("/wiki/") else {
        return false;
    };

    !title.is_empty()
        && !NON_ARTICLE_PREFIXES
            .iter()
            .any(|prefix| title.starts_with(prefix))
}

/// Resolves an anchor's href and keeps it only if it is a followable article
///
/// Anchors with class `new` are red links and never followed.
pub fn article_href(href: &str, class: Option<&str>, page_url: &Url) -> Option<Url> {
    if class.is_some_and(|c| c.split_whitespace().any(|c| c == "new")) {
        return None;
    }

    let mut url = resolve_link(href, page_url)?;
    if !is_article_link(&url, page_url) {
        return None;
    }
    url.set_fragment(None);
    Some(url)
}
