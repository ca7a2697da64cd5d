use crate::UrlError;
use url::Url;

/// Query parameters that never change which article is served
const IGNORED_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "wprov",
    "useskin",
    "uselang",
];

/// Normalizes a URL so that different spellings of one page share a key
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed or not HTTP(S)
/// 2. Lowercase the host and remove a `www.` prefix
/// 3. Fold mobile hosts (`en.m.wikipedia.org`) onto the desktop host
/// 4. Normalize the path:
///    - Remove dot segments and empty segments
///    - Remove trailing slash (except for root /)
///    - Article titles use `_` in place of spaces
/// 5. Remove the fragment
/// 6. Remove ignored query parameters and sort the rest
///
/// # Arguments
///
/// * `url_str` - The URL string to normalize
///
/// # Returns
///
/// * `Ok(Url)` - Normalized URL
/// * `Err(UrlError)` - Failed to parse or normalize the URL
///
/// # Examples
///
/// ```
/// use oscar_ledger::url::normalize_url;
///
/// let url = normalize_url("https://en.m.wikipedia.org/wiki/The_Godfather#Plot").unwrap();
/// assert_eq!(url.as_str(), "https://en.wikipedia.org/wiki/The_Godfather");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    let host = url.host_str().ok_or(UrlError::MissingDomain)?;
    let normalized_host = normalize_host(host);
    url.set_host(Some(&normalized_host))
        .map_err(|e| UrlError::Malformed(format!("Failed to set host: {}", e)))?;

    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);

    url.set_fragment(None);

    if url.query().is_some() {
        let params = filter_and_sort_query_params(&url);
        if params.is_empty() {
            url.set_query(None);
        } else {
            let query_string = params
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("&");
            url.set_query(Some(&query_string));
        }
    }

    Ok(url)
}

fn normalize_host(host: &str) -> String {
    let mut host = host.to_lowercase();

    if let Some(stripped) = host.strip_prefix("www.") {
        host = stripped.to_string();
    }

    // en.m.wikipedia.org -> en.wikipedia.org
    if let Some(pos) = host.find(".m.") {
        host = format!("{}{}", &host[..pos], &host[pos + 2..]);
    }

    host
}

/// Normalizes a URL path by removing dot segments and trailing slashes
fn normalize_path(path: &str) -> String {
    let mut segments: Vec<String> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment.replace("%20", "_")),
        }
    }

    if segments.is_empty() {
        return "/".to_string();
    }

    format!("/{}", segments.join("/"))
}

fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_ignored_param(key))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    params.sort_by(|a, b| a.0.cmp(&b.0));
    params
}

fn is_ignored_param(key: &str) -> bool {
    IGNORED_PARAMS.contains(&key) || key.starts_with("utm_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_www() {
        let result = normalize_url("https://www.example.com/").unwrap();
        assert_eq!(result.as_str(), "https://example.com/");
    }

    #[test]
    fn test_fold_mobile_host() {
        let result = normalize_url("https://en.m.wikipedia.org/wiki/Cabaret_(1972_film)").unwrap();
        assert_eq!(
            result.as_str(),
            "https://en.wikipedia.org/wiki/Cabaret_(1972_film)"
        );
    }

    #[test]
    fn test_http_is_kept() {
        let result = normalize_url("http://127.0.0.1:8080/wiki/Page").unwrap();
        assert_eq!(result.as_str(), "http://127.0.0.1:8080/wiki/Page");
    }

    #[test]
    fn test_remove_trailing_slash() {
        let result = normalize_url("https://example.com/page/").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_spaces_become_underscores() {
        let result = normalize_url("https://en.wikipedia.org/wiki/The Godfather").unwrap();
        assert_eq!(result.as_str(), "https://en.wikipedia.org/wiki/The_Godfather");
    }

    #[test]
    fn test_remove_fragment() {
        let result = normalize_url("https://example.com/page#section").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_remove_ignored_params_and_sort() {
        let result =
            normalize_url("https://example.com/w/index.php?title=X&utm_source=a&action=raw")
                .unwrap();
        assert_eq!(
            result.as_str(),
            "https://example.com/w/index.php?action=raw&title=X"
        );
    }

    #[test]
    fn test_normalize_path_with_dots() {
        let result = normalize_url("https://example.com/a/../b/./c").unwrap();
        assert_eq!(result.as_str(), "https://example.com/b/c");
    }

    #[test]
    fn test_invalid_scheme() {
        let result = normalize_url("ftp://example.com/page");
        assert!(matches!(result.unwrap_err(), UrlError::InvalidScheme(_)));
    }

    #[test]
    fn test_malformed_url() {
        assert!(normalize_url("not a url").is_err());
    }
}
