use url::Url;

/// Extracts the host key used for per-host pacing
///
/// The host is lowercased and the port, when present, is kept so that two
/// local servers on different ports are paced independently.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use oscar_ledger::url::extract_host;
///
/// let url = Url::parse("https://EN.wikipedia.org/wiki/Cabaret").unwrap();
/// assert_eq!(extract_host(&url), Some("en.wikipedia.org".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}
