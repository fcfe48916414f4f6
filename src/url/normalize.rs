use crate::UrlError;
use url::Url;

/// Parses and validates a seed URL
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace
/// 2. Parse the URL; reject if malformed
/// 3. Reject anything other than HTTP and HTTPS
/// 4. Reject URLs without a host
/// 5. Remove the fragment
///
/// # Examples
///
/// ```
/// use sumi_recon::url::normalize_url;
///
/// let url = normalize_url(" https://Example.com/start#top ").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/start");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);
    Ok(url)
}

/// Computes the frontier deduplication key for a resolved URL
///
/// Resolved links keep their original shape for output; this key only
/// decides whether two links refer to the same crawl target. Host case and
/// default ports are already canonical after parsing, so the key additionally
/// drops the fragment and an empty trailing `?`.
pub fn dedup_key(url: &Url) -> String {
    let mut key = url.clone();
    key.set_fragment(None);
    if key.query() == Some("") {
        key.set_query(None);
    }
    key.into()
}
