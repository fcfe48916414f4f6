//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client from crawler configuration
//! - Retrying transient failures
//! - Capping how much of a response body is read

use crate::config::{parse_header, CrawlerConfig};
use crate::{ConfigError, ReconError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{redirect::Policy, Client, Proxy, Response as HttpResponse};
use std::time::Duration;

/// Maximum number of redirects followed per request
const MAX_REDIRECTS: usize = 10;

/// Delay before retrying a failed request
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// A response was received (any status code)
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Response headers
        headers: HeaderMap,
        /// Response body, truncated to the configured maximum size
        body: Vec<u8>,
    },

    /// No usable response after all attempts
    NetworkError {
        /// Error description
        error: String,
        /// Number of attempts made
        attempts: u32,
    },
}

/// Builds an HTTP client with proper configuration
///
/// # Errors
///
/// Returns a configuration error for malformed headers or proxies, or the
/// client builder's error.
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, ReconError> {
    let mut headers = HeaderMap::new();
    for header in &config.headers {
        let (name, value) = parse_header(header)?;
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ConfigError::Validation(format!("Invalid header '{}': {}", header, e)))?;
        let value = HeaderValue::from_str(&value)
            .map_err(|e| ConfigError::Validation(format!("Invalid header '{}': {}", header, e)))?;
        headers.append(name, value);
    }

    let timeout = Duration::from_secs(config.timeout);
    let mut builder = Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true);

    if let Some(proxy) = &config.proxy {
        let proxy = Proxy::all(proxy.as_str())
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid proxy '{}': {}", proxy, e)))?;
        builder = builder.proxy(proxy);
    }

    Ok(builder.build()?)
}

/// Fetches a URL, retrying transient failures
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 5xx | Retry while attempts remain, then return the response |
/// | Timeout / connection error | Retry while attempts remain |
/// | Body read error | Retry while attempts remain |
/// | Anything else | Return immediately |
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
/// * `retries` - Extra attempts after the first
/// * `max_body` - Maximum number of body bytes to keep
pub async fn fetch_url(client: &Client, url: &str, retries: u32, max_body: usize) -> FetchResult {
    let attempts = retries + 1;
    let mut last_error = String::new();

    for attempt in 1..=attempts {
        if attempt > 1 {
            tracing::debug!("Retrying {} (attempt {}/{})", url, attempt, attempts);
            tokio::time::sleep(RETRY_DELAY).await;
        }

        let response = match client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                last_error = classify_error(&e);
                if e.is_timeout() || e.is_connect() {
                    continue;
                }
                return FetchResult::NetworkError {
                    error: last_error,
                    attempts: attempt,
                };
            }
        };

        let status = response.status();
        if status.is_server_error() && attempt < attempts {
            last_error = format!("HTTP {}", status.as_u16());
            continue;
        }

        let final_url = response.url().to_string();
        let headers = response.headers().clone();
        match read_body(response, max_body).await {
            Ok(body) => {
                return FetchResult::Success {
                    final_url,
                    status_code: status.as_u16(),
                    headers,
                    body,
                }
            }
            Err(e) => last_error = classify_error(&e),
        }
    }

    FetchResult::NetworkError {
        error: last_error,
        attempts,
    }
}

/// Reads at most `max_body` bytes of a response body
async fn read_body(mut response: HttpResponse, max_body: usize) -> Result<Vec<u8>, reqwest::Error> {
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        let remaining = max_body - body.len();
        if chunk.len() >= remaining {
            body.extend_from_slice(&chunk[..remaining]);
            break;
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

fn classify_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection refused".to_string()
    } else if e.is_redirect() {
        "Too many redirects".to_string()
    } else {
        e.to_string()
    }
}

/// Renders headers as `name: value` lines
pub fn headers_text(headers: &HeaderMap) -> String {
    headers
        .iter()
        .map(|(name, value)| format!("{}: {}", name, String::from_utf8_lossy(value.as_bytes())))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(&CrawlerConfig::default()).is_ok());
    }

    #[test]
    fn test_build_client_with_headers_and_proxy() {
        let config = CrawlerConfig {
            headers: vec!["Cookie: session=1".to_string(), "X-Test: yes".to_string()],
            proxy: Some("http://127.0.0.1:8080".to_string()),
            ..CrawlerConfig::default()
        };
        assert!(build_http_client(&config).is_ok());
    }

    #[test]
    fn test_build_client_rejects_bad_header() {
        let config = CrawlerConfig {
            headers: vec!["missing colon".to_string()],
            ..CrawlerConfig::default()
        };
        assert!(matches!(
            build_http_client(&config),
            Err(ReconError::Config(ConfigError::Validation(_)))
        ));
    }

    #[test]
    fn test_headers_text() {
        let mut headers = HeaderMap::new();
        headers.insert("server", HeaderValue::from_static("nginx"));
        headers.insert("x-powered-by", HeaderValue::from_static("php"));
        let text = headers_text(&headers);
        assert!(text.contains("server: nginx"));
        assert!(text.contains("x-powered-by: php"));
        assert_eq!(text.lines().count(), 2);
    }
}
