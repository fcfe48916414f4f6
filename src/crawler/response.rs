//! Fetched pages as seen by link resolution and result building

use crate::crawler::fetcher::headers_text;
use crate::crawler::CrawlerOptions;
use reqwest::header::HeaderMap;
use scraper::Html;
use std::borrow::Cow;
use std::sync::Arc;
use url::Url;

/// A fetched page
///
/// Built once per successful fetch and only read afterwards. The parsed
/// document is not `Send`, so a `Response` lives inside synchronous
/// processing and is dropped before the crawl loop awaits again.
pub struct Response {
    /// URL the body was served from (after redirects)
    pub request_url: Url,
    /// HTTP status code
    pub status_code: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Distance from the seed URL
    pub depth: u32,
    /// Parsed HTML document
    pub document: Html,
    /// Raw body bytes
    pub body: Vec<u8>,
    /// Host of the seed this crawl started from
    pub root_hostname: String,
    /// Options of the owning crawl
    pub options: Arc<CrawlerOptions>,
}

impl Response {
    /// Parses a fetched body into a response
    pub fn new(
        request_url: Url,
        status_code: u16,
        headers: HeaderMap,
        depth: u32,
        body: Vec<u8>,
        root_hostname: impl Into<String>,
        options: Arc<CrawlerOptions>,
    ) -> Self {
        let document = Html::parse_document(&String::from_utf8_lossy(&body));
        Self {
            request_url,
            status_code,
            headers,
            depth,
            document,
            body,
            root_hostname: root_hostname.into(),
            options,
        }
    }

    /// Resolves a path found on this page to a followable absolute URL
    ///
    /// Returns `None` when the path is a fragment, has a filtered extension,
    /// does not parse, or is out of scope.
    pub fn absolute_url(&self, path: &str) -> Option<String> {
        self.options
            .resolver
            .resolve(&self.request_url, &self.root_hostname, path)
    }

    /// Body decoded as UTF-8, invalid sequences replaced
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Headers as `name: value` lines
    pub fn headers_text(&self) -> String {
        headers_text(&self.headers)
    }
}
