//! Output handler traits and types
//!
//! This module defines the result record every crawl emits and the trait
//! interface for the sinks that receive them.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// A crawled URL ready for output
#[derive(Debug, Clone, Serialize)]
pub struct CrawlResult {
    /// When the response was received
    pub timestamp: DateTime<Utc>,

    /// The URL as requested
    pub url: String,

    /// Page the URL was discovered on (none for seeds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// HTML tag the URL was found in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    /// Attribute of the tag holding the URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,

    /// HTTP status code of the response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    /// Distance from the seed URL
    pub depth: u32,

    /// Custom field values by name, in definition order
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub custom_fields: IndexMap<String, Vec<String>>,
}

impl CrawlResult {
    /// Creates a result for a URL with no metadata
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            url: url.into(),
            source: None,
            tag: None,
            attribute: None,
            status_code: None,
            depth: 0,
            custom_fields: IndexMap::new(),
        }
    }
}

/// Trait for output handlers
///
/// Output handlers receive every result of a crawl. They are shared by all
/// fetch workers, so implementations must be thread-safe.
pub trait OutputHandler: Send + Sync {
    /// Writes a single result
    fn write(&self, result: &CrawlResult) -> OutputResult<()>;

    /// Flushes any buffered output
    fn close(&self) -> OutputResult<()>;
}
