//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - HTML parsing and candidate link extraction
//! - Request scheduling and rate limiting
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod options;
mod parser;
mod response;
mod scheduler;

pub use coordinator::{run_crawl, run_crawl_with_output, Coordinator};
pub use fetcher::{build_http_client, fetch_url, headers_text, FetchResult};
pub use options::CrawlerOptions;
pub use parser::{extract_candidates, Candidate};
pub use response::Response;
pub use scheduler::{QueuedUrl, RateLimiter, Scheduler};

use crate::config::Config;
use crate::output::stats::StatisticsSnapshot;
use crate::ReconError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the link resolver and field registry from the configuration
/// 2. Open the configured output
/// 3. Crawl every seed URL
/// 4. Close the output and log statistics
///
/// # Returns
///
/// * `Ok(StatisticsSnapshot)` - Final crawl counters
/// * `Err(ReconError)` - The crawl could not be set up
pub async fn crawl(config: Config) -> Result<StatisticsSnapshot, ReconError> {
    run_crawl(config).await
}
