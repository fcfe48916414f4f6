//! Output module for crawl results
//!
//! This module handles:
//! - The result record emitted for every crawled URL
//! - Writing results as plain lines or JSON lines
//! - Handing stored fields to the field store
//! - Recording crawl statistics

pub mod stats;
mod traits;
mod writer;

pub use stats::{print_statistics, CrawlStatistics, StatisticsSnapshot};
pub use traits::{CrawlResult, OutputError, OutputHandler, OutputResult};
pub use writer::StandardWriter;
