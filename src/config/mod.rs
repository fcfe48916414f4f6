//! Configuration module for Sumi-Recon
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. Every section is optional; command-line flags are applied on top
//! and the merged result is validated again before crawling.
//!
//! # Example
//!
//! ```no_run
//! use sumi_recon::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("recon.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, CustomFieldConfig, ExtensionsConfig, InputConfig, OutputConfig,
    ResponsePart, ScopeConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::{parse_header, validate};
