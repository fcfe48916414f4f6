//! Sumi-Recon: a crawler for security-automation pipelines
//!
//! This crate crawls seed URLs up to a configured depth, follows only in-scope
//! links, and emits normalized, field-structured results that other tools can
//! consume directly.

pub mod config;
pub mod crawler;
pub mod fields;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Recon operations
#[derive(Debug, Error)]
pub enum ReconError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Field error: {0}")]
    Field(#[from] fields::FieldError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid field selection: {0}")]
    Field(#[from] fields::FieldError),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Sumi-Recon operations
pub type Result<T> = std::result::Result<T, ReconError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use fields::{derive_fields, Field, FieldOutput, FieldRegistry, FieldStore, RequestedField};
pub use output::CrawlResult;
pub use self::url::{ExtensionFilter, LinkResolver, ScopeMatcher};
