use serde::Deserialize;

/// Main configuration structure for Sumi-Recon
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub scope: ScopeConfig,
    #[serde(default)]
    pub extensions: ExtensionsConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default, rename = "custom-field")]
    pub custom_fields: Vec<CustomFieldConfig>,
}

/// Crawl targets
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputConfig {
    /// Seed URLs to start crawling from
    #[serde(default)]
    pub seeds: Vec<String>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum depth to crawl from a seed URL (the seed is depth 0)
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Number of concurrent fetchers
    pub concurrency: u32,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Number of times to retry a failed request
    pub retries: u32,

    /// Delay between requests in seconds
    pub delay: u64,

    /// Maximum requests per second (0 disables the limit)
    #[serde(rename = "rate-limit")]
    pub rate_limit: u32,

    /// Maximum requests per minute (0 disables the limit)
    #[serde(rename = "rate-limit-minute")]
    pub rate_limit_minute: u32,

    /// Maximum number of response body bytes to read
    #[serde(rename = "max-response-size")]
    pub max_response_size: usize,

    /// Maximum time to crawl a single seed in seconds (0 means unlimited)
    #[serde(rename = "crawl-duration")]
    pub crawl_duration: u64,

    /// HTTP or SOCKS5 proxy URL
    pub proxy: Option<String>,

    /// Extra request headers in `Name: value` form
    pub headers: Vec<String>,

    /// User agent sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            concurrency: 10,
            timeout: 10,
            retries: 1,
            delay: 0,
            rate_limit: 150,
            rate_limit_minute: 0,
            max_response_size: 2 * 1024 * 1024,
            crawl_duration: 0,
            proxy: None,
            headers: Vec::new(),
            user_agent: format!("sumi-recon/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Scope rules: which discovered links may be followed
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    /// URL regexes that a link must match (empty means any)
    #[serde(rename = "in-scope")]
    pub in_scope: Vec<String>,

    /// URL regexes that exclude a link
    #[serde(rename = "out-of-scope")]
    pub out_of_scope: Vec<String>,

    /// Follow subdomains of the seed host
    #[serde(rename = "include-subdomains")]
    pub include_subdomains: bool,
}

/// File extension rules for discovered paths
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExtensionsConfig {
    /// Extensions to crawl exclusively (`*` or empty means all)
    #[serde(rename = "match")]
    pub matched: Vec<String>,

    /// Extensions removed from the default deny list
    #[serde(rename = "allow-list")]
    pub allow_list: Vec<String>,

    /// Extensions added to the default deny list
    #[serde(rename = "deny-list")]
    pub deny_list: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// File to write results to, in addition to stdout
    pub file: Option<String>,

    /// Write results as JSON lines
    pub json: bool,

    /// Comma-separated fields to display
    pub fields: Option<String>,

    /// Comma-separated fields to store in per-host files
    #[serde(rename = "store-fields")]
    pub store_fields: Option<String>,

    /// Directory for stored field files
    #[serde(rename = "store-fields-directory")]
    pub store_fields_directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file: None,
            json: false,
            fields: None,
            store_fields: None,
            store_fields_directory: "sumi_fields".to_string(),
        }
    }
}

/// Which part of a response a custom field is extracted from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponsePart {
    /// Response headers, one `Name: value` per line
    Header,
    /// Response body
    Body,
    /// Headers followed by the body
    #[default]
    Response,
}

/// Definition of a custom output field
#[derive(Debug, Clone, Deserialize)]
pub struct CustomFieldConfig {
    /// Field name, usable in field and store-field lists
    pub name: String,

    /// Response part to search
    #[serde(default)]
    pub part: ResponsePart,

    /// Regular expressions to run over the part
    pub patterns: Vec<String>,

    /// Capture group to emit (0 is the whole match)
    #[serde(default)]
    pub group: usize,
}
