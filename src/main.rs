//! Sumi-Recon main entry point
//!
//! This is the command-line interface for the Sumi-Recon crawler.

use anyhow::{bail, Context};
use clap::Parser;
use std::io::{BufRead, IsTerminal};
use std::path::{Path, PathBuf};
use sumi_recon::config::{load_config_with_hash, validate, Config};
use sumi_recon::crawler::crawl;
use tracing_subscriber::EnvFilter;

/// Sumi-Recon: a crawler for security-automation pipelines
///
/// Sumi-Recon crawls seed URLs up to a fixed depth, follows only in-scope
/// links and prints every URL it reaches, optionally as derived fields or
/// JSON lines. Command-line flags override the configuration file.
#[derive(Parser, Debug)]
#[command(name = "sumi-recon")]
#[command(version)]
#[command(about = "A crawler for security-automation pipelines", long_about = None)]
struct Cli {
    /// Target URL or file of URLs to crawl (comma separated, repeatable)
    #[arg(short = 'u', long = "list", value_delimiter = ',')]
    list: Vec<String>,

    /// Path to TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum depth to crawl
    #[arg(short = 'd', long = "depth")]
    depth: Option<u32>,

    /// Maximum time to crawl each target in seconds
    #[arg(long)]
    crawl_duration: Option<u64>,

    /// Maximum response size to read in bytes
    #[arg(long)]
    max_response_size: Option<usize>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Number of times to retry a failed request
    #[arg(long)]
    retries: Option<u32>,

    /// HTTP or SOCKS5 proxy to use
    #[arg(short = 'p', long)]
    proxy: Option<String>,

    /// Custom header to include in every request (`Name: value`, repeatable)
    #[arg(short = 'H', long = "headers")]
    headers: Vec<String>,

    /// In-scope URL regex (repeatable)
    #[arg(long)]
    crawl_scope: Vec<String>,

    /// Out-of-scope URL regex (repeatable)
    #[arg(long)]
    crawl_out_scope: Vec<String>,

    /// Follow subdomains of the target host
    #[arg(long)]
    include_sub: bool,

    /// Extensions to crawl exclusively (comma separated, `*` for all)
    #[arg(long, value_delimiter = ',')]
    extensions: Vec<String>,

    /// Extensions to remove from the default deny list
    #[arg(long, value_delimiter = ',')]
    extensions_allow_list: Vec<String>,

    /// Extensions to add to the default deny list
    #[arg(long, value_delimiter = ',')]
    extensions_deny_list: Vec<String>,

    /// Number of concurrent fetchers
    #[arg(short = 'c', long)]
    concurrency: Option<u32>,

    /// Delay between requests in seconds
    #[arg(long)]
    delay: Option<u64>,

    /// Maximum requests per second
    #[arg(long)]
    rate_limit: Option<u32>,

    /// Maximum requests per minute
    #[arg(long)]
    rate_limit_minute: Option<u32>,

    /// File to write results to
    #[arg(short = 'o', long)]
    output: Option<String>,

    /// Write results as JSON lines
    #[arg(long)]
    json: bool,

    /// Fields to display instead of the URL (comma separated)
    #[arg(short = 'f', long = "field")]
    field: Option<String>,

    /// Fields to store in per-host files (comma separated)
    #[arg(long)]
    store_field: Option<String>,

    /// Directory for stored field files
    #[arg(long)]
    store_field_dir: Option<String>,

    /// Only print results
    #[arg(long, conflicts_with = "verbose")]
    silent: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Validate configuration and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.silent);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    apply_overrides(&mut config, &cli)?;
    validate(&config).context("Invalid configuration")?;

    if config.input.seeds.is_empty() {
        bail!("no input URLs provided (use -u/--list or pipe URLs on stdin)");
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    tracing::info!("Total seed URLs: {}", config.input.seeds.len());
    let stats = crawl(config).await.map_err(|e| {
        tracing::error!("Crawl failed: {}", e);
        e
    })?;
    tracing::debug!("Final statistics: {:?}", stats);

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr; stdout carries results only.
fn setup_logging(verbose: u8, silent: bool) {
    let filter = if silent {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_recon=info,warn"),
            1 => EnvFilter::new("sumi_recon=debug,info"),
            2 => EnvFilter::new("sumi_recon=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Applies command-line flags on top of the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) -> anyhow::Result<()> {
    for entry in &cli.list {
        config.input.seeds.extend(read_targets(entry)?);
    }
    if config.input.seeds.is_empty() && !std::io::stdin().is_terminal() {
        for line in std::io::stdin().lock().lines() {
            let line = line.context("Failed to read targets from stdin")?;
            let line = line.trim();
            if !line.is_empty() {
                config.input.seeds.push(line.to_string());
            }
        }
    }

    let crawler = &mut config.crawler;
    if let Some(depth) = cli.depth {
        crawler.max_depth = depth;
    }
    if let Some(duration) = cli.crawl_duration {
        crawler.crawl_duration = duration;
    }
    if let Some(size) = cli.max_response_size {
        crawler.max_response_size = size;
    }
    if let Some(timeout) = cli.timeout {
        crawler.timeout = timeout;
    }
    if let Some(retries) = cli.retries {
        crawler.retries = retries;
    }
    if let Some(proxy) = &cli.proxy {
        crawler.proxy = Some(proxy.clone());
    }
    crawler.headers.extend(cli.headers.iter().cloned());
    if let Some(concurrency) = cli.concurrency {
        crawler.concurrency = concurrency;
    }
    if let Some(delay) = cli.delay {
        crawler.delay = delay;
    }
    if let Some(rate_limit) = cli.rate_limit {
        crawler.rate_limit = rate_limit;
    }
    if let Some(rate_limit_minute) = cli.rate_limit_minute {
        crawler.rate_limit_minute = rate_limit_minute;
    }

    config.scope.in_scope.extend(cli.crawl_scope.iter().cloned());
    config
        .scope
        .out_of_scope
        .extend(cli.crawl_out_scope.iter().cloned());
    if cli.include_sub {
        config.scope.include_subdomains = true;
    }

    config.extensions.matched.extend(cli.extensions.iter().cloned());
    config
        .extensions
        .allow_list
        .extend(cli.extensions_allow_list.iter().cloned());
    config
        .extensions
        .deny_list
        .extend(cli.extensions_deny_list.iter().cloned());

    let output = &mut config.output;
    if let Some(file) = &cli.output {
        output.file = Some(file.clone());
    }
    if cli.json {
        output.json = true;
    }
    if let Some(fields) = &cli.field {
        output.fields = Some(fields.clone());
    }
    if let Some(fields) = &cli.store_field {
        output.store_fields = Some(fields.clone());
    }
    if let Some(directory) = &cli.store_field_dir {
        output.store_fields_directory = directory.clone();
    }

    Ok(())
}

/// Expands a `-u` value: a path to an existing file yields its lines
fn read_targets(entry: &str) -> anyhow::Result<Vec<String>> {
    let entry = entry.trim();
    if entry.is_empty() {
        return Ok(Vec::new());
    }

    let path = Path::new(entry);
    if !path.is_file() {
        return Ok(vec![entry.to_string()]);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read target list {}", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== Sumi-Recon Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Concurrency: {}", config.crawler.concurrency);
    println!("  Timeout: {}s", config.crawler.timeout);
    println!("  Retries: {}", config.crawler.retries);
    println!(
        "  Rate limit: {}/s, {}/min, delay {}s",
        config.crawler.rate_limit, config.crawler.rate_limit_minute, config.crawler.delay
    );
    if config.crawler.crawl_duration > 0 {
        println!("  Crawl duration: {}s", config.crawler.crawl_duration);
    }
    if let Some(proxy) = &config.crawler.proxy {
        println!("  Proxy: {}", proxy);
    }

    println!("\nScope:");
    println!("  Include subdomains: {}", config.scope.include_subdomains);
    for pattern in &config.scope.in_scope {
        println!("  + {}", pattern);
    }
    for pattern in &config.scope.out_of_scope {
        println!("  - {}", pattern);
    }

    println!("\nOutput:");
    println!("  Format: {}", if config.output.json { "json" } else { "plain" });
    if let Some(file) = &config.output.file {
        println!("  File: {}", file);
    }
    if let Some(fields) = &config.output.fields {
        println!("  Fields: {}", fields);
    }
    if let Some(fields) = &config.output.store_fields {
        println!(
            "  Stored fields: {} (in {})",
            fields, config.output.store_fields_directory
        );
    }

    println!("\nCustom Fields ({}):", config.custom_fields.len());
    for field in &config.custom_fields {
        println!("  - {} ({} patterns)", field.name, field.patterns.len());
    }

    println!("\nTargets ({}):", config.input.seeds.len());
    for seed in &config.input.seeds {
        println!("  * {}", seed);
    }

    println!("\n✓ Configuration is valid");
}
