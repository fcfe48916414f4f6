//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Managing the frontier for each seed
//! - Running fetches concurrently within the configured limits
//! - Turning every response into a result for the output
//! - Resolving discovered links and feeding them back into the frontier

use crate::config::Config;
use crate::crawler::parser::extract_candidates;
use crate::crawler::scheduler::{QueuedUrl, RateLimiter, Scheduler};
use crate::crawler::{build_http_client, fetch_url, CrawlerOptions, FetchResult, Response};
use crate::fields::extract_custom_fields;
use crate::output::stats::{print_statistics, CrawlStatistics, StatisticsSnapshot};
use crate::output::{CrawlResult, OutputHandler, StandardWriter};
use crate::url::{hostname, normalize_url};
use crate::ReconError;
use reqwest::header::HeaderMap;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::Instant;
use url::Url;

/// State shared by every fetch task of one seed
#[derive(Clone)]
struct Worker {
    options: Arc<CrawlerOptions>,
    client: Client,
    output: Arc<dyn OutputHandler>,
    statistics: Arc<CrawlStatistics>,
    limiter: Arc<RateLimiter>,
    root_hostname: String,
}

impl Worker {
    /// Fetches one URL and returns the links discovered on it
    async fn process(self, queued: QueuedUrl) -> Vec<QueuedUrl> {
        self.limiter.wait().await;

        let crawler = &self.options.crawler;
        let fetched = fetch_url(
            &self.client,
            queued.url.as_str(),
            crawler.retries,
            crawler.max_response_size,
        )
        .await;

        match fetched {
            FetchResult::Success {
                final_url,
                status_code,
                headers,
                body,
            } => {
                self.statistics.record_fetch();
                self.handle_fetch(&queued, &final_url, status_code, headers, body)
            }
            FetchResult::NetworkError { error, attempts } => {
                self.statistics.record_failure();
                tracing::debug!(
                    "Failed to fetch {} after {} attempt(s): {}",
                    queued.url,
                    attempts,
                    error
                );
                Vec::new()
            }
        }
    }

    /// Emits the result for a fetched page and resolves its links
    ///
    /// Runs synchronously so the parsed document never crosses an await.
    fn handle_fetch(
        &self,
        queued: &QueuedUrl,
        final_url: &str,
        status_code: u16,
        headers: HeaderMap,
        body: Vec<u8>,
    ) -> Vec<QueuedUrl> {
        let request_url = Url::parse(final_url).unwrap_or_else(|_| queued.url.clone());
        let response = Response::new(
            request_url,
            status_code,
            headers,
            queued.depth,
            body,
            self.root_hostname.as_str(),
            Arc::clone(&self.options),
        );

        let result = CrawlResult {
            url: queued.url.to_string(),
            source: queued.source.clone(),
            tag: queued.tag.clone(),
            attribute: queued.attribute.clone(),
            status_code: Some(status_code),
            depth: queued.depth,
            custom_fields: extract_custom_fields(
                &self.options.registry,
                &response.headers_text(),
                &response.body_text(),
            ),
            ..CrawlResult::new(queued.url.as_str())
        };

        match self.output.write(&result) {
            Ok(()) => self.statistics.record_result(),
            Err(e) => tracing::warn!("Failed to write result for {}: {}", result.url, e),
        }

        if queued.depth >= self.options.crawler.max_depth {
            return Vec::new();
        }

        let candidates = extract_candidates(&response.document);
        self.statistics.record_discovered(candidates.len() as u64);

        let source = queued.url.to_string();
        let mut discovered = Vec::new();
        for candidate in candidates {
            let resolved = response
                .absolute_url(&candidate.path)
                .and_then(|link| Url::parse(&link).ok());
            match resolved {
                Some(url) => discovered.push(QueuedUrl {
                    url,
                    depth: queued.depth + 1,
                    source: Some(source.clone()),
                    tag: Some(candidate.tag),
                    attribute: Some(candidate.attribute),
                }),
                None => self.statistics.record_rejected(),
            }
        }
        discovered
    }
}

/// Main crawler coordinator structure
///
/// One coordinator serves every seed of a run; the HTTP client, rate limiter
/// and statistics are shared between seeds.
pub struct Coordinator {
    options: Arc<CrawlerOptions>,
    client: Client,
    output: Arc<dyn OutputHandler>,
    statistics: Arc<CrawlStatistics>,
    limiter: Arc<RateLimiter>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built from the crawler settings.
    pub fn new(
        options: Arc<CrawlerOptions>,
        output: Arc<dyn OutputHandler>,
    ) -> Result<Self, ReconError> {
        let client = build_http_client(&options.crawler)?;
        let limiter = Arc::new(RateLimiter::new(&options.crawler));

        Ok(Self {
            options,
            client,
            output,
            statistics: Arc::new(CrawlStatistics::new()),
            limiter,
        })
    }

    /// Crawls a single seed URL
    ///
    /// Links are followed up to the configured depth and only while they
    /// stay in scope of the seed's host. The crawl stops early once the
    /// configured crawl duration has elapsed; fetches still in flight at
    /// that point are cancelled.
    pub async fn crawl(&self, seed: &str) -> Result<(), ReconError> {
        let seed_url = normalize_url(seed)?;
        let worker = Worker {
            options: Arc::clone(&self.options),
            client: self.client.clone(),
            output: Arc::clone(&self.output),
            statistics: Arc::clone(&self.statistics),
            limiter: Arc::clone(&self.limiter),
            root_hostname: hostname(&seed_url),
        };

        let crawler = &self.options.crawler;
        let concurrency = crawler.concurrency.max(1) as usize;
        let deadline = (crawler.crawl_duration > 0)
            .then(|| Instant::now() + Duration::from_secs(crawler.crawl_duration));

        tracing::info!("Crawling {} (max depth {})", seed_url, crawler.max_depth);

        let mut scheduler = Scheduler::new(crawler.max_depth);
        scheduler.enqueue(QueuedUrl::seed(seed_url.clone()));
        self.statistics.record_queued();

        let mut tasks = JoinSet::new();
        loop {
            while tasks.len() < concurrency {
                let Some(next) = scheduler.next() else {
                    break;
                };
                tracing::debug!("Fetching {} (depth {})", next.url, next.depth);
                tasks.spawn(worker.clone().process(next));
            }

            let joined = match deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, tasks.join_next()).await {
                    Ok(joined) => joined,
                    Err(_) => {
                        tracing::info!(
                            "Crawl duration reached for {}, {} URL(s) left in frontier",
                            seed_url,
                            scheduler.frontier_size()
                        );
                        tasks.abort_all();
                        break;
                    }
                },
                None => tasks.join_next().await,
            };

            match joined {
                Some(Ok(discovered)) => {
                    for queued in discovered {
                        if scheduler.enqueue(queued) {
                            self.statistics.record_queued();
                        }
                    }
                }
                Some(Err(e)) => tracing::warn!("Fetch task failed: {}", e),
                None => break,
            }
        }

        tracing::info!(
            "Finished {}: {} distinct URL(s) seen",
            seed_url,
            scheduler.seen_count()
        );
        Ok(())
    }

    /// Returns the counters accumulated so far
    pub fn statistics(&self) -> StatisticsSnapshot {
        self.statistics.snapshot()
    }
}

/// Runs the main crawl operation
///
/// Every seed is crawled in turn with the same output. A seed that cannot be
/// crawled is logged and skipped. The output is closed once all seeds are done.
///
/// # Example
///
/// ```no_run
/// use sumi_recon::config::load_config;
/// use sumi_recon::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let stats = run_crawl(config).await?;
/// println!("{} pages fetched", stats.pages_fetched);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<StatisticsSnapshot, ReconError> {
    let options = Arc::new(CrawlerOptions::from_config(&config)?);
    let writer = StandardWriter::from_config(&config.output, &options.registry)?;
    run_crawl_with_output(&config, options, Arc::new(writer)).await
}

/// Runs the crawl operation against a caller-supplied output
pub async fn run_crawl_with_output(
    config: &Config,
    options: Arc<CrawlerOptions>,
    output: Arc<dyn OutputHandler>,
) -> Result<StatisticsSnapshot, ReconError> {
    let coordinator = Coordinator::new(options, Arc::clone(&output))?;
    let start_time = std::time::Instant::now();

    for seed in &config.input.seeds {
        if let Err(e) = coordinator.crawl(seed).await {
            tracing::error!("Error crawling {}: {}", seed, e);
        }
    }

    output.close()?;

    let stats = coordinator.statistics();
    tracing::info!("Crawl completed in {:?}", start_time.elapsed());
    print_statistics(&stats);
    Ok(stats)
}
