//! Scheduler for managing the crawl frontier and rate limiting
//!
//! This module handles:
//! - FIFO frontier of URLs waiting to be fetched
//! - Deduplication of URLs that differ only cosmetically
//! - Enforcing the maximum crawl depth
//! - Spacing requests according to the configured rate limits

use crate::config::CrawlerConfig;
use crate::url::dedup_key;
use governor::Quota;
use std::collections::{HashSet, VecDeque};
use std::num::NonZeroU32;
use std::time::Duration;
use url::Url;

/// A URL queued for fetching along with where it was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedUrl {
    /// The URL to fetch
    pub url: Url,

    /// Distance from the seed URL
    pub depth: u32,

    /// Page the URL was found on (none for seeds)
    pub source: Option<String>,

    /// Tag the URL was found in
    pub tag: Option<String>,

    /// Attribute of the tag holding the URL
    pub attribute: Option<String>,
}

impl QueuedUrl {
    /// Creates a depth-0 entry for a seed URL
    pub fn seed(url: Url) -> Self {
        Self {
            url,
            depth: 0,
            source: None,
            tag: None,
            attribute: None,
        }
    }
}

/// Scheduler manages the frontier queue for a single seed
///
/// URLs are handed out in discovery order. A URL is accepted at most once,
/// keyed by [`dedup_key`], and only while its depth is within `max_depth`.
#[derive(Debug)]
pub struct Scheduler {
    /// URLs waiting to be fetched
    frontier: VecDeque<QueuedUrl>,

    /// Dedup keys of every URL ever accepted
    seen: HashSet<String>,

    /// Maximum accepted depth
    max_depth: u32,
}

impl Scheduler {
    /// Creates an empty scheduler
    pub fn new(max_depth: u32) -> Self {
        Self {
            frontier: VecDeque::new(),
            seen: HashSet::new(),
            max_depth,
        }
    }

    /// Adds a URL to the frontier
    ///
    /// Returns `false` if the URL was too deep or already seen.
    pub fn enqueue(&mut self, queued: QueuedUrl) -> bool {
        if queued.depth > self.max_depth {
            return false;
        }
        if !self.seen.insert(dedup_key(&queued.url)) {
            return false;
        }
        self.frontier.push_back(queued);
        true
    }

    /// Takes the next URL to fetch
    pub fn next(&mut self) -> Option<QueuedUrl> {
        self.frontier.pop_front()
    }

    /// Number of URLs waiting to be fetched
    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    /// Number of distinct URLs accepted so far
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}

type DirectLimiter = governor::RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Spaces requests so the configured rate limits hold across all workers
///
/// `rate-limit` (per second) and `rate-limit-minute` each get their own
/// quota with a burst of one, so requests are evenly spaced rather than
/// released in batches. `delay` is an extra pause before every request.
pub struct RateLimiter {
    per_second: Option<(Quota, DirectLimiter)>,
    per_minute: Option<(Quota, DirectLimiter)>,
    delay: Duration,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("per_second", &self.per_second.as_ref().map(|(quota, _)| quota))
            .field("per_minute", &self.per_minute.as_ref().map(|(quota, _)| quota))
            .field("delay", &self.delay)
            .finish()
    }
}

impl RateLimiter {
    /// Creates a rate limiter from crawler configuration
    pub fn new(config: &CrawlerConfig) -> Self {
        let limiter = |quota: Quota| {
            let quota = quota.allow_burst(NonZeroU32::MIN);
            (quota, governor::RateLimiter::direct(quota))
        };

        Self {
            per_second: NonZeroU32::new(config.rate_limit).map(|n| limiter(Quota::per_second(n))),
            per_minute: NonZeroU32::new(config.rate_limit_minute)
                .map(|n| limiter(Quota::per_minute(n))),
            delay: Duration::from_secs(config.delay),
        }
    }

    /// Minimum time between two requests imposed by the quotas
    pub fn interval(&self) -> Duration {
        [&self.per_second, &self.per_minute]
            .into_iter()
            .flatten()
            .map(|(quota, _)| quota.replenish_interval())
            .max()
            .unwrap_or(Duration::ZERO)
    }

    /// Pause added before every request
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Waits until a request may be sent
    pub async fn wait(&self) {
        if let Some((_, limiter)) = &self.per_second {
            limiter.until_ready().await;
        }
        if let Some((_, limiter)) = &self.per_minute {
            limiter.until_ready().await;
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}
