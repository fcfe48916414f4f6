//! Crawl statistics
//!
//! Counters shared by every fetch worker of a crawl and logged once it ends.

use std::sync::atomic::{AtomicU64, Ordering};

/// Running crawl counters
#[derive(Debug, Default)]
pub struct CrawlStatistics {
    pages_fetched: AtomicU64,
    fetch_failures: AtomicU64,
    results_written: AtomicU64,
    links_discovered: AtomicU64,
    links_queued: AtomicU64,
    links_rejected: AtomicU64,
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatisticsSnapshot {
    /// Responses received
    pub pages_fetched: u64,

    /// Requests that failed after all retries
    pub fetch_failures: u64,

    /// Results handed to the output
    pub results_written: u64,

    /// Candidate paths found in pages
    pub links_discovered: u64,

    /// Resolved links added to the frontier
    pub links_queued: u64,

    /// Candidates that did not resolve to a followable URL (malformed,
    /// out of scope, filtered extension alike)
    pub links_rejected: u64,
}

impl CrawlStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_fetch(&self) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_result(&self) {
        self.results_written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_discovered(&self, count: u64) {
        self.links_discovered.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_queued(&self) {
        self.links_queued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.links_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the current counter values
    pub fn snapshot(&self) -> StatisticsSnapshot {
        StatisticsSnapshot {
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            results_written: self.results_written.load(Ordering::Relaxed),
            links_discovered: self.links_discovered.load(Ordering::Relaxed),
            links_queued: self.links_queued.load(Ordering::Relaxed),
            links_rejected: self.links_rejected.load(Ordering::Relaxed),
        }
    }
}

/// Logs a statistics summary
pub fn print_statistics(stats: &StatisticsSnapshot) {
    tracing::info!(
        "Pages fetched: {}, failed: {}, results: {}",
        stats.pages_fetched,
        stats.fetch_failures,
        stats.results_written
    );
    tracing::info!(
        "Links discovered: {}, queued: {}, rejected: {}",
        stats.links_discovered,
        stats.links_queued,
        stats.links_rejected
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_counters_start_at_zero() {
        assert_eq!(CrawlStatistics::new().snapshot(), StatisticsSnapshot::default());
    }

    #[test]
    fn test_counters_accumulate_across_threads() {
        let stats = Arc::new(CrawlStatistics::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let stats = Arc::clone(&stats);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        stats.record_fetch();
                        stats.record_discovered(3);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.pages_fetched, 400);
        assert_eq!(snapshot.links_discovered, 1200);
        assert_eq!(snapshot.links_rejected, 0);
    }
}
