use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A link found on a crawled page that points at the target domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Backlink {
    pub source_url: String,
    pub target_url: String,
}

impl Backlink {
    pub fn new(source_url: impl Into<String>, target_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            target_url: target_url.into(),
        }
    }
}

/// Outcome of one crawl run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSummary {
    pub target_domain: String,
    pub seeds: Vec<String>,
    pub backlinks: Vec<Backlink>,
    pub pages_fetched: usize,
    pub pages_failed: usize,
    pub duplicates_skipped: usize,
    pub backlinks_recorded: usize,
    pub peak_concurrency: usize,
    pub elapsed: Duration,
}

impl CrawlSummary {
    pub fn new(target_domain: String, seeds: Vec<String>) -> Self {
        Self {
            target_domain,
            seeds,
            backlinks: Vec::new(),
            pages_fetched: 0,
            pages_failed: 0,
            duplicates_skipped: 0,
            backlinks_recorded: 0,
            peak_concurrency: 0,
            elapsed: Duration::from_secs(0),
        }
    }

    /// Record calls that replaced an earlier source for the same target.
    pub fn overwritten_backlinks(&self) -> usize {
        self.backlinks_recorded.saturating_sub(self.backlinks.len())
    }
}

/// Progress notification emitted while a crawl is running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEvent {
    Visiting { url: String, depth: usize },
    BacklinkFound(Backlink),
    Failed { url: String, error: String },
}
