use crate::error::{Result, ScanError};
use crate::fetcher::DEFAULT_USER_AGENT;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_TARGET_DOMAIN: &str = "wadesplumbingandseptic.com";
pub const DEFAULT_MAX_DEPTH: usize = 3;
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_SEEDS: &[&str] = &[
    "https://www.yelp.com",
    "https://www.yellowpages.com",
    "https://www.bbb.org",
    "https://www.mapquest.com",
    "https://www.angi.com",
];

pub const DEFAULT_KEYWORDS: &[&str] = &["plumbing", "septic"];

/// Parameters for one crawl run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    pub seeds: Vec<String>,
    pub target_domain: String,
    pub max_depth: usize,
    pub max_concurrency: usize,
    pub fetch_timeout_secs: u64,
    pub relevance_keywords: Vec<String>,
    pub user_agent: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            seeds: DEFAULT_SEEDS.iter().map(|s| s.to_string()).collect(),
            target_domain: DEFAULT_TARGET_DOMAIN.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            relevance_keywords: DEFAULT_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl CrawlConfig {
    /// Load a JSON config file. Missing fields fall back to the defaults and
    /// a leading `~` in the path is expanded.
    pub fn from_file(path: &str) -> Result<Self> {
        let expanded = shellexpand::tilde(path);
        let content = std::fs::read_to_string(Path::new(expanded.as_ref()))?;
        let config: CrawlConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.seeds.iter().all(|s| s.trim().is_empty()) {
            return Err(ScanError::Config("at least one seed URL is required".to_string()));
        }
        if self.target_domain.trim().is_empty() {
            return Err(ScanError::Config("target domain must not be empty".to_string()));
        }
        if self.max_concurrency == 0 {
            return Err(ScanError::Config(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ScanError::Config(
                "fetch_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn with_seeds(mut self, seeds: Vec<String>) -> Self {
        self.seeds = seeds;
        self
    }

    pub fn with_target_domain(mut self, domain: impl Into<String>) -> Self {
        self.target_domain = domain.into();
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_max_concurrency(mut self, concurrency: usize) -> Self {
        self.max_concurrency = concurrency;
        self
    }

    pub fn with_fetch_timeout_secs(mut self, secs: u64) -> Self {
        self.fetch_timeout_secs = secs;
        self
    }

    pub fn with_relevance_keywords(mut self, keywords: Vec<String>) -> Self {
        self.relevance_keywords = keywords;
        self
    }
}
