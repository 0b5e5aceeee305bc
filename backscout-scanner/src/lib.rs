pub mod analyzer;
pub mod config;
pub mod crawler;
pub mod error;
pub mod fetcher;
pub mod limiter;
pub mod resolver;
pub mod result;
pub mod state;
pub mod tracker;

pub use config::CrawlConfig;
pub use crawler::{CrawlTask, Crawler, EventCallback};
pub use error::ScanError;
pub use result::{Backlink, CrawlEvent, CrawlSummary};
