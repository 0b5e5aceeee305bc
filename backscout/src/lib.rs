pub mod commands;
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    CrawlArgs, build_config, load_urls_from_file, load_urls_from_source, parse_url_line,
};

// Re-export crawl functionality from backscout-core
pub use backscout_core::crawl::{
    CrawlOptions, CrawlProgressCallback, execute_crawl, extract_url_path,
};
