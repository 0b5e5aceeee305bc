use backscout_scanner::{CrawlConfig, CrawlEvent, CrawlSummary, Crawler, EventCallback};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use url::Url;

/// Options for configuring a crawl operation
pub struct CrawlOptions {
    pub config: CrawlConfig,
    pub show_progress_bars: bool,
}

/// Callback for reporting crawl progress
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Host of a URL, or the URL itself when it does not parse
pub fn extract_url_host(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .unwrap_or_else(|| url.to_string())
}

/// Execute a crawl with the given options
/// Returns the crawl summary
pub async fn execute_crawl(
    options: CrawlOptions,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<CrawlSummary, String> {
    let CrawlOptions {
        config,
        show_progress_bars,
    } = options;

    // Single spinner for the whole crawl (only if enabled)
    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .map_err(|e| format!("Invalid progress template: {}", e))?;
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Starting crawl...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let visited_count = Arc::new(AtomicUsize::new(0));
    let backlink_count = Arc::new(AtomicUsize::new(0));

    let event_callback: EventCallback = {
        let pb = progress_bar.clone();
        let visited_count = visited_count.clone();
        let backlink_count = backlink_count.clone();
        let progress_callback = progress_callback.clone();

        Arc::new(move |event: CrawlEvent| {
            match event {
                CrawlEvent::Visiting { url, depth } => {
                    let visited = visited_count.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(ref pb) = pb {
                        pb.set_message(format!(
                            "{} pages visited, {} backlinks | depth {} {}{}",
                            visited,
                            backlink_count.load(Ordering::Relaxed),
                            depth,
                            extract_url_host(&url),
                            extract_url_path(&url)
                        ));
                    }
                }
                CrawlEvent::BacklinkFound(backlink) => {
                    backlink_count.fetch_add(1, Ordering::Relaxed);
                    if let Some(ref callback) = progress_callback {
                        let msg = format!(
                            "[+] Backlink: {} -> {}",
                            backlink.source_url, backlink.target_url
                        );
                        match pb {
                            Some(ref pb) => pb.suspend(|| callback(msg)),
                            None => callback(msg),
                        }
                    }
                }
                CrawlEvent::Failed { url, error } => {
                    if let Some(ref callback) = progress_callback {
                        let msg = format!("[!] Skipped {}: {}", url, error);
                        match pb {
                            Some(ref pb) => pb.suspend(|| callback(msg)),
                            None => callback(msg),
                        }
                    }
                }
            }
        })
    };

    let crawler = Crawler::new(config)
        .and_then(|crawler| crawler.with_event_callback(event_callback))
        .map_err(|e| e.to_string())?;

    let summary = crawler.crawl().await.map_err(|e| e.to_string())?;

    // Finish progress bar (only if enabled)
    if let Some(ref pb) = progress_bar {
        pb.finish_with_message(format!(
            "Crawl complete! {} pages visited, {} distinct backlinks",
            visited_count.load(Ordering::Relaxed),
            summary.backlinks.len()
        ));
    }

    Ok(summary)
}
