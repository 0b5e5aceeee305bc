use crate::analyzer::{PageAnalyzer, PageContent};
use crate::config::CrawlConfig;
use crate::error::{Result, ScanError};
use crate::fetcher::Fetcher;
use crate::limiter::ConcurrencyLimiter;
use crate::resolver::{ensure_scheme, is_crawlable, resolve_url};
use crate::result::{Backlink, CrawlEvent, CrawlSummary};
use crate::state::{BacklinkCollector, VisitedSet};
use crate::tracker::{TaskGuard, TaskTracker};
use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{debug, error, info, warn};

pub type EventCallback = Arc<dyn Fn(CrawlEvent) + Send + Sync>;

/// One unit of work: a URL and how many hops it is from a seed.
#[derive(Debug, Clone)]
pub struct CrawlTask {
    pub url: String,
    pub depth: usize,
}

#[derive(Default)]
struct CrawlCounters {
    pages_fetched: AtomicUsize,
    pages_failed: AtomicUsize,
    duplicates_skipped: AtomicUsize,
    backlinks_recorded: AtomicUsize,
}

/// Everything a running task touches. Shared by all tasks of one run.
struct CrawlContext {
    fetcher: Fetcher,
    analyzer: PageAnalyzer,
    visited: VisitedSet,
    backlinks: BacklinkCollector,
    limiter: ConcurrencyLimiter,
    tracker: TaskTracker,
    counters: CrawlCounters,
    target_domain: String,
    max_depth: usize,
    event_callback: Option<EventCallback>,
}

/// Backlink crawler for a single run. Build a new one for every run.
pub struct Crawler {
    config: CrawlConfig,
    context: Arc<CrawlContext>,
}

impl Crawler {
    pub fn new(config: CrawlConfig) -> Result<Self> {
        config.validate()?;

        let context = CrawlContext {
            fetcher: Fetcher::new(config.fetch_timeout(), &config.user_agent)?,
            analyzer: PageAnalyzer::new(&config.relevance_keywords)?,
            visited: VisitedSet::new(),
            backlinks: BacklinkCollector::new(),
            limiter: ConcurrencyLimiter::new(config.max_concurrency),
            tracker: TaskTracker::new(),
            counters: CrawlCounters::default(),
            // Resolved links come back with lowercased hosts.
            target_domain: config.target_domain.trim().to_lowercase(),
            max_depth: config.max_depth,
            event_callback: None,
        };

        Ok(Self {
            config,
            context: Arc::new(context),
        })
    }

    /// Fails once a crawl has started sharing the run state.
    pub fn with_event_callback(mut self, callback: EventCallback) -> Result<Self> {
        let Some(context) = Arc::get_mut(&mut self.context) else {
            return Err(ScanError::Other(
                "event callback must be set before the crawl starts".to_string(),
            ));
        };
        context.event_callback = Some(callback);
        Ok(self)
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    pub async fn crawl(&self) -> Result<CrawlSummary> {
        let started = Instant::now();
        let seeds: Vec<String> = self
            .config
            .seeds
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect();

        info!(
            "Starting backlink crawl for {} from {} seed(s), max depth {}, {} concurrent fetches",
            self.config.target_domain,
            seeds.len(),
            self.config.max_depth,
            self.config.max_concurrency
        );

        for seed in &seeds {
            self.context.dispatch(CrawlTask {
                url: seed.clone(),
                depth: 0,
            });
        }

        self.context.tracker.wait().await;

        let counters = &self.context.counters;
        let mut summary = CrawlSummary::new(self.config.target_domain.clone(), seeds);
        summary.backlinks = self.context.backlinks.snapshot().await;
        summary.pages_fetched = counters.pages_fetched.load(Ordering::SeqCst);
        summary.pages_failed = counters.pages_failed.load(Ordering::SeqCst);
        summary.duplicates_skipped = counters.duplicates_skipped.load(Ordering::SeqCst);
        summary.backlinks_recorded = counters.backlinks_recorded.load(Ordering::SeqCst);
        summary.peak_concurrency = self.context.limiter.peak();
        summary.elapsed = started.elapsed();

        info!(
            "Crawl complete. Fetched {} pages, found {} backlinks in {:.1}s",
            summary.pages_fetched,
            summary.backlinks.len(),
            summary.elapsed.as_secs_f64()
        );

        Ok(summary)
    }

    pub async fn get_visited_count(&self) -> usize {
        self.context.visited.len().await
    }

    pub fn peak_concurrency(&self) -> usize {
        self.context.limiter.peak()
    }
}

impl CrawlContext {
    fn emit(&self, event: CrawlEvent) {
        if let Some(ref callback) = self.event_callback {
            callback(event);
        }
    }

    /// Spawn `task` as an independent unit of work tracked by the run.
    fn dispatch(self: &Arc<Self>, task: CrawlTask) {
        let guard = self.tracker.enter();
        let context = Arc::clone(self);
        tokio::spawn(context.process(task, guard));
    }

    fn process(self: Arc<Self>, task: CrawlTask, guard: TaskGuard) -> BoxFuture<'static, ()> {
        async move {
            // Held until the task finishes so the run cannot complete early.
            let _guard = guard;

            if task.depth >= self.max_depth {
                debug!("Depth limit reached for {}", task.url);
                return;
            }

            let url = ensure_scheme(&task.url);

            let page = {
                let _slot = match self.limiter.acquire().await {
                    Ok(slot) => slot,
                    Err(e) => {
                        warn!("Could not acquire crawl slot for {}: {}", url, e);
                        return;
                    }
                };

                if !self.visited.claim(&url).await {
                    debug!("Already visited {}", url);
                    self.counters.duplicates_skipped.fetch_add(1, Ordering::SeqCst);
                    return;
                }

                info!("Visiting {} (depth {})", url, task.depth);
                self.emit(CrawlEvent::Visiting {
                    url: url.clone(),
                    depth: task.depth,
                });

                match self.fetch_and_analyze(&url).await {
                    Ok(page) => page,
                    Err(e) => {
                        if e.is_task_local() {
                            warn!("{}", e);
                        } else {
                            error!("{}", e);
                        }
                        self.counters.pages_failed.fetch_add(1, Ordering::SeqCst);
                        self.emit(CrawlEvent::Failed {
                            url: url.clone(),
                            error: e.to_string(),
                        });
                        return;
                    }
                }
            };

            self.counters.pages_fetched.fetch_add(1, Ordering::SeqCst);
            let relevant = self.analyzer.is_relevant(&page.text);
            debug!(
                "{} is {} ({} links)",
                url,
                if relevant { "relevant" } else { "not relevant" },
                page.links.len()
            );

            for href in &page.links {
                let Some(absolute_url) = resolve_url(&url, href) else {
                    debug!("{}", ScanError::InvalidUrl(href.clone()));
                    continue;
                };

                if absolute_url.contains(&self.target_domain) {
                    self.backlinks.record(&url, &absolute_url).await;
                    self.counters.backlinks_recorded.fetch_add(1, Ordering::SeqCst);
                    info!("Found backlink: {} -> {}", url, absolute_url);
                    self.emit(CrawlEvent::BacklinkFound(Backlink::new(
                        url.clone(),
                        absolute_url,
                    )));
                } else if relevant {
                    self.dispatch_child(absolute_url, task.depth + 1).await;
                }
            }
        }
        .boxed()
    }

    async fn fetch_and_analyze(&self, url: &str) -> Result<PageContent> {
        let body = self.fetcher.fetch(url).await?;
        self.analyzer.analyze(&body)
    }

    /// Skip children that would stop before fetching anyway.
    async fn dispatch_child(self: &Arc<Self>, url: String, depth: usize) {
        if depth >= self.max_depth {
            return;
        }
        if !is_crawlable(&url) {
            debug!("Skipping non-http link {}", url);
            return;
        }
        if self.visited.contains(&url).await {
            return;
        }
        self.dispatch(CrawlTask { url, depth });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    fn html_page(body: &str) -> ResponseTemplate {
        ResponseTemplate::new(200)
            .insert_header("content-type", "text/html")
            .set_body_bytes(format!("<html><body>{}</body></html>", body).into_bytes())
    }

    fn test_config(seed: String) -> CrawlConfig {
        CrawlConfig::default()
            .with_seeds(vec![seed])
            .with_fetch_timeout_secs(5)
    }

    #[tokio::test]
    async fn test_records_backlink_from_relevant_seed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(html_page(
                r#"<p>Plumbing pros</p>
                <a href="https://wadesplumbingandseptic.com/contact">Wade</a>"#,
            ))
            .expect(1)
            .mount(&mock_server)
            .await;

        let crawler = Crawler::new(test_config(mock_server.uri())).unwrap();
        let summary = crawler.crawl().await.unwrap();

        assert_eq!(summary.backlinks.len(), 1);
        assert_eq!(summary.backlinks[0].source_url, mock_server.uri());
        assert_eq!(
            summary.backlinks[0].target_url,
            "https://wadesplumbingandseptic.com/contact"
        );
        assert_eq!(summary.pages_fetched, 1);
    }

    #[tokio::test]
    async fn test_events_reported_to_callback() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(html_page(
                r#"<a href="https://wadesplumbingandseptic.com/">Wade</a>
                <a href="/gone">Gone</a> septic"#,
            ))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let events = Arc::new(std::sync::Mutex::new(Vec::new()));
        let events_clone = events.clone();
        let crawler = Crawler::new(test_config(mock_server.uri()))
            .unwrap()
            .with_event_callback(Arc::new(move |event: CrawlEvent| {
                events_clone.lock().unwrap().push(event);
            }))
            .unwrap();

        let summary = crawler.crawl().await.unwrap();
        assert_eq!(summary.pages_failed, 1);

        let events = events.lock().unwrap();
        let visits = events
            .iter()
            .filter(|e| matches!(e, CrawlEvent::Visiting { .. }))
            .count();
        assert_eq!(visits, 2);
        assert!(events.iter().any(|e| matches!(e, CrawlEvent::BacklinkFound(_))));
        assert!(events.iter().any(
            |e| matches!(e, CrawlEvent::Failed { url, .. } if url.ends_with("/gone"))
        ));
    }

    #[tokio::test]
    async fn test_zero_depth_fetches_nothing() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(html_page("plumbing"))
            .expect(0)
            .mount(&mock_server)
            .await;

        let crawler =
            Crawler::new(test_config(mock_server.uri()).with_max_depth(0)).unwrap();
        let summary = crawler.crawl().await.unwrap();

        assert!(summary.backlinks.is_empty());
        assert_eq!(summary.pages_fetched, 0);
        assert_eq!(crawler.get_visited_count().await, 0);
    }

    #[test]
    fn test_event_callback_rejected_once_state_is_shared() {
        let crawler = Crawler::new(test_config("https://example.com".to_string())).unwrap();
        let _running = Arc::clone(&crawler.context);

        let result = crawler.with_event_callback(Arc::new(|_event: CrawlEvent| {}));
        assert!(matches!(result, Err(ScanError::Other(_))));
    }

    #[test]
    fn test_target_domain_is_lowercased() {
        let config = test_config("https://example.com".to_string())
            .with_target_domain(" WadesPlumbingAndSeptic.com ");
        let crawler = Crawler::new(config).unwrap();
        assert_eq!(crawler.context.target_domain, "wadesplumbingandseptic.com");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = CrawlConfig::default().with_max_concurrency(0);
        assert!(Crawler::new(config).is_err());
    }
}
