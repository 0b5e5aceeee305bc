use anyhow::{Context, anyhow};
use backscout_core::crawl::{CrawlOptions, CrawlProgressCallback, execute_crawl};
use backscout_core::report::{ReportData, ReportFormat, render_report, save_report};
use backscout_scanner::CrawlConfig;
use backscout_scanner::resolver::{ensure_scheme, is_crawlable};
use clap::ArgMatches;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};
use tracing_subscriber::filter::LevelFilter;

/// Flags of the `crawl` subcommand, before they are merged into a config.
#[derive(Debug, Clone, Default)]
pub struct CrawlArgs {
    pub urls: Vec<String>,
    pub hosts_file: Option<PathBuf>,
    pub target: Option<String>,
    pub max_depth: Option<usize>,
    pub threads: Option<usize>,
    pub timeout: Option<u64>,
    pub keywords: Option<Vec<String>>,
    pub config_path: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub format: String,
}

impl CrawlArgs {
    pub fn from_matches(sub_matches: &ArgMatches) -> Self {
        Self {
            urls: sub_matches
                .get_many::<String>("url")
                .map(|values| values.cloned().collect())
                .unwrap_or_default(),
            hosts_file: sub_matches.get_one::<PathBuf>("hosts-file").cloned(),
            target: sub_matches.get_one::<String>("target").cloned(),
            max_depth: sub_matches.get_one::<usize>("max-depth").copied(),
            threads: sub_matches.get_one::<usize>("threads").copied(),
            timeout: sub_matches.get_one::<u64>("timeout").copied(),
            keywords: sub_matches
                .get_many::<String>("keyword")
                .map(|values| values.cloned().collect()),
            config_path: sub_matches.get_one::<PathBuf>("config").cloned(),
            output: sub_matches.get_one::<PathBuf>("output").cloned(),
            format: sub_matches
                .get_one::<String>("format")
                .cloned()
                .unwrap_or_else(|| "text".to_string()),
        }
    }
}

// Helper functions for crawl handler

/// Load seeds from either a file or the `--url` arguments.
///
/// An empty result means no seeds were given and the configured ones apply.
pub fn load_urls_from_source(
    urls: &[String],
    hosts_file: Option<&PathBuf>,
) -> Result<Vec<String>, String> {
    if let Some(hosts_file_path) = hosts_file {
        load_urls_from_file(hosts_file_path)
    } else {
        let parsed: Vec<String> = urls.iter().filter_map(|url| parse_url_line(url)).collect();
        if !urls.is_empty() && parsed.is_empty() {
            return Err("None of the --url values is a valid URL".to_string());
        }
        Ok(parsed)
    }
}

/// Load and parse URLs from a file
pub fn load_urls_from_file(path: &PathBuf) -> Result<Vec<String>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read hosts file {}: {}", path.display(), e))?;

    let urls: Vec<String> = content.lines().filter_map(parse_url_line).collect();

    if urls.is_empty() {
        return Err(format!("No valid URLs found in {}", path.display()));
    }

    Ok(urls)
}

/// Parse a single line as a seed URL, adding https:// when no scheme is given.
/// Blank lines and `#` comments yield `None` silently.
pub fn parse_url_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let candidate = ensure_scheme(line);
    if is_crawlable(&candidate) {
        Some(candidate)
    } else {
        warn!("Skipping invalid URL '{}'", line);
        None
    }
}

/// Merge defaults, the optional config file and command-line flags, in that
/// order of precedence.
pub fn build_config(args: &CrawlArgs) -> anyhow::Result<CrawlConfig> {
    let mut config = match args.config_path {
        Some(ref path) => CrawlConfig::from_file(&path.to_string_lossy())
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => CrawlConfig::default(),
    };

    let seeds = load_urls_from_source(&args.urls, args.hosts_file.as_ref())
        .map_err(|e| anyhow!(e))
        .context("Failed to load seed URLs")?;
    if !seeds.is_empty() {
        config.seeds = seeds;
    }

    if let Some(ref target) = args.target {
        config.target_domain = target.trim().to_string();
    }
    if let Some(max_depth) = args.max_depth {
        config.max_depth = max_depth;
    }
    if let Some(threads) = args.threads {
        config.max_concurrency = threads;
    }
    if let Some(timeout) = args.timeout {
        config.fetch_timeout_secs = timeout;
    }
    if let Some(ref keywords) = args.keywords {
        config.relevance_keywords = keywords.clone();
    }

    config.validate().context("Invalid crawl settings")?;
    debug!(?config, "Resolved crawl configuration");
    Ok(config)
}

/// Install the stderr fmt subscriber. `quiet` wins over `verbose`.
pub fn init_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        LevelFilter::WARN
    } else if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_crawl_settings(config: &CrawlConfig) {
    println!(
        "\n{} Searching for backlinks to {}",
        "→".blue().bold(),
        config.target_domain.bright_white().bold()
    );
    println!("Seeds: {}", config.seeds.len());
    println!("Workers: {}", config.max_concurrency);
    println!("Max depth: {}", config.max_depth);
    println!("Keywords: {}\n", config.relevance_keywords.join(", "));
}

pub async fn handle_crawl(sub_matches: &ArgMatches, quiet: bool) -> anyhow::Result<()> {
    let args = CrawlArgs::from_matches(sub_matches);
    let format = ReportFormat::from_str(&args.format)
        .ok_or_else(|| anyhow!("Unknown report format '{}'", args.format))?;
    let config = build_config(&args)?;

    if !quiet {
        print_crawl_settings(&config);
    }

    let options = CrawlOptions {
        config,
        show_progress_bars: !quiet,
    };

    let progress_callback: CrawlProgressCallback = Arc::new(|msg: String| {
        println!("{}", msg);
    });

    let summary = execute_crawl(options, (!quiet).then_some(progress_callback))
        .await
        .map_err(|e| anyhow!(e))
        .context("Crawl failed")?;

    if !quiet {
        println!("\n{} Crawl complete!\n", "✓".green().bold());
    }

    let data = ReportData::from_summary(&summary);
    let report = render_report(&data, format).context("Failed to render report")?;

    match args.output {
        Some(ref path) => {
            save_report(&report, path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            if !quiet {
                println!(
                    "{} Report saved to {}",
                    "✓".green().bold(),
                    path.display().to_string().bright_white()
                );
            }
        }
        None => print!("{}", report),
    }

    Ok(())
}
