use backscout::commands::command_argument_builder;
use backscout::handlers::*;
use backscout_scanner::config::{DEFAULT_MAX_DEPTH, DEFAULT_SEEDS};
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

fn crawl_args(argv: &[&str]) -> CrawlArgs {
    let mut full = vec!["backscout", "crawl"];
    full.extend_from_slice(argv);
    let matches = command_argument_builder()
        .try_get_matches_from(full)
        .unwrap();
    let (_, sub_matches) = matches.subcommand().unwrap();
    CrawlArgs::from_matches(sub_matches)
}

// ============================================================================
// Seed parsing
// ============================================================================

#[test]
fn test_parse_url_line_with_scheme() {
    let result = parse_url_line("http://example.com");
    assert_eq!(result, Some("http://example.com".to_string()));
}

#[test]
fn test_parse_url_line_without_scheme() {
    let result = parse_url_line("www.yelp.com");
    assert_eq!(result, Some("https://www.yelp.com".to_string()));
}

#[test]
fn test_parse_url_line_trims_whitespace() {
    let result = parse_url_line("  www.bbb.org  ");
    assert_eq!(result, Some("https://www.bbb.org".to_string()));
}

#[test]
fn test_parse_url_line_comment_and_blank() {
    assert_eq!(parse_url_line("# directories"), None);
    assert_eq!(parse_url_line("   "), None);
}

#[test]
fn test_parse_url_line_invalid() {
    let result = parse_url_line("not a valid url!!!");
    assert_eq!(result, None);
}

#[test]
fn test_load_urls_from_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut temp_file = NamedTempFile::new()?;
    writeln!(temp_file, "# business directories")?;
    writeln!(temp_file, "https://www.yelp.com")?;
    writeln!(temp_file, "www.angi.com")?;
    writeln!(temp_file)?; // Empty line
    writeln!(temp_file, "http://www.mapquest.com")?;

    let path = PathBuf::from(temp_file.path());
    let urls = load_urls_from_file(&path)?;

    assert_eq!(urls.len(), 3);
    assert_eq!(urls[0], "https://www.yelp.com");
    assert_eq!(urls[1], "https://www.angi.com");
    assert_eq!(urls[2], "http://www.mapquest.com");

    Ok(())
}

#[test]
fn test_load_urls_from_file_empty() {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(temp_file).unwrap();
    writeln!(temp_file, "# only a comment").unwrap();

    let path = PathBuf::from(temp_file.path());
    let result = load_urls_from_file(&path);

    assert!(result.is_err());
    assert!(result.unwrap_err().contains("No valid URLs"));
}

#[test]
fn test_load_urls_from_file_missing() {
    let path = PathBuf::from("/definitely/not/here/seeds.txt");
    let result = load_urls_from_file(&path);

    assert!(result.unwrap_err().contains("Failed to read hosts file"));
}

#[test]
fn test_load_urls_from_source_urls() {
    let urls = vec!["www.yelp.com".to_string(), "https://www.bbb.org".to_string()];
    let result = load_urls_from_source(&urls, None).unwrap();

    assert_eq!(result, vec!["https://www.yelp.com", "https://www.bbb.org"]);
}

#[test]
fn test_load_urls_from_source_no_input() {
    let result = load_urls_from_source(&[], None).unwrap();
    assert!(result.is_empty());
}

#[test]
fn test_load_urls_from_source_all_invalid() {
    let urls = vec!["not a valid url!!!".to_string()];
    assert!(load_urls_from_source(&urls, None).is_err());
}

// ============================================================================
// Argument parsing
// ============================================================================

#[test]
fn test_crawl_args_defaults() {
    let args = crawl_args(&[]);

    assert!(args.urls.is_empty());
    assert!(args.keywords.is_none());
    assert_eq!(args.max_depth, None);
    assert_eq!(args.format, "text");
}

#[test]
fn test_crawl_args_repeatable_flags() {
    let args = crawl_args(&[
        "-u", "www.yelp.com", "-u", "www.bbb.org", "-k", "hvac", "-k", "furnace", "-t", "4",
        "-d", "2", "--timeout", "7", "-T", "example.com", "-f", "md",
    ]);

    assert_eq!(args.urls, vec!["www.yelp.com", "www.bbb.org"]);
    assert_eq!(
        args.keywords,
        Some(vec!["hvac".to_string(), "furnace".to_string()])
    );
    assert_eq!(args.threads, Some(4));
    assert_eq!(args.max_depth, Some(2));
    assert_eq!(args.timeout, Some(7));
    assert_eq!(args.target.as_deref(), Some("example.com"));
    assert_eq!(args.format, "md");
}

#[test]
fn test_url_conflicts_with_hosts_file() {
    let result = command_argument_builder().try_get_matches_from([
        "backscout", "crawl", "-u", "www.yelp.com", "-H", "seeds.txt",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_unknown_format_rejected() {
    let result =
        command_argument_builder().try_get_matches_from(["backscout", "crawl", "-f", "html"]);
    assert!(result.is_err());
}

// ============================================================================
// Config precedence
// ============================================================================

#[test]
fn test_build_config_defaults() {
    let config = build_config(&crawl_args(&[])).unwrap();

    assert_eq!(config.seeds.len(), DEFAULT_SEEDS.len());
    assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    assert_eq!(config.target_domain, "wadesplumbingandseptic.com");
}

#[test]
fn test_build_config_flags_override_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut config_file = NamedTempFile::new()?;
    write!(
        config_file,
        r#"{{"target_domain": "from-file.example", "max_depth": 5, "max_concurrency": 2}}"#
    )?;
    let config_path = config_file.path().to_string_lossy().to_string();

    let config = build_config(&crawl_args(&["-c", &config_path, "-d", "1"]))?;

    assert_eq!(config.target_domain, "from-file.example");
    assert_eq!(config.max_concurrency, 2);
    assert_eq!(config.max_depth, 1);
    // Fields absent from the file keep their defaults.
    assert_eq!(config.fetch_timeout_secs, 30);

    Ok(())
}

#[test]
fn test_build_config_seeds_from_hosts_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut hosts = NamedTempFile::new()?;
    writeln!(hosts, "www.bbb.org")?;
    let hosts_path = hosts.path().to_string_lossy().to_string();

    let config = build_config(&crawl_args(&["-H", &hosts_path]))?;

    assert_eq!(config.seeds, vec!["https://www.bbb.org"]);
    Ok(())
}

#[test]
fn test_build_config_keywords_replace_defaults() {
    let config = build_config(&crawl_args(&["-k", "roofing"])).unwrap();
    assert_eq!(config.relevance_keywords, vec!["roofing"]);
}

#[test]
fn test_build_config_rejects_zero_threads() {
    let result = build_config(&crawl_args(&["-t", "0"]));
    assert!(result.is_err());
}

#[test]
fn test_build_config_missing_config_file() {
    let result = build_config(&crawl_args(&["-c", "/definitely/not/here.json"]));
    let err = result.unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to load config file"));
}
