// Report generation from crawl summaries

use crate::crawl::{extract_url_host, extract_url_path};
use backscout_scanner::{Backlink, CrawlSummary};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const HEAVY_RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n";
const LIGHT_RULE: &str = "────────────────────────────────────────────────────────────────────────────────\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
    Csv,
    Markdown,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "csv" => Some(ReportFormat::Csv),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportData {
    pub target_domain: String,
    pub seeds: Vec<String>,
    pub generated_at: i64,
    pub stats: CrawlStats,
    pub backlinks: Vec<Backlink>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlStats {
    pub pages_fetched: usize,
    pub pages_failed: usize,
    pub duplicates_skipped: usize,
    pub backlinks_recorded: usize,
    pub peak_concurrency: usize,
    pub elapsed_ms: u128,
}

impl ReportData {
    pub fn from_summary(summary: &CrawlSummary) -> Self {
        let mut backlinks = summary.backlinks.clone();
        backlinks.sort_by(|a, b| a.target_url.cmp(&b.target_url));

        Self {
            target_domain: summary.target_domain.clone(),
            seeds: summary.seeds.clone(),
            generated_at: chrono::Utc::now().timestamp(),
            stats: CrawlStats {
                pages_fetched: summary.pages_fetched,
                pages_failed: summary.pages_failed,
                duplicates_skipped: summary.duplicates_skipped,
                backlinks_recorded: summary.backlinks_recorded,
                peak_concurrency: summary.peak_concurrency,
                elapsed_ms: summary.elapsed.as_millis(),
            },
            backlinks,
        }
    }

    fn format_timestamp(&self) -> String {
        use chrono::{DateTime, Utc};
        let datetime =
            DateTime::<Utc>::from_timestamp(self.generated_at, 0).unwrap_or_else(Utc::now);
        datetime.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    }

    fn format_seeds(&self) -> String {
        if self.seeds.len() == 1 {
            self.seeds[0].clone()
        } else {
            format!("{} URLs", self.seeds.len())
        }
    }

    fn elapsed_secs(&self) -> f64 {
        self.stats.elapsed_ms as f64 / 1000.0
    }

    /// Backlinks grouped by the host of the page that links out.
    fn by_source_host(&self) -> BTreeMap<String, Vec<&Backlink>> {
        let mut by_host: BTreeMap<String, Vec<&Backlink>> = BTreeMap::new();
        for backlink in &self.backlinks {
            by_host
                .entry(extract_url_host(&backlink.source_url))
                .or_default()
                .push(backlink);
        }
        by_host
    }
}

pub fn generate_text_report(data: &ReportData) -> String {
    let mut report = String::new();

    // Header
    report.push_str(HEAVY_RULE);
    report.push_str("                          BACKSCOUT BACKLINK REPORT\n");
    report.push_str(HEAVY_RULE);
    report.push('\n');

    report.push_str(&format!("Target:       {}\n", data.target_domain));
    report.push_str(&format!("Generated:    {}\n", data.format_timestamp()));
    report.push_str(&format!("Seeds:        {}\n", data.format_seeds()));
    report.push_str(&format!("Duration:     {:.1} seconds\n", data.elapsed_secs()));
    report.push('\n');

    // Summary
    report.push_str(HEAVY_RULE);
    report.push_str("SUMMARY\n");
    report.push_str(HEAVY_RULE);
    report.push('\n');
    report.push_str(&format!("  Pages crawled:      {}\n", data.stats.pages_fetched));
    report.push_str(&format!("  Pages skipped:      {}\n", data.stats.pages_failed));
    report.push_str(&format!("  Duplicate links:    {}\n", data.stats.duplicates_skipped));
    report.push_str(&format!("  Peak concurrency:   {}\n", data.stats.peak_concurrency));
    report.push_str(&format!("  Backlinks found:    {}\n", data.backlinks.len()));
    report.push('\n');

    // Backlinks
    report.push_str(HEAVY_RULE);
    report.push_str("BACKLINKS\n");
    report.push_str(HEAVY_RULE);
    report.push('\n');

    if data.backlinks.is_empty() {
        report.push_str(&format!("  No backlinks found for {}\n\n", data.target_domain));
    } else {
        for (host, backlinks) in data.by_source_host() {
            report.push_str(&format!("## {}\n", host));
            report.push_str(&format!("  {} backlink(s)\n\n", backlinks.len()));

            for backlink in backlinks {
                report.push_str(&format!("  Source: {}\n", backlink.source_url));
                report.push_str(&format!("  Target: {}\n\n", backlink.target_url));
            }
            report.push_str(LIGHT_RULE);
            report.push('\n');
        }
    }

    // Footer
    report.push_str(HEAVY_RULE);
    report.push_str("                               End of Report\n");
    report.push_str(HEAVY_RULE);

    report
}

pub fn generate_json_report(data: &ReportData) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "backscout",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": format_iso8601_timestamp(data.generated_at),
                "format": "json"
            },
            "crawl": {
                "target_domain": data.target_domain,
                "seeds": data.seeds,
                "duration_seconds": data.elapsed_secs()
            },
            "summary": {
                "pages_fetched": data.stats.pages_fetched,
                "pages_failed": data.stats.pages_failed,
                "duplicates_skipped": data.stats.duplicates_skipped,
                "backlinks_recorded": data.stats.backlinks_recorded,
                "peak_concurrency": data.stats.peak_concurrency,
                "total_backlinks": data.backlinks.len()
            },
            "backlinks": data.backlinks
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn generate_csv_report(data: &ReportData) -> String {
    let mut report = String::from("source_url,target_url\n");
    for backlink in &data.backlinks {
        report.push_str(&format!(
            "{},{}\n",
            escape_csv_field(&backlink.source_url),
            escape_csv_field(&backlink.target_url)
        ));
    }
    report
}

pub fn generate_markdown_report(data: &ReportData) -> String {
    let mut report = String::new();

    report.push_str(&format!("# Backlink report for `{}`\n\n", data.target_domain));
    report.push_str(&format!("_Generated {}_\n\n", data.format_timestamp()));

    report.push_str("## Summary\n\n");
    report.push_str("| Metric | Value |\n");
    report.push_str("|--------|-------|\n");
    report.push_str(&format!("| Seeds | {} |\n", data.seeds.len()));
    report.push_str(&format!("| Pages crawled | {} |\n", data.stats.pages_fetched));
    report.push_str(&format!("| Pages skipped | {} |\n", data.stats.pages_failed));
    report.push_str(&format!("| Peak concurrency | {} |\n", data.stats.peak_concurrency));
    report.push_str(&format!("| Backlinks found | {} |\n", data.backlinks.len()));
    report.push_str(&format!("| Duration | {:.1}s |\n\n", data.elapsed_secs()));

    report.push_str("## Backlinks\n\n");
    if data.backlinks.is_empty() {
        report.push_str("No backlinks found.\n");
        return report;
    }

    report.push_str("| Source | Path | Target |\n");
    report.push_str("|--------|------|--------|\n");
    for backlink in &data.backlinks {
        report.push_str(&format!(
            "| {} | `{}` | {} |\n",
            escape_markdown_cell(&extract_url_host(&backlink.source_url)),
            escape_markdown_cell(&extract_url_path(&backlink.source_url)),
            escape_markdown_cell(&backlink.target_url)
        ));
    }

    report
}

pub fn render_report(data: &ReportData, format: ReportFormat) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(data)),
        ReportFormat::Json => generate_json_report(data),
        ReportFormat::Csv => Ok(generate_csv_report(data)),
        ReportFormat::Markdown => Ok(generate_markdown_report(data)),
    }
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

fn escape_csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn escape_markdown_cell(cell: &str) -> String {
    cell.replace('|', "\\|")
}

fn format_iso8601_timestamp(timestamp: i64) -> String {
    use chrono::{DateTime, Utc};
    let datetime = DateTime::<Utc>::from_timestamp(timestamp, 0).unwrap_or_else(Utc::now);
    datetime.to_rfc3339()
}
