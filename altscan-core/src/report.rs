// Report generation from crawl results

use altscan_scanner::result::{CrawlReport, CrawlSummary, ImageRecord, percent};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Above this share of missing alt text the summary carries a warning.
pub const MISSING_ALT_WARNING_PERCENT: u8 = 30;

pub const CSV_HEADER: [&str; 6] = ["#", "Page URL", "Image URL", "Alt Text", "Status", "Duplicate"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
    Csv,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "csv" => Some(ReportFormat::Csv),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
        }
    }
}

/// What the report is about, shown in its header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportContext {
    pub target: String,
    pub mode: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    /// Only list images without alt text (the summary still counts everything).
    pub missing_only: bool,
}

/// Records selected for listing, paired with their 1-based position in the crawl.
fn listed_records<'a>(
    report: &'a CrawlReport,
    options: &ReportOptions,
) -> impl Iterator<Item = (usize, &'a ImageRecord)> {
    let missing_only = options.missing_only;
    report
        .records
        .iter()
        .enumerate()
        .map(|(idx, record)| (idx + 1, record))
        .filter(move |(_, record)| !missing_only || record.has_missing_alt())
}

pub fn status_label(record: &ImageRecord) -> &'static str {
    if record.has_missing_alt() { "Missing" } else { "OK" }
}

pub fn generate_summary(summary: &CrawlSummary) -> String {
    let mut out = String::new();
    let with_alt = summary.images_total - summary.images_missing_alt;

    out.push_str(&format!("Pages analyzed:           {}\n", summary.pages_visited));
    out.push_str(&format!("Total images found:       {}\n", summary.images_total));
    out.push_str(&format!(
        "Images missing alt text:  {} ({}%)\n",
        summary.images_missing_alt, summary.missing_alt_percent
    ));
    out.push_str(&format!(
        "Images with alt text:     {} ({}%)\n",
        with_alt,
        percent(with_alt, summary.images_total)
    ));
    out.push_str(&format!(
        "Duplicate images:         {} ({}%)\n",
        summary.images_duplicate, summary.duplicate_percent
    ));

    if summary.missing_alt_percent > MISSING_ALT_WARNING_PERCENT {
        out.push_str(&format!(
            "\n[!] More than {}% of images are missing alt text.\n",
            MISSING_ALT_WARNING_PERCENT
        ));
    }
    out
}

pub fn generate_text_report(
    report: &CrawlReport,
    context: &ReportContext,
    options: &ReportOptions,
) -> String {
    let summary = report.summary();
    let mut out = String::new();

    out.push_str(RULE);
    out.push('\n');
    out.push_str("                          IMAGE ALT TEXT REPORT\n");
    out.push_str(RULE);
    out.push_str("\n\n");
    out.push_str(&format!("Target:       {}\n", context.target));
    out.push_str(&format!("Mode:         {}\n", context.mode));
    out.push('\n');

    out.push_str(RULE);
    out.push('\n');
    out.push_str("SUMMARY\n");
    out.push_str(RULE);
    out.push_str("\n\n");
    out.push_str(&generate_summary(&summary));
    out.push('\n');

    // Group by page, in the order pages were analyzed
    let mut pages: Vec<(&str, Vec<(usize, &ImageRecord)>)> = Vec::new();
    for (idx, record) in listed_records(report, options) {
        match pages.last_mut() {
            Some((page, rows)) if *page == record.page_url => rows.push((idx, record)),
            _ => pages.push((record.page_url.as_str(), vec![(idx, record)])),
        }
    }

    if !pages.is_empty() {
        out.push_str(RULE);
        out.push('\n');
        out.push_str(if options.missing_only {
            "IMAGES MISSING ALT TEXT\n"
        } else {
            "IMAGES\n"
        });
        out.push_str(RULE);
        out.push_str("\n\n");

        for (page, rows) in pages {
            out.push_str(&format!("## {}\n", page));
            for (idx, record) in rows {
                let alt = if record.has_missing_alt() {
                    "[MISSING]".to_string()
                } else {
                    format!("\"{}\"", shorten_text(&record.alt_text, 60))
                };
                let duplicate = if record.is_duplicate { " (duplicate)" } else { "" };
                out.push_str(&format!(
                    "  {:>4}. {} {}{}\n",
                    idx, alt, record.source_url, duplicate
                ));
            }
            out.push('\n');
        }
    }

    out.push_str(RULE);
    out.push('\n');
    out.push_str("Images with an empty or absent alt attribute are reported as missing.\n");
    out.push_str("Lazy-loaded sources (data-src, data-lazy-src, data-original, lazy-src) are included.\n");
    out
}

pub fn generate_json_report(
    report: &CrawlReport,
    context: &ReportContext,
) -> Result<String, serde_json::Error> {
    let images: Vec<_> = report
        .records
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            serde_json::json!({
                "index": idx + 1,
                "pageUrl": record.page_url,
                "imageUrl": record.source_url,
                "altText": record.alt_text,
                "hasMissingAlt": record.has_missing_alt(),
                "isDuplicate": record.is_duplicate,
                "width": record.width,
                "height": record.height,
            })
        })
        .collect();

    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "altscan",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "target": context.target,
            "mode": context.mode,
            "summary": report.summary(),
            "images": images
        }
    });

    serde_json::to_string_pretty(&json_report)
}

/// CSV export, one row per listed image.
pub fn generate_csv_report(report: &CrawlReport, options: &ReportOptions) -> Result<String, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for (idx, record) in listed_records(report, options) {
        writer.write_record([
            idx.to_string().as_str(),
            record.page_url.as_str(),
            record.source_url.as_str(),
            record.alt_text.as_str(),
            status_label(record),
            if record.is_duplicate { "Yes" } else { "No" },
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn render_report(
    report: &CrawlReport,
    context: &ReportContext,
    format: ReportFormat,
    options: &ReportOptions,
) -> Result<String, String> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(report, context, options)),
        ReportFormat::Json => generate_json_report(report, context)
            .map_err(|e| format!("Failed to render JSON report: {}", e)),
        ReportFormat::Csv => generate_csv_report(report, options)
            .map_err(|e| format!("Failed to render CSV report: {}", e)),
    }
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

/// Cut `text` to `max_len` characters, marking the cut with "...".
pub fn shorten_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_len).collect();
    format!("{}...", cut)
}
