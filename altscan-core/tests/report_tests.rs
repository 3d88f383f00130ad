// Tests for report generation functionality

use altscan_core::report::{
    CSV_HEADER, ReportContext, ReportFormat, ReportOptions, generate_csv_report,
    generate_json_report, generate_summary, generate_text_report, render_report, save_report,
    shorten_text, status_label,
};
use altscan_scanner::result::{CrawlReport, CrawlStats, ImageRecord};

fn record(page: &str, src: &str, alt: &str, duplicate: bool) -> ImageRecord {
    ImageRecord {
        source_url: src.to_string(),
        alt_text: alt.to_string(),
        page_url: page.to_string(),
        width: None,
        height: None,
        is_duplicate: duplicate,
    }
}

fn sample_report() -> CrawlReport {
    CrawlReport {
        records: vec![
            record("https://ex.com/", "https://ex.com/logo.png", "Company logo", false),
            record("https://ex.com/", "https://ex.com/hero.jpg", "", false),
            record("https://ex.com/about", "https://ex.com/logo.png", "Company logo", true),
            record("https://ex.com/about", "https://ex.com/team.jpg", "", false),
        ],
        stats: CrawlStats {
            pages_visited: 2,
            images_total: 4,
            images_missing_alt: 2,
            images_duplicate: 1,
        },
    }
}

fn context() -> ReportContext {
    ReportContext {
        target: "https://ex.com/".to_string(),
        mode: "site crawl".to_string(),
    }
}

// ============================================================================
// Report Format Tests
// ============================================================================

#[test]
fn test_report_format_from_str_text() {
    assert!(matches!(ReportFormat::from_str("text"), Some(ReportFormat::Text)));
    assert!(matches!(ReportFormat::from_str("txt"), Some(ReportFormat::Text)));
}

#[test]
fn test_report_format_from_str_json() {
    assert!(matches!(ReportFormat::from_str("json"), Some(ReportFormat::Json)));
}

#[test]
fn test_report_format_from_str_csv() {
    assert!(matches!(ReportFormat::from_str("csv"), Some(ReportFormat::Csv)));
}

#[test]
fn test_report_format_from_str_case_insensitive() {
    assert!(matches!(ReportFormat::from_str("TEXT"), Some(ReportFormat::Text)));
    assert!(matches!(ReportFormat::from_str("Json"), Some(ReportFormat::Json)));
    assert!(matches!(ReportFormat::from_str("CSV"), Some(ReportFormat::Csv)));
}

#[test]
fn test_report_format_from_str_invalid() {
    assert!(ReportFormat::from_str("html").is_none());
    assert!(ReportFormat::from_str("").is_none());
}

#[test]
fn test_report_format_extension() {
    assert_eq!(ReportFormat::Text.extension(), "txt");
    assert_eq!(ReportFormat::Json.extension(), "json");
    assert_eq!(ReportFormat::Csv.extension(), "csv");
}

// ============================================================================
// Summary Tests
// ============================================================================

#[test]
fn test_summary_counts_and_percentages() {
    let summary = generate_summary(&sample_report().summary());
    assert!(summary.contains("Pages analyzed:           2"));
    assert!(summary.contains("Total images found:       4"));
    assert!(summary.contains("Images missing alt text:  2 (50%)"));
    assert!(summary.contains("Images with alt text:     2 (50%)"));
    assert!(summary.contains("Duplicate images:         1 (25%)"));
    assert!(summary.contains("[!] More than 30%"));
}

#[test]
fn test_summary_empty_crawl() {
    let report = CrawlReport {
        records: vec![],
        stats: CrawlStats {
            pages_visited: 1,
            ..Default::default()
        },
    };
    let summary = generate_summary(&report.summary());
    assert!(summary.contains("Images missing alt text:  0 (0%)"));
    assert!(summary.contains("Images with alt text:     0 (0%)"));
    assert!(!summary.contains("[!]"));
}

#[test]
fn test_status_label() {
    let report = sample_report();
    assert_eq!(status_label(&report.records[0]), "OK");
    assert_eq!(status_label(&report.records[1]), "Missing");
}

// ============================================================================
// Text Report Tests
// ============================================================================

#[test]
fn test_text_report_groups_by_page() {
    let text = generate_text_report(&sample_report(), &context(), &ReportOptions::default());

    assert!(text.contains("IMAGE ALT TEXT REPORT"));
    assert!(text.contains("Target:       https://ex.com/"));
    assert!(text.contains("Mode:         site crawl"));

    let home = text.find("## https://ex.com/\n").unwrap();
    let about = text.find("## https://ex.com/about\n").unwrap();
    assert!(home < about);

    assert!(text.contains("1. \"Company logo\" https://ex.com/logo.png\n"));
    assert!(text.contains("2. [MISSING] https://ex.com/hero.jpg\n"));
    assert!(text.contains("3. \"Company logo\" https://ex.com/logo.png (duplicate)\n"));
}

#[test]
fn test_text_report_missing_only() {
    let options = ReportOptions { missing_only: true };
    let text = generate_text_report(&sample_report(), &context(), &options);

    assert!(text.contains("IMAGES MISSING ALT TEXT"));
    assert!(text.contains("https://ex.com/hero.jpg"));
    assert!(text.contains("https://ex.com/team.jpg"));
    assert!(!text.contains("\"Company logo\""));
    // Summary still covers every image
    assert!(text.contains("Total images found:       4"));
}

#[test]
fn test_text_report_shortens_long_alt() {
    let long_alt = "a".repeat(100);
    let report = CrawlReport {
        records: vec![record("https://ex.com/", "https://ex.com/x.png", &long_alt, false)],
        stats: CrawlStats {
            pages_visited: 1,
            images_total: 1,
            images_missing_alt: 0,
            images_duplicate: 0,
        },
    };
    let text = generate_text_report(&report, &context(), &ReportOptions::default());
    assert!(text.contains(&format!("\"{}...\"", "a".repeat(60))));
    assert!(!text.contains(&long_alt));
}

// ============================================================================
// JSON Report Tests
// ============================================================================

#[test]
fn test_json_report_structure() {
    let json = generate_json_report(&sample_report(), &context()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let report = &value["report"];

    assert_eq!(report["metadata"]["generator"], "altscan");
    assert!(report["metadata"]["generated_at"].is_string());
    assert_eq!(report["target"], "https://ex.com/");
    assert_eq!(report["summary"]["imagesTotal"], 4);
    assert_eq!(report["summary"]["missingAltPercent"], 50);

    let images = report["images"].as_array().unwrap();
    assert_eq!(images.len(), 4);
    assert_eq!(images[1]["imageUrl"], "https://ex.com/hero.jpg");
    assert_eq!(images[1]["hasMissingAlt"], true);
    assert_eq!(images[2]["isDuplicate"], true);
    assert_eq!(images[3]["index"], 4);
}

// ============================================================================
// CSV Report Tests
// ============================================================================

#[test]
fn test_csv_report_rows() {
    let csv_text = generate_csv_report(&sample_report(), &ReportOptions::default()).unwrap();
    let mut reader = csv::ReaderBuilder::new().from_reader(csv_text.as_bytes());

    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, CSV_HEADER);

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 4);
    assert_eq!(&rows[0][0], "1");
    assert_eq!(&rows[0][4], "OK");
    assert_eq!(&rows[1][4], "Missing");
    assert_eq!(&rows[2][5], "Yes");
    assert_eq!(&rows[3][5], "No");
}

#[test]
fn test_csv_report_quotes_commas() {
    let report = CrawlReport {
        records: vec![record(
            "https://ex.com/",
            "https://ex.com/a.png",
            "Red, white and \"blue\"",
            false,
        )],
        stats: CrawlStats {
            pages_visited: 1,
            images_total: 1,
            images_missing_alt: 0,
            images_duplicate: 0,
        },
    };
    let csv_text = generate_csv_report(&report, &ReportOptions::default()).unwrap();
    assert!(csv_text.contains("\"Red, white and \"\"blue\"\"\""));
}

#[test]
fn test_csv_report_missing_only_keeps_positions() {
    let options = ReportOptions { missing_only: true };
    let csv_text = generate_csv_report(&sample_report(), &options).unwrap();
    let mut reader = csv::ReaderBuilder::new().from_reader(csv_text.as_bytes());
    let indexes: Vec<String> = reader
        .records()
        .map(|r| r.unwrap()[0].to_string())
        .collect();
    assert_eq!(indexes, vec!["2", "4"]);
}

// ============================================================================
// Rendering and Saving Tests
// ============================================================================

#[test]
fn test_render_report_dispatches_on_format() {
    let report = sample_report();
    let options = ReportOptions::default();

    let text = render_report(&report, &context(), ReportFormat::Text, &options).unwrap();
    assert!(text.contains("SUMMARY"));

    let json = render_report(&report, &context(), ReportFormat::Json, &options).unwrap();
    assert!(json.trim_start().starts_with('{'));

    let csv_text = render_report(&report, &context(), ReportFormat::Csv, &options).unwrap();
    assert!(csv_text.starts_with("#,Page URL,Image URL,Alt Text,Status,Duplicate"));
}

#[test]
fn test_save_report_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.txt");
    save_report("hello report", &path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello report");
}

#[test]
fn test_save_report_bad_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("report.txt");
    assert!(save_report("x", &path).is_err());
}

// ============================================================================
// Text Shortening Tests
// ============================================================================

#[test]
fn test_shorten_text_short_input_unchanged() {
    assert_eq!(shorten_text("short", 10), "short");
    assert_eq!(shorten_text("exactly10!", 10), "exactly10!");
}

#[test]
fn test_shorten_text_truncates_on_chars() {
    assert_eq!(shorten_text("abcdefghij", 4), "abcd...");
    assert_eq!(shorten_text("ééééé", 2), "éé...");
}
