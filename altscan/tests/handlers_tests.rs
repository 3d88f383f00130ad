use altscan::commands::command_argument_builder;
use altscan::handlers::*;
use altscan_core::crawl::CrawlTarget;
use altscan_core::report::ReportFormat;
use clap::ArgMatches;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn subcommand_matches(args: &[&str]) -> (String, ArgMatches) {
    let matches = command_argument_builder()
        .try_get_matches_from(args.iter().copied())
        .expect("arguments should parse");
    let (name, sub) = matches.subcommand().expect("subcommand");
    (name.to_string(), sub.clone())
}

// ============================================================================
// URL Parsing Tests
// ============================================================================

#[test]
fn test_parse_url_line_with_scheme() {
    let result = parse_url_line("https://example.com");
    assert_eq!(result, Some("https://example.com".to_string()));
}

#[test]
fn test_parse_url_line_without_scheme() {
    let result = parse_url_line("example.com");
    assert_eq!(result, Some("http://example.com".to_string()));
}

#[test]
fn test_parse_url_line_host_and_port() {
    let result = parse_url_line("localhost:3000/docs");
    assert_eq!(result, Some("http://localhost:3000/docs".to_string()));
}

#[test]
fn test_parse_url_line_trims_whitespace() {
    let result = parse_url_line("  https://example.com/page  ");
    assert_eq!(result, Some("https://example.com/page".to_string()));
}

#[test]
fn test_parse_url_line_invalid() {
    assert_eq!(parse_url_line("not a valid url!!!"), None);
    assert_eq!(parse_url_line(""), None);
    assert_eq!(parse_url_line("   "), None);
}

// ============================================================================
// Logging Tests
// ============================================================================

#[test]
fn test_default_log_level() {
    assert_eq!(default_log_level(false), "warn");
    assert_eq!(default_log_level(true), "info");
}

#[test]
fn test_init_logging_twice_is_harmless() {
    init_logging(false);
    init_logging(true);
}

// ============================================================================
// Argument Mapping Tests
// ============================================================================

#[test]
fn test_crawl_defaults() {
    let (name, sub) = subcommand_matches(&["altscan", "crawl", "example.com"]);
    assert_eq!(name, "crawl");

    let options = crawl_options_from_args(
        CrawlTarget::Site("http://example.com".to_string()),
        &sub,
        true,
    );
    assert_eq!(options.max_pages, 50);
    assert_eq!(options.max_depth, 3);
    assert_eq!(options.batch_size, 5);
    assert_eq!(options.timeout_secs, 30);
    assert!(options.stay_on_domain);
    assert!(!options.include_external_images);
    assert!(options.base_domain.is_none());
    assert!(!options.show_progress_bars);

    let (format, report_options) = report_settings_from_args(&sub).unwrap();
    assert_eq!(format, ReportFormat::Text);
    assert!(!report_options.missing_only);
}

#[test]
fn test_crawl_overrides() {
    let (_, sub) = subcommand_matches(&[
        "altscan",
        "crawl",
        "https://example.com",
        "--max-pages",
        "10",
        "--max-depth",
        "1",
        "--batch-size",
        "0",
        "--timeout",
        "5",
        "--allow-offsite",
        "--include-external-images",
        "--domain",
        "WWW.Example.com",
        "--format",
        "csv",
        "--missing-only",
    ]);

    let options = crawl_options_from_args(
        CrawlTarget::Site("https://example.com".to_string()),
        &sub,
        false,
    );
    assert_eq!(options.max_pages, 10);
    assert_eq!(options.max_depth, 1);
    assert_eq!(options.batch_size, 1);
    assert_eq!(options.timeout_secs, 5);
    assert!(!options.stay_on_domain);
    assert!(options.include_external_images);
    assert_eq!(options.base_domain.as_deref(), Some("www.example.com"));
    assert!(options.show_progress_bars);

    let (format, report_options) = report_settings_from_args(&sub).unwrap();
    assert_eq!(format, ReportFormat::Csv);
    assert!(report_options.missing_only);
}

#[test]
fn test_sitemap_has_no_depth_or_offsite_flags() {
    assert!(
        command_argument_builder()
            .try_get_matches_from(["altscan", "sitemap", "https://ex.com/sitemap.xml", "--max-depth", "2"])
            .is_err()
    );

    let (name, sub) = subcommand_matches(&["altscan", "sitemap", "https://ex.com/sitemap.xml"]);
    assert_eq!(name, "sitemap");
    let options = crawl_options_from_args(
        CrawlTarget::Sitemap("https://ex.com/sitemap.xml".to_string()),
        &sub,
        true,
    );
    assert_eq!(options.max_depth, 3);
    assert!(options.stay_on_domain);
}

#[test]
fn test_unknown_format_rejected() {
    assert!(
        command_argument_builder()
            .try_get_matches_from(["altscan", "crawl", "example.com", "--format", "html"])
            .is_err()
    );
}

#[test]
fn test_global_flags_after_subcommand() {
    let matches = command_argument_builder()
        .try_get_matches_from(["altscan", "crawl", "example.com", "-q", "-v"])
        .unwrap();
    assert!(matches.get_flag("quiet"));
    assert!(matches.get_flag("verbose"));
}

// ============================================================================
// Handler Tests
// ============================================================================

#[tokio::test]
async fn test_handle_crawl_writes_report() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string(
                    r#"<html><body><img src="/a.png"><img src="/b.png" alt="B"></body></html>"#,
                ),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("report.csv");
    let url = format!("{}/", server.uri());
    let output_arg = output.to_string_lossy().to_string();
    let (_, sub) = subcommand_matches(&[
        "altscan",
        "crawl",
        &url,
        "--format",
        "csv",
        "--output",
        &output_arg,
    ]);

    handle_crawl(&sub, true).await.unwrap();

    let written = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines[0], "#,Page URL,Image URL,Alt Text,Status,Duplicate");
    assert_eq!(lines.len(), 3);
    assert!(lines[1].ends_with("/a.png,,Missing,No"));
    assert!(lines[2].ends_with("/b.png,B,OK,No"));
}

#[tokio::test]
async fn test_handle_sitemap_missing_sitemap_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let url = format!("{}/sitemap.xml", server.uri());
    let (_, sub) = subcommand_matches(&["altscan", "sitemap", &url]);

    let err = handle_sitemap(&sub, true).await.unwrap_err();
    assert!(err.to_string().contains("Failed to crawl"));
}

#[tokio::test]
async fn test_handle_crawl_invalid_url() {
    let (_, sub) = subcommand_matches(&["altscan", "crawl", "not a valid url!!!"]);
    let err = handle_crawl(&sub, true).await.unwrap_err();
    assert!(err.to_string().contains("Invalid URL"));
}
