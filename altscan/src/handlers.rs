use altscan_core::crawl::{CrawlOptions, CrawlTarget, execute_crawl};
use altscan_core::report::{
    MISSING_ALT_WARNING_PERCENT, ReportContext, ReportFormat, ReportOptions, render_report,
    save_report,
};
use altscan_scanner::CrawlSummary;
use anyhow::{Context, anyhow};
use clap::ArgMatches;
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Parse a single line as a URL, trying to add http:// if needed
pub fn parse_url_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    // Try to parse as-is
    if let Ok(url) = Url::parse(line)
        && matches!(url.scheme(), "http" | "https")
    {
        return Some(line.to_string());
    }

    // Try adding http://
    let with_scheme = format!("http://{}", line);
    match Url::parse(&with_scheme) {
        Ok(url) if url.host_str().is_some_and(|h| !h.is_empty()) => Some(with_scheme),
        _ => None,
    }
}

/// Default log directive when RUST_LOG is not set.
pub fn default_log_level(verbose: bool) -> &'static str {
    if verbose { "info" } else { "warn" }
}

/// Install the stderr tracing subscriber. RUST_LOG wins over `verbose`.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_level(verbose)));
    // A subscriber may already be installed (tests call this repeatedly); keep the first.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_divider() {
    eprintln!("{}", "═".repeat(60).bright_blue().bold());
}

/// Build crawl options from the subcommand's arguments.
pub fn crawl_options_from_args(target: CrawlTarget, args: &ArgMatches, quiet: bool) -> CrawlOptions {
    let mut options = CrawlOptions::new(target);

    if let Some(max_pages) = args.get_one::<usize>("max-pages") {
        options.max_pages = *max_pages;
    }
    if let Ok(Some(max_depth)) = args.try_get_one::<usize>("max-depth") {
        options.max_depth = *max_depth;
    }
    if let Some(batch_size) = args.get_one::<usize>("batch-size") {
        options.batch_size = (*batch_size).max(1);
    }
    if let Some(timeout) = args.get_one::<u64>("timeout") {
        options.timeout_secs = *timeout;
    }
    if let Ok(Some(allow_offsite)) = args.try_get_one::<bool>("allow-offsite") {
        options.stay_on_domain = !*allow_offsite;
    }
    if let Some(domain) = args.get_one::<String>("domain") {
        options.base_domain = Some(domain.trim().to_lowercase());
    }
    options.include_external_images = args.get_flag("include-external-images");
    options.show_progress_bars = !quiet;
    options
}

/// Report format and filtering chosen on the command line.
pub fn report_settings_from_args(args: &ArgMatches) -> anyhow::Result<(ReportFormat, ReportOptions)> {
    let format_name = args
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("text");
    let format = ReportFormat::from_str(format_name)
        .ok_or_else(|| anyhow!("Unsupported report format '{}'", format_name))?;
    let options = ReportOptions {
        missing_only: args.get_flag("missing-only"),
    };
    Ok((format, options))
}

fn target_url(args: &ArgMatches) -> anyhow::Result<String> {
    let raw = args
        .get_one::<String>("URL")
        .ok_or_else(|| anyhow!("A URL is required"))?;
    parse_url_line(raw).ok_or_else(|| anyhow!("Invalid URL '{}'", raw))
}

pub async fn handle_crawl(sub_matches: &ArgMatches, quiet: bool) -> anyhow::Result<()> {
    let url = target_url(sub_matches)?;
    let options = crawl_options_from_args(CrawlTarget::Site(url), sub_matches, quiet);

    if !quiet {
        print_divider();
        eprintln!("{} {}", "Crawling".bright_cyan().bold(), options.target.url());
        eprintln!("Max pages: {}", options.max_pages);
        eprintln!("Max depth: {}", options.max_depth);
        eprintln!("Batch size: {}", options.batch_size);
        eprintln!(
            "Cross-domain: {}",
            if options.stay_on_domain {
                "disabled (same host only)"
            } else {
                "enabled"
            }
        );
        print_divider();
    }

    run_and_report(options, sub_matches, quiet).await
}

pub async fn handle_sitemap(sub_matches: &ArgMatches, quiet: bool) -> anyhow::Result<()> {
    let url = target_url(sub_matches)?;
    let options = crawl_options_from_args(CrawlTarget::Sitemap(url), sub_matches, quiet);

    if !quiet {
        print_divider();
        eprintln!("{} {}", "Reading sitemap".bright_cyan().bold(), options.target.url());
        eprintln!("Max pages: {}", options.max_pages);
        eprintln!("Batch size: {}", options.batch_size);
        print_divider();
    }

    run_and_report(options, sub_matches, quiet).await
}

async fn run_and_report(options: CrawlOptions, args: &ArgMatches, quiet: bool) -> anyhow::Result<()> {
    let (format, report_options) = report_settings_from_args(args)?;
    let output = args.get_one::<PathBuf>("output");
    let context = ReportContext {
        target: options.target.url().to_string(),
        mode: options.target.mode_label().to_string(),
    };

    let report = execute_crawl(options, None).await.map_err(anyhow::Error::msg)?;
    info!("Rendering {:?} report for {}", format, context.target);

    if !quiet {
        eprintln!("\n{}", "✓ Crawl complete!".green().bold());
        print_summary_line(&report.summary());
    }

    let rendered = render_report(&report, &context, format, &report_options).map_err(anyhow::Error::msg)?;

    match output {
        Some(path) => {
            save_report(&rendered, path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            if !quiet {
                eprintln!("{} {}", "✓ Report saved to".green(), path.display());
            }
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

fn print_summary_line(summary: &CrawlSummary) {
    let line = format!(
        "{} pages, {} images, {} missing alt text ({}%), {} duplicates",
        summary.pages_visited,
        summary.images_total,
        summary.images_missing_alt,
        summary.missing_alt_percent,
        summary.images_duplicate
    );
    if summary.missing_alt_percent > MISSING_ALT_WARNING_PERCENT {
        eprintln!("{}", line.red().bold());
    } else {
        eprintln!("{}", line.green());
    }
    eprintln!();
}
