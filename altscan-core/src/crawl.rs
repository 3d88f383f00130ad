use altscan_scanner::crawler::{DEFAULT_BATCH_SIZE, DEFAULT_MAX_DEPTH, DEFAULT_MAX_PAGES};
use altscan_scanner::fetcher::DEFAULT_TIMEOUT_SECS;
use altscan_scanner::{CrawlReport, Crawler, RecordCallback};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use url::Url;

/// Where a crawl starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlTarget {
    /// Follow links breadth-first from a single page
    Site(String),
    /// Visit every page listed by a sitemap (or sitemap index), without following links
    Sitemap(String),
}

impl CrawlTarget {
    pub fn url(&self) -> &str {
        match self {
            CrawlTarget::Site(url) | CrawlTarget::Sitemap(url) => url,
        }
    }

    pub fn mode_label(&self) -> &'static str {
        match self {
            CrawlTarget::Site(_) => "site crawl",
            CrawlTarget::Sitemap(_) => "sitemap",
        }
    }
}

/// Options for configuring a crawl operation
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub target: CrawlTarget,
    pub max_pages: usize,
    pub max_depth: usize,
    pub stay_on_domain: bool,
    pub include_external_images: bool,
    /// Host treated as on-site; the target URL's host when unset.
    pub base_domain: Option<String>,
    pub batch_size: usize,
    pub timeout_secs: u64,
    pub show_progress_bars: bool,
}

impl CrawlOptions {
    pub fn new(target: CrawlTarget) -> Self {
        Self {
            target,
            max_pages: DEFAULT_MAX_PAGES,
            max_depth: DEFAULT_MAX_DEPTH,
            stay_on_domain: true,
            include_external_images: false,
            base_domain: None,
            batch_size: DEFAULT_BATCH_SIZE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            show_progress_bars: false,
        }
    }
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

fn progress_message(count: usize, max_pages: usize, url: &str) -> String {
    format!("Analyzing page {}/{}: {}", count, max_pages, extract_url_path(url))
}

/// Build the scanner for `options`.
pub fn build_crawler(options: &CrawlOptions) -> Result<Crawler, String> {
    let crawler = Crawler::with_timeout(options.timeout_secs)
        .map_err(|e| format!("Failed to build HTTP client: {}", e))?;
    Ok(configure_crawler(crawler, options))
}

/// Apply the limits and domain policy of `options` to an existing scanner.
pub fn configure_crawler(crawler: Crawler, options: &CrawlOptions) -> Crawler {
    let crawler = crawler
        .with_max_pages(options.max_pages)
        .with_max_depth(options.max_depth)
        .with_stay_on_domain(options.stay_on_domain)
        .with_include_external_images(options.include_external_images)
        .with_batch_size(options.batch_size);
    match options.base_domain {
        Some(ref domain) => crawler.with_base_domain(domain.clone()),
        None => crawler,
    }
}

/// Execute a crawl with the given options
pub async fn execute_crawl(
    options: CrawlOptions,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<CrawlReport, String> {
    let crawler = build_crawler(&options)?;
    execute_crawl_with(crawler, options, progress_callback, None).await
}

/// Like [`execute_crawl`], but with a caller-supplied scanner and an optional
/// per-image callback.
pub async fn execute_crawl_with(
    crawler: Crawler,
    options: CrawlOptions,
    progress_callback: Option<CrawlProgressCallback>,
    record_callback: Option<RecordCallback>,
) -> Result<CrawlReport, String> {
    let max_pages = options.max_pages;

    let progress_bar = if options.show_progress_bars {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .map_err(|e| format!("Invalid progress template: {}", e))?;
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Starting crawl...");
        Some(pb)
    } else {
        None
    };

    let pb_clone = progress_bar.clone();
    let user_callback = progress_callback.clone();
    let page_callback: altscan_scanner::ProgressCallback =
        Arc::new(move |count: usize, url: String| {
            let message = progress_message(count, max_pages, &url);
            if let Some(ref pb) = pb_clone {
                pb.set_message(message.clone());
            }
            if let Some(ref callback) = user_callback {
                callback(message);
            }
        });

    let mut crawler = configure_crawler(crawler, &options).with_progress_callback(page_callback);
    if let Some(callback) = record_callback {
        crawler = crawler.with_record_callback(callback);
    }

    info!(
        "Starting {} of {} (max pages {}, max depth {})",
        options.target.mode_label(),
        options.target.url(),
        options.max_pages,
        options.max_depth
    );

    let outcome = match &options.target {
        CrawlTarget::Site(url) => crawler.crawl(url).await,
        CrawlTarget::Sitemap(url) => crawler.crawl_sitemap(url).await,
    };

    match outcome {
        Ok(report) => {
            if let Some(ref pb) = progress_bar {
                pb.finish_with_message(format!(
                    "Crawl complete! {} pages analyzed",
                    report.stats.pages_visited
                ));
            }
            Ok(report)
        }
        Err(e) => {
            if let Some(ref pb) = progress_bar {
                pb.finish_and_clear();
            }
            Err(format!("Failed to crawl {}: {}", options.target.url(), e))
        }
    }
}
