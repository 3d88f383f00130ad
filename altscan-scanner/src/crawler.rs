use crate::aggregate::{RecordCallback, ReportAggregator};
use crate::classify::{DomainPolicy, ImageClassifier};
use crate::error::{Result, ScanError};
use crate::extract::{PageExtract, extract_page};
use crate::fetcher::{HttpFetcher, PageFetcher};
use crate::frontier::{Frontier, FrontierEntry};
use crate::result::CrawlReport;
use crate::sitemap::{SitemapResolver, dedup_urls};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Called on the coordinator for every page taken off the frontier, with the
/// running page count and the page URL.
pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

pub const DEFAULT_MAX_PAGES: usize = 50;
pub const DEFAULT_MAX_DEPTH: usize = 3;
pub const DEFAULT_BATCH_SIZE: usize = 5;

pub struct Crawler {
    fetcher: Arc<dyn PageFetcher>,
    max_pages: usize,
    max_depth: usize,
    stay_on_domain: bool,
    include_external_images: bool,
    batch_size: usize,
    base_domain: Option<String>,
    progress_callback: Option<ProgressCallback>,
    record_callback: Option<RecordCallback>,
}

/// State owned by one crawl invocation. Only the coordinator touches it.
struct CrawlSession {
    frontier: Frontier,
    classifier: ImageClassifier,
    aggregator: ReportAggregator,
}

impl CrawlSession {
    /// Fold one fetched page into the session: record its images and, when
    /// `follow_links` is set and depth allows, queue its links.
    fn absorb_page(&mut self, entry: &FrontierEntry, extract: PageExtract, follow_links: bool) {
        let page_url = match Url::parse(&entry.url) {
            Ok(url) => url,
            Err(e) => {
                warn!("Skipping page with unparsable URL {}: {}", entry.url, e);
                return;
            }
        };

        let records = self.classifier.classify_images(&page_url, extract.images);
        debug!("Processed {} images on {}", records.len(), entry.url);
        self.aggregator.extend(records);

        if follow_links && self.frontier.can_expand(entry.depth) {
            let links = self.classifier.classify_links(&page_url, &extract.links);
            let found = links.len();
            let queued = self.frontier.enqueue_discovered(entry.depth, links);
            debug!(
                "[depth {}] {}: {} links kept, {} new queued",
                entry.depth, entry.url, found, queued
            );
        }
    }
}

impl Crawler {
    pub fn new() -> Result<Self> {
        Ok(Self::with_fetcher(Arc::new(HttpFetcher::new()?)))
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        Ok(Self::with_fetcher(Arc::new(HttpFetcher::with_timeout(
            timeout_secs,
        )?)))
    }

    pub fn with_fetcher(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            max_pages: DEFAULT_MAX_PAGES,
            max_depth: DEFAULT_MAX_DEPTH,
            stay_on_domain: true,
            include_external_images: false,
            batch_size: DEFAULT_BATCH_SIZE,
            base_domain: None,
            progress_callback: None,
            record_callback: None,
        }
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_stay_on_domain(mut self, stay_on_domain: bool) -> Self {
        self.stay_on_domain = stay_on_domain;
        self
    }

    pub fn with_include_external_images(mut self, include: bool) -> Self {
        self.include_external_images = include;
        self
    }

    /// Pages fetched concurrently per batch. Zero is treated as one.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Override the domain used for scoping (defaults to the entry URL's host).
    pub fn with_base_domain(mut self, domain: String) -> Self {
        self.base_domain = Some(domain);
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn with_record_callback(mut self, callback: RecordCallback) -> Self {
        self.record_callback = Some(callback);
        self
    }

    /// Breadth-first crawl from `start_url`.
    ///
    /// A failure to fetch the start page is returned; any later page failure
    /// is logged and counted as a visited page with no images or links.
    pub async fn crawl(&self, start_url: &str) -> Result<CrawlReport> {
        let start = parse_entry_url(start_url)?;
        let base_domain = self.base_domain_for(&start);
        info!(
            "Starting crawl of {} (max pages {}, max depth {}, stay on domain {})",
            start, self.max_pages, self.max_depth, self.stay_on_domain
        );

        let mut session = self.new_session(base_domain);
        session.frontier.push(start.to_string(), 0);
        self.drain(&mut session, true).await?;

        let report = session.aggregator.finish();
        info!(
            "Crawl complete. Visited {} pages, found {} images",
            report.stats.pages_visited, report.stats.images_total
        );
        Ok(report)
    }

    /// Analyze every page listed by a sitemap (index), without following links.
    ///
    /// The page list is deduplicated and capped at the page budget. A failure
    /// to load the top-level sitemap is returned.
    pub async fn crawl_sitemap(&self, sitemap_url: &str) -> Result<CrawlReport> {
        let sitemap = parse_entry_url(sitemap_url)?;
        let base_domain = self.base_domain_for(&sitemap);

        let resolver = SitemapResolver::new(self.fetcher.clone());
        let listed = resolver.resolve(sitemap.as_str()).await?;
        let pages = dedup_urls(listed);
        info!(
            "Sitemap {} lists {} unique pages, analyzing up to {}",
            sitemap,
            pages.len(),
            self.max_pages
        );

        let mut session = self.new_session(base_domain);
        for page in pages {
            session.frontier.push(page, 0);
        }
        self.drain(&mut session, false).await?;

        let report = session.aggregator.finish();
        info!(
            "Sitemap analysis complete. Visited {} pages, found {} images",
            report.stats.pages_visited, report.stats.images_total
        );
        Ok(report)
    }

    fn base_domain_for(&self, entry: &Url) -> String {
        self.base_domain
            .clone()
            .unwrap_or_else(|| entry.host_str().unwrap_or_default().to_string())
    }

    fn new_session(&self, base_domain: String) -> CrawlSession {
        let policy = DomainPolicy {
            base_domain,
            stay_on_domain: self.stay_on_domain,
            include_external_images: self.include_external_images,
        };
        CrawlSession {
            frontier: Frontier::new(self.max_pages, self.max_depth),
            classifier: ImageClassifier::new(policy),
            aggregator: ReportAggregator::new(self.record_callback.clone()),
        }
    }

    /// Process the frontier in batches until it is empty or the budget is spent.
    ///
    /// Fetches within a batch run concurrently; their results are applied to
    /// the session one at a time, in dequeue order, once the batch completes.
    async fn drain(&self, session: &mut CrawlSession, follow_links: bool) -> Result<()> {
        // When following links the frontier starts with the entry page alone,
        // and losing it leaves nothing to report.
        let mut first_page = follow_links;

        loop {
            let batch = session.frontier.next_batch(self.batch_size);
            if batch.is_empty() {
                break;
            }

            for entry in &batch {
                session.aggregator.page_visited();
                if let Some(ref callback) = self.progress_callback {
                    callback(session.aggregator.stats().pages_visited, entry.url.clone());
                }
                debug!("Crawling [{}] {}", entry.depth, entry.url);
            }

            let outcomes = self.fetch_batch(&batch).await;

            for (entry, outcome) in batch.iter().zip(outcomes) {
                match outcome {
                    Ok(extract) => session.absorb_page(entry, extract, follow_links),
                    Err(e) if first_page => return Err(e),
                    Err(e) => warn!("Error processing {}: {}", entry.url, e),
                }
                first_page = false;
            }
        }

        Ok(())
    }

    async fn fetch_batch(&self, batch: &[FrontierEntry]) -> Vec<Result<PageExtract>> {
        let handles: Vec<_> = batch
            .iter()
            .map(|entry| {
                let fetcher = self.fetcher.clone();
                let url = entry.url.clone();
                tokio::spawn(async move { fetch_page(fetcher.as_ref(), &url).await })
            })
            .collect();

        join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.unwrap_or_else(|e| Err(ScanError::from(e))))
            .collect()
    }
}

async fn fetch_page(fetcher: &dyn PageFetcher, url: &str) -> Result<PageExtract> {
    let html = fetcher.fetch(url).await?;
    let extract = extract_page(&html);
    debug!(
        "Found {} image elements and {} links on {}",
        extract.images.len(),
        extract.links.len(),
        url
    );
    Ok(extract)
}

fn parse_entry_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| ScanError::MalformedUrl(format!("{} ({})", raw, e)))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ScanError::MalformedUrl(format!(
            "{} is not an http(s) URL",
            raw
        )));
    }
    url.set_fragment(None);
    Ok(url)
}
