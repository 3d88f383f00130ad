pub mod aggregate;
pub mod classify;
pub mod crawler;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod frontier;
pub mod normalize;
pub mod result;
pub mod sitemap;

pub use aggregate::RecordCallback;
pub use crawler::{Crawler, ProgressCallback};
pub use error::ScanError;
pub use fetcher::{HttpFetcher, PageFetcher};
pub use result::{CrawlReport, CrawlStats, CrawlSummary, ImageRecord, ImageRow};
pub use sitemap::{SitemapNode, SitemapResolver};
