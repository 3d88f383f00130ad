use serde::{Deserialize, Serialize};

/// An `<img>` that survived extraction and policy filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub source_url: String,
    pub alt_text: String,
    pub page_url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub is_duplicate: bool,
}

impl ImageRecord {
    pub fn has_missing_alt(&self) -> bool {
        self.alt_text.is_empty()
    }

    /// Key used to spot the same image (with the same alt text) across pages.
    pub fn fingerprint(&self) -> String {
        format!("{}|{}", self.source_url, self.alt_text)
    }

    pub fn to_row(&self) -> ImageRow {
        ImageRow {
            page_url: self.page_url.clone(),
            image_url: self.source_url.clone(),
            alt_text: self.alt_text.clone(),
            has_missing_alt: self.has_missing_alt(),
            is_duplicate: self.is_duplicate,
        }
    }
}

/// Per-image row handed to callers as records are produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRow {
    pub page_url: String,
    pub image_url: String,
    pub alt_text: String,
    pub has_missing_alt: bool,
    pub is_duplicate: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlStats {
    pub pages_visited: usize,
    pub images_total: usize,
    pub images_missing_alt: usize,
    pub images_duplicate: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlSummary {
    pub pages_visited: usize,
    pub images_total: usize,
    pub images_missing_alt: usize,
    pub images_duplicate: usize,
    pub missing_alt_percent: u8,
    pub duplicate_percent: u8,
}

impl From<CrawlStats> for CrawlSummary {
    fn from(stats: CrawlStats) -> Self {
        Self {
            pages_visited: stats.pages_visited,
            images_total: stats.images_total,
            images_missing_alt: stats.images_missing_alt,
            images_duplicate: stats.images_duplicate,
            missing_alt_percent: percent(stats.images_missing_alt, stats.images_total),
            duplicate_percent: percent(stats.images_duplicate, stats.images_total),
        }
    }
}

/// Rounded (half up) share of `part` in `total`, 0 for an empty total.
pub fn percent(part: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let part = part.min(total) as u128;
    let total = total as u128;
    ((200 * part + total) / (2 * total)) as u8
}

/// Terminal result of a crawl.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlReport {
    pub records: Vec<ImageRecord>,
    pub stats: CrawlStats,
}

impl CrawlReport {
    pub fn summary(&self) -> CrawlSummary {
        CrawlSummary::from(self.stats)
    }

    pub fn missing_alt(&self) -> impl Iterator<Item = &ImageRecord> {
        self.records.iter().filter(|r| r.has_missing_alt())
    }
}
