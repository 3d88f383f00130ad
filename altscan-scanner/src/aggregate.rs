use crate::result::{CrawlReport, CrawlStats, ImageRecord, ImageRow};
use std::sync::Arc;

/// Callback for rows as they are produced, before the crawl finishes.
pub type RecordCallback = Arc<dyn Fn(ImageRow) + Send + Sync>;

/// Running counters plus the ordered record list of one crawl.
#[derive(Default)]
pub struct ReportAggregator {
    stats: CrawlStats,
    records: Vec<ImageRecord>,
    record_callback: Option<RecordCallback>,
}

impl ReportAggregator {
    pub fn new(record_callback: Option<RecordCallback>) -> Self {
        Self {
            stats: CrawlStats::default(),
            records: Vec::new(),
            record_callback,
        }
    }

    pub fn page_visited(&mut self) {
        self.stats.pages_visited += 1;
    }

    pub fn add(&mut self, record: ImageRecord) {
        self.stats.images_total += 1;
        if record.has_missing_alt() {
            self.stats.images_missing_alt += 1;
        }
        if record.is_duplicate {
            self.stats.images_duplicate += 1;
        }
        if let Some(ref callback) = self.record_callback {
            callback(record.to_row());
        }
        self.records.push(record);
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = ImageRecord>) {
        for record in records {
            self.add(record);
        }
    }

    pub fn stats(&self) -> CrawlStats {
        self.stats
    }

    pub fn finish(self) -> CrawlReport {
        CrawlReport {
            records: self.records,
            stats: self.stats,
        }
    }
}
