use crate::extract::ImageCandidate;
use crate::normalize::{self, is_document_url, is_same_host};
use crate::result::ImageRecord;
use std::collections::HashSet;
use tracing::debug;
use url::Url;

/// Domain scoping rules for one crawl.
#[derive(Debug, Clone)]
pub struct DomainPolicy {
    pub base_domain: String,
    pub stay_on_domain: bool,
    pub include_external_images: bool,
}

impl DomainPolicy {
    pub fn new(base_domain: impl Into<String>) -> Self {
        Self {
            base_domain: base_domain.into(),
            stay_on_domain: true,
            include_external_images: false,
        }
    }

    pub fn allows_image(&self, url: &Url) -> bool {
        self.include_external_images || is_same_host(url, &self.base_domain)
    }

    pub fn allows_link(&self, url: &Url) -> bool {
        !self.stay_on_domain || is_same_host(url, &self.base_domain)
    }
}

/// Resolves, filters and fingerprints the images and links of fetched pages.
#[derive(Debug)]
pub struct ImageClassifier {
    policy: DomainPolicy,
    fingerprints: HashSet<String>,
}

impl ImageClassifier {
    pub fn new(policy: DomainPolicy) -> Self {
        Self {
            policy,
            fingerprints: HashSet::new(),
        }
    }

    /// Turn a page's candidates into records, dropping unresolvable and
    /// off-domain images and flagging repeats of an earlier fingerprint.
    pub fn classify_images(&mut self, page_url: &Url, candidates: Vec<ImageCandidate>) -> Vec<ImageRecord> {
        let mut records = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let source = match normalize::resolve(page_url, &candidate.source) {
                Ok(url) => url,
                Err(e) => {
                    debug!("Invalid image URL {} on page {}: {}", candidate.source, page_url, e);
                    continue;
                }
            };
            if !self.policy.allows_image(&source) {
                debug!("Skipping external image: {}", source);
                continue;
            }

            let mut record = ImageRecord {
                source_url: source.to_string(),
                alt_text: candidate.alt_text,
                page_url: page_url.to_string(),
                width: candidate.width,
                height: candidate.height,
                is_duplicate: false,
            };
            record.is_duplicate = !self.fingerprints.insert(record.fingerprint());
            records.push(record);
        }
        records
    }

    /// Resolve raw hrefs into frontier URLs, applying the extension denylist
    /// and the link domain policy. Order is preserved, repeats removed.
    pub fn classify_links(&self, page_url: &Url, hrefs: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut links = Vec::new();
        for href in hrefs {
            let url = match normalize::resolve_link(page_url, href) {
                Ok(url) => url,
                Err(e) => {
                    debug!("Invalid URL {} on page {}: {}", href, page_url, e);
                    continue;
                }
            };
            if !is_document_url(&url) {
                continue;
            }
            if !self.policy.allows_link(&url) {
                debug!(
                    "Skipping external domain: {} != {}",
                    url.host_str().unwrap_or_default(),
                    self.policy.base_domain
                );
                continue;
            }
            let url = String::from(url);
            if seen.insert(url.clone()) {
                links.push(url);
            }
        }
        links
    }

    pub fn fingerprint_count(&self) -> usize {
        self.fingerprints.len()
    }
}
