//! Sitemap expansion.
//!
//! A sitemap is either a `<urlset>` listing pages or a `<sitemapindex>`
//! listing further sitemaps. The resolver walks indexes depth-first in
//! document order and returns every page URL it finds, repeats included.

use crate::error::{Result, ScanError};
use crate::fetcher::PageFetcher;
use crate::normalize;
use futures::FutureExt;
use futures::future::BoxFuture;
use quick_xml::NsReader;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How many index levels below the top-level sitemap are expanded.
pub const DEFAULT_MAX_NESTING: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SitemapNode {
    SitemapIndex { child_sitemap_urls: Vec<String> },
    UrlSet { page_urls: Vec<String> },
}

impl SitemapNode {
    pub fn len(&self) -> usize {
        match self {
            SitemapNode::SitemapIndex { child_sitemap_urls } => child_sitemap_urls.len(),
            SitemapNode::UrlSet { page_urls } => page_urls.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Namespace of `<urlset>`, `<sitemapindex>` and their entries.
pub const SITEMAP_NAMESPACE: &[u8] = b"http://www.sitemaps.org/schemas/sitemap/0.9";

#[derive(Clone, Copy, PartialEq, Eq)]
enum RootKind {
    Index,
    UrlSet,
}

impl RootKind {
    fn entry_element(self) -> &'static [u8] {
        match self {
            RootKind::Index => b"sitemap",
            RootKind::UrlSet => b"url",
        }
    }
}

/// Unprefixed elements with no declared namespace are accepted as sitemap elements.
fn in_sitemap_namespace(ns: &ResolveResult) -> bool {
    match ns {
        ResolveResult::Unbound => true,
        ResolveResult::Bound(Namespace(uri)) => *uri == SITEMAP_NAMESPACE,
        ResolveResult::Unknown(_) => false,
    }
}

/// Classify and parse a sitemap document fetched from `url`.
///
/// Elements are matched by namespace and local name, so both the default
/// sitemap namespace and prefixed forms (`<sm:urlset>`) are understood while
/// extension children such as `<image:loc>` are ignored. Only the first
/// `<loc>` directly inside each `<url>`/`<sitemap>` entry is taken. Relative
/// `<loc>` values are resolved against `url`.
pub fn parse_sitemap(url: &str, xml: &str) -> Result<SitemapNode> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut root: Option<RootKind> = None;
    let mut depth = 0usize;
    let mut in_entry = false;
    let mut entry_has_loc = false;
    let mut in_loc = false;
    let mut loc = String::new();
    let mut locs = Vec::new();

    loop {
        match reader.read_resolved_event() {
            Ok((ns, Event::Start(e))) => {
                depth += 1;
                let sitemap_element = in_sitemap_namespace(&ns);
                let name = e.local_name();
                match (depth, root) {
                    (1, _) => root = Some(root_kind(url, name.as_ref(), sitemap_element)?),
                    (2, Some(kind)) if sitemap_element && name.as_ref() == kind.entry_element() => {
                        in_entry = true;
                        entry_has_loc = false;
                    }
                    (3, Some(_))
                        if in_entry && !entry_has_loc && sitemap_element && name.as_ref() == b"loc" =>
                    {
                        in_loc = true;
                        loc.clear();
                    }
                    _ => {}
                }
            }
            Ok((ns, Event::Empty(e))) => {
                if depth == 0 {
                    root = Some(root_kind(url, e.local_name().as_ref(), in_sitemap_namespace(&ns))?);
                }
            }
            Ok((_, Event::Text(t))) => {
                if in_loc {
                    let text = t
                        .unescape()
                        .map_err(|e| ScanError::malformed_sitemap(url, e.to_string()))?;
                    loc.push_str(&text);
                }
            }
            Ok((_, Event::CData(c))) => {
                if in_loc {
                    loc.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Ok((_, Event::End(_))) => {
                if depth == 3 && in_loc {
                    in_loc = false;
                    entry_has_loc = true;
                    let value = loc.trim();
                    if !value.is_empty() {
                        match normalize::resolve_str(url, value) {
                            Ok(resolved) => locs.push(resolved),
                            Err(e) => debug!("Skipping sitemap entry {}: {}", value, e),
                        }
                    }
                } else if depth == 2 {
                    in_entry = false;
                }
                depth = depth.saturating_sub(1);
            }
            Ok((_, Event::Eof)) => break,
            Ok(_) => {}
            Err(e) => return Err(ScanError::malformed_sitemap(url, e.to_string())),
        }
    }

    match root {
        Some(RootKind::Index) => Ok(SitemapNode::SitemapIndex {
            child_sitemap_urls: locs,
        }),
        Some(RootKind::UrlSet) => Ok(SitemapNode::UrlSet { page_urls: locs }),
        None => Err(ScanError::malformed_sitemap(url, "document has no root element")),
    }
}

fn root_kind(url: &str, local_name: &[u8], sitemap_element: bool) -> Result<RootKind> {
    let kind = match local_name {
        b"sitemapindex" => Some(RootKind::Index),
        b"urlset" => Some(RootKind::UrlSet),
        _ => None,
    };
    match kind {
        Some(kind) if sitemap_element => Ok(kind),
        Some(_) => Err(ScanError::malformed_sitemap(
            url,
            format!(
                "root element <{}> is not in the sitemap namespace",
                String::from_utf8_lossy(local_name)
            ),
        )),
        None => Err(ScanError::malformed_sitemap(
            url,
            format!(
                "unrecognized root element <{}>, expected <sitemapindex> or <urlset>",
                String::from_utf8_lossy(local_name)
            ),
        )),
    }
}

/// Expands a sitemap (index) into page URLs.
pub struct SitemapResolver {
    fetcher: Arc<dyn PageFetcher>,
    max_nesting: usize,
}

impl SitemapResolver {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }

    pub fn with_max_nesting(mut self, max_nesting: usize) -> Self {
        self.max_nesting = max_nesting;
        self
    }

    /// Fetch and parse a single sitemap document.
    pub async fn load(&self, url: &str) -> Result<SitemapNode> {
        let xml = self.fetcher.fetch(url).await?;
        debug!("Fetched sitemap {} ({} bytes)", url, xml.len());
        parse_sitemap(url, &xml)
    }

    /// Page URLs reachable from `url`, in document order.
    ///
    /// Failure to load `url` itself is returned; failures of nested sitemaps
    /// are logged and contribute nothing.
    pub async fn resolve(&self, url: &str) -> Result<Vec<String>> {
        info!("Resolving sitemap {}", url);
        let root = self.load(url).await?;
        let mut seen = HashSet::from([url.to_string()]);
        let pages = self.expand(root, 0, &mut seen).await;
        info!("Sitemap {} listed {} page URLs", url, pages.len());
        Ok(pages)
    }

    fn expand<'a>(
        &'a self,
        node: SitemapNode,
        level: usize,
        seen: &'a mut HashSet<String>,
    ) -> BoxFuture<'a, Vec<String>> {
        async move {
            let children = match node {
                SitemapNode::UrlSet { page_urls } => return page_urls,
                SitemapNode::SitemapIndex { child_sitemap_urls } => child_sitemap_urls,
            };
            debug!("Sitemap index at level {} lists {} sitemaps", level, children.len());

            let mut pages = Vec::new();
            if level >= self.max_nesting {
                warn!(
                    "Sitemap nesting deeper than {} levels, skipping {} child sitemaps",
                    self.max_nesting,
                    children.len()
                );
                return pages;
            }

            for child in children {
                if !seen.insert(child.clone()) {
                    warn!("Sitemap {} already expanded, skipping", child);
                    continue;
                }
                match self.load(&child).await {
                    Ok(node) => {
                        let found = self.expand(node, level + 1, &mut *seen).await;
                        debug!("Found {} URLs in sitemap {}", found.len(), child);
                        pages.extend(found);
                    }
                    Err(e) => warn!("Error processing sub-sitemap {}: {}", child, e),
                }
            }
            pages
        }
        .boxed()
    }
}

/// Drop repeated URLs, keeping the first occurrence and the original order.
pub fn dedup_urls(urls: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter().filter(|u| seen.insert(u.clone())).collect()
}
