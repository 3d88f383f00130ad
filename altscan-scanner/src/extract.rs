use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::debug;

static IMG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("static selector"));
static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("static selector"));

/// Attributes lazy-loading libraries park the real image source in, by priority.
pub const LAZY_SOURCE_ATTRIBUTES: &[&str] = &["data-src", "data-lazy-src", "data-original", "lazy-src"];

/// `src` values that are stand-ins for a lazily loaded image.
const PLACEHOLDER_MARKERS: &[&str] = &["blank.gif", "placeholder"];

const MIN_SOURCE_LEN: usize = 5;
const MIN_DIMENSION: u32 = 50;

const SKIPPED_LINK_PREFIXES: &[&str] = &["#", "javascript:", "mailto:", "tel:"];

/// An `<img>` as written in the markup, source not yet resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCandidate {
    pub source: String,
    pub alt_text: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageExtract {
    pub images: Vec<ImageCandidate>,
    /// Raw hrefs in document order, neither resolved nor domain-filtered.
    pub links: Vec<String>,
}

pub fn extract_page(html: &str) -> PageExtract {
    let document = Html::parse_document(html);

    let images = document
        .select(&IMG_SELECTOR)
        .filter_map(image_candidate)
        .collect();

    let links = document
        .select(&LINK_SELECTOR)
        .filter_map(|element| element.value().attr("href"))
        .filter(|href| is_followable_href(href))
        .map(|href| href.trim().to_string())
        .collect();

    PageExtract { images, links }
}

fn image_candidate(element: ElementRef<'_>) -> Option<ImageCandidate> {
    let img = element.value();
    let source = effective_source(img.attr("src"), |name| img.attr(name))?;

    let width = img.attr("width").and_then(parse_dimension);
    let height = img.attr("height").and_then(parse_dimension);
    if is_too_small(width) || is_too_small(height) {
        debug!("Skipping small image: {} ({:?}x{:?})", source, width, height);
        return None;
    }

    Some(ImageCandidate {
        source,
        alt_text: img.attr("alt").unwrap_or_default().to_string(),
        width,
        height,
    })
}

/// Pick the real source of an image, falling back to lazy-load attributes when
/// `src` is missing, a data URI or a placeholder.
pub fn effective_source<'a>(
    src: Option<&'a str>,
    attr: impl Fn(&str) -> Option<&'a str>,
) -> Option<String> {
    let mut source = src.map(str::trim).unwrap_or_default();

    if needs_lazy_fallback(source) {
        if let Some(lazy) = LAZY_SOURCE_ATTRIBUTES
            .iter()
            .filter_map(|name| attr(*name))
            .map(str::trim)
            .find(|value| !value.is_empty())
        {
            debug!("Found lazy-loaded image source: {}", lazy);
            source = lazy;
        }
    }

    if source.is_empty() || is_data_uri(source) || source.chars().count() < MIN_SOURCE_LEN {
        return None;
    }
    Some(source.to_string())
}

fn needs_lazy_fallback(src: &str) -> bool {
    src.is_empty()
        || is_data_uri(src)
        || PLACEHOLDER_MARKERS.iter().any(|marker| src.contains(marker))
}

fn is_data_uri(src: &str) -> bool {
    src.get(..5)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("data:"))
}

/// Leading-digit parse, so `"100px"` reads as 100 and `"auto"` as nothing.
pub fn parse_dimension(value: &str) -> Option<u32> {
    let digits: String = value
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn is_too_small(dimension: Option<u32>) -> bool {
    matches!(dimension, Some(d) if d > 0 && d < MIN_DIMENSION)
}

pub fn is_followable_href(href: &str) -> bool {
    let href = href.trim();
    if href.is_empty() {
        return false;
    }
    let lower = href.to_ascii_lowercase();
    !SKIPPED_LINK_PREFIXES
        .iter()
        .any(|prefix| lower.starts_with(prefix))
}
