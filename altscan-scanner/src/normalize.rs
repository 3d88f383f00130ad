//! Turning `src`/`href` references into absolute URLs.

use crate::error::{Result, ScanError};
use url::Url;

/// Extensions that never lead to an HTML document.
pub const NON_DOCUMENT_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "svg", "webp", "bmp", "ico", "css", "js", "pdf", "doc", "docx",
    "xls", "xlsx", "zip", "rar", "exe", "mp3", "mp4", "avi", "mov", "wmv", "flv", "webm",
];

/// Resolve `reference` against `base`.
///
/// Protocol-relative references keep the base scheme, root-relative ones keep
/// scheme and host, anything else resolves against the base's directory with
/// dot segments collapsed.
pub fn resolve(base: &Url, reference: &str) -> Result<Url> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(ScanError::MalformedUrl("empty reference".to_string()));
    }
    let resolved = base
        .join(reference)
        .map_err(|e| ScanError::MalformedUrl(format!("{} ({})", reference, e)))?;
    if resolved.cannot_be_a_base() || resolved.host_str().is_none() {
        return Err(ScanError::MalformedUrl(format!("{} has no host", resolved)));
    }
    Ok(resolved)
}

/// Same as [`resolve`] but taking the base as a string.
pub fn resolve_str(base: &str, reference: &str) -> Result<String> {
    let base = Url::parse(base).map_err(|e| ScanError::MalformedUrl(format!("{} ({})", base, e)))?;
    resolve(&base, reference).map(String::from)
}

/// Resolve an outbound link into its frontier form: http(s) only, no fragment.
pub fn resolve_link(base: &Url, href: &str) -> Result<Url> {
    let mut url = resolve(base, href)?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ScanError::MalformedUrl(format!(
                "unsupported scheme {} in {}",
                other, url
            )));
        }
    }
    url.set_fragment(None);
    Ok(url)
}

/// Lowercased extension of the last path segment, if it has one.
pub fn path_extension(url: &Url) -> Option<String> {
    let segment = url.path().rsplit('/').next()?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() && ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// True unless the path names an image, stylesheet, script, archive, office
/// document or media file.
pub fn is_document_url(url: &Url) -> bool {
    match path_extension(url) {
        Some(ext) => !NON_DOCUMENT_EXTENSIONS.contains(&ext.as_str()),
        None => true,
    }
}

/// Exact host comparison, no subdomain folding.
pub fn is_same_host(url: &Url, base_domain: &str) -> bool {
    url.host_str()
        .is_some_and(|host| host.eq_ignore_ascii_case(base_domain))
}
