use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Fetch failed for {url}: {message}")]
    FetchFailed {
        url: String,
        status: Option<u16>,
        message: String,
    },

    #[error("Malformed sitemap {url}: {reason}")]
    MalformedSitemap { url: String, reason: String },

    #[error("Malformed URL: {0}")]
    MalformedUrl(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Task join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),
}

impl ScanError {
    pub fn fetch_failed(url: &str, status: Option<u16>, message: impl Into<String>) -> Self {
        ScanError::FetchFailed {
            url: url.to_string(),
            status,
            message: message.into(),
        }
    }

    pub fn malformed_sitemap(url: &str, reason: impl Into<String>) -> Self {
        ScanError::MalformedSitemap {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
