// src/fetch/mod.rs
//! Page retrieval. Everything that touches the network sits behind [`PageSource`] so the
//! resolver can be driven by canned responses.

use thiserror::Error;
use url::Url;

pub mod http;
pub mod retry;

pub use http::HttpSource;
pub use retry::Retrying;

/// A fetched document: final status plus the decoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub status: u16,
    pub body: String,
}

impl Page {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Only a plain 200 carries a spell page; other 2xx replies are treated like errors.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Transport-level failures. HTTP error statuses are not errors here; they come back as a
/// [`Page`] and the caller decides.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("reading body failed: {0}")]
    Body(String),
    #[error("request failed: {0}")]
    Request(String),
}

impl FetchError {
    /// Failures worth another attempt when retries are enabled.
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Timeout(_) | FetchError::Connect(_))
    }
}

pub trait PageSource {
    fn fetch(&self, url: &Url) -> Result<Page, FetchError>;
}
