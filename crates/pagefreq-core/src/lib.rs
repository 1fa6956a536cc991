use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

pub mod chart;

pub use chart::{CartesianAxes, ChartEncoding, ChartKind, ChartSpec, FontSpec, Mark};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("unsupported chart kind: {0}")]
    UnsupportedChartKind(String),
    #[error("font error: {0}")]
    Font(String),
    #[error("render failed: {0}")]
    Render(String),
    #[error("not configured: {0}")]
    NotConfigured(String),
}

impl Error {
    /// InvalidURL is shown to the user as a warning; everything else is an error.
    pub fn is_user_facing_warning(&self) -> bool {
        matches!(self, Error::InvalidUrl(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Only the scheme prefix is checked here. Host, port and path problems surface
/// later as `Error::Fetch` from the HTTP backend.
pub fn validate_url(url: &str) -> Result<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(Error::InvalidUrl(format!(
            "expected an http:// or https:// url, got {url:?}"
        )))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchRequest {
    pub url: String,
    /// Timeout for the whole request (connect + body).
    pub timeout_ms: Option<u64>,
    /// Hard cap on bytes read from the response body.
    pub max_bytes: Option<u64>,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_ms: None,
            max_bytes: None,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchResponse {
    pub url: String,
    pub final_url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    pub truncated: bool,
    pub timings_ms: BTreeMap<String, u128>,
}

impl FetchResponse {
    /// Hand the body over to decoding. Consumes the response: the raw bytes are
    /// not needed once text extraction has them.
    pub fn into_raw_document(self) -> RawDocument {
        RawDocument {
            url: self.final_url,
            content_type: self.content_type,
            bytes: self.bytes,
        }
    }
}

/// A fetched page body before charset decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    pub url: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[async_trait::async_trait]
pub trait FetchBackend: Send + Sync {
    async fn fetch(&self, req: &FetchRequest) -> Result<FetchResponse>;
}

/// One row of the ranked table. `rank` is 1-based and dense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub word: String,
    pub frequency: u64,
    pub rank: usize,
}

/// Top-N words ordered by ascending rank.
///
/// Ranks run 1..=len with no gaps and frequencies never increase with rank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankedTopTable {
    pub entries: Vec<RankedEntry>,
}

impl RankedTopTable {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RankedEntry> {
        self.entries.iter()
    }

    /// Largest frequency in the table, 0 when empty.
    pub fn max_frequency(&self) -> u64 {
        self.entries.iter().map(|e| e.frequency).max().unwrap_or(0)
    }
}

impl<'a> IntoIterator for &'a RankedTopTable {
    type Item = &'a RankedEntry;
    type IntoIter = std::slice::Iter<'a, RankedEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
