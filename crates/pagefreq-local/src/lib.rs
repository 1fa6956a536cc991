use futures_util::StreamExt;
use pagefreq_core::{Error, FetchBackend, FetchRequest, FetchResponse, Result};
use std::collections::BTreeMap;
use std::time::Duration;

pub mod chart;
pub mod config;
pub mod decode;
pub mod extract;
pub mod freq;
pub mod pipeline;
pub mod rank;
pub mod tokenize;
pub mod wordcloud;

pub use config::{ChartConfig, FetchConfig, PipelineConfig, WordCloudConfig};
pub use freq::FrequencyTable;
pub use pipeline::{analyze_html, analyze_text, analyze_url, Analysis, PageAnalysis};
pub use tokenize::Tokenizer;
pub use wordcloud::{WordCloudImage, WordCloudRenderer};

/// reqwest-backed HTTP collaborator. One GET per call, no retries.
#[derive(Debug, Clone)]
pub struct LocalFetcher {
    client: reqwest::Client,
    cfg: FetchConfig,
}

impl LocalFetcher {
    pub fn new(cfg: FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(10))
            // FetchRequest.timeout_ms overrides the total timeout per call.
            .connect_timeout(Duration::from_millis(cfg.connect_timeout_ms))
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| Error::Fetch(e.to_string()))?;
        Ok(Self { client, cfg })
    }

    /// Request for `url` using this fetcher's configured limits.
    pub fn request(&self, url: &str) -> FetchRequest {
        FetchRequest {
            url: url.to_string(),
            timeout_ms: Some(self.cfg.timeout_ms),
            max_bytes: Some(self.cfg.max_bytes),
        }
    }
}

/// `err` followed by each of its `source()` causes, joined with `": "`.
/// Causes whose text is already part of the message are skipped.
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut msg = err.to_string();
    let mut cur = err.source();
    while let Some(cause) = cur {
        let text = cause.to_string();
        if !text.is_empty() && !msg.contains(&text) {
            msg.push_str(": ");
            msg.push_str(&text);
        }
        cur = cause.source();
    }
    msg
}

#[async_trait::async_trait]
impl FetchBackend for LocalFetcher {
    async fn fetch(&self, req: &FetchRequest) -> Result<FetchResponse> {
        let mut timings_ms = BTreeMap::new();
        let t_req = std::time::Instant::now();
        // Passed the scheme check but not the parser: a transport-level failure.
        let url = url::Url::parse(&req.url)
            .map_err(|e| Error::Fetch(format!("cannot parse url {:?}: {e}", req.url)))?;

        let mut rb = self.client.get(url);
        if let Some(to) = req.timeout() {
            rb = rb.timeout(to);
        }
        let resp = rb.send().await.map_err(|e| Error::Fetch(error_chain(&e)))?;
        let final_url = resp.url().to_string();
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Fetch(format!(
                "HTTP status {} for url ({final_url})",
                status
            )));
        }
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let max_bytes = req.max_bytes.unwrap_or(u64::MAX) as usize;
        let mut truncated = false;
        let mut bytes = Vec::new();
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| Error::Fetch(error_chain(&e)))?;
            if bytes.len().saturating_add(chunk.len()) > max_bytes {
                let can_take = max_bytes.saturating_sub(bytes.len());
                bytes.extend_from_slice(&chunk[..can_take]);
                truncated = true;
                break;
            }
            bytes.extend_from_slice(&chunk);
        }

        timings_ms.insert("network_fetch".to_string(), t_req.elapsed().as_millis());
        tracing::info!(
            url = %req.url,
            final_url = %final_url,
            status = status.as_u16(),
            bytes = bytes.len(),
            truncated,
            "fetched"
        );
        Ok(FetchResponse {
            url: req.url.clone(),
            final_url,
            status: status.as_u16(),
            content_type,
            bytes,
            truncated,
            timings_ms,
        })
    }
}
