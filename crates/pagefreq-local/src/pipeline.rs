//! End-to-end glue: url -> fetch -> decode -> extract -> tokenize -> count -> rank.

use crate::config::PipelineConfig;
use crate::decode::{self, CharsetSource};
use crate::extract;
use crate::freq::FrequencyTable;
use crate::rank::rank_top;
use crate::tokenize::Tokenizer;
use pagefreq_core::{validate_url, FetchBackend, FetchRequest, RankedTopTable, Result};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    /// Length of the normalized text, in chars.
    pub text_chars: usize,
    /// Tokens surviving the length filter.
    pub token_count: usize,
    pub distinct_tokens: usize,
    pub table: RankedTopTable,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageAnalysis {
    pub url: String,
    pub final_url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub charset: &'static str,
    pub charset_detected: bool,
    pub truncated: bool,
    pub analysis: Analysis,
}

/// Normalized text -> ranked table.
pub fn analyze_text(text: &str, tokenizer: &Tokenizer, cfg: &PipelineConfig) -> Analysis {
    let tokens = tokenizer.tokenize(text);
    let freq = FrequencyTable::from_tokens(&tokens);
    let table = rank_top(&freq, cfg.top_n);
    Analysis {
        text_chars: text.chars().count(),
        token_count: tokens.len(),
        distinct_tokens: freq.len(),
        table,
    }
}

/// Raw HTML -> ranked table. Never fails; pages without text give an empty table.
pub fn analyze_html(html: &str, tokenizer: &Tokenizer, cfg: &PipelineConfig) -> Analysis {
    let text = extract::extract_text(html);
    analyze_text(&text, tokenizer, cfg)
}

/// Validate the url, fetch it once, and analyze the body.
///
/// A bad scheme fails before any request is made. Transport failures abort the
/// run; nothing downstream is computed.
pub async fn analyze_url<F>(
    fetcher: &F,
    req: &FetchRequest,
    tokenizer: &Tokenizer,
    cfg: &PipelineConfig,
) -> Result<PageAnalysis>
where
    F: FetchBackend + ?Sized,
{
    validate_url(&req.url)?;
    let resp = fetcher.fetch(req).await?;

    let (url, status, truncated) = (resp.url.clone(), resp.status, resp.truncated);
    let raw = resp.into_raw_document();
    let decoded = decode::decode(&raw);
    let analysis = analyze_html(&decoded.text, tokenizer, cfg);
    tracing::info!(
        url = %url,
        status,
        charset = decoded.charset,
        tokens = analysis.token_count,
        distinct = analysis.distinct_tokens,
        ranked = analysis.table.len(),
        "analyzed page"
    );

    Ok(PageAnalysis {
        url,
        final_url: raw.url,
        status,
        content_type: raw.content_type,
        charset: decoded.charset,
        charset_detected: decoded.charset_source == CharsetSource::Detected,
        truncated,
        analysis,
    })
}
