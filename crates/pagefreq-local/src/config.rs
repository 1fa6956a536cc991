//! Explicit configuration for each pipeline stage.
//!
//! Every struct has a `Default` and a `from_env()` that reads `PAGEFREQ_*`
//! variables. Blank or unparsable values fall back to the default.

use std::path::PathBuf;

pub(crate) fn env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub(crate) fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env(key).and_then(|s| s.parse::<T>().ok()).unwrap_or(default)
}

/// Number of rows kept by the ranker.
pub const DEFAULT_TOP_N: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub top_n: usize,
    /// Tokens shorter than this many chars are dropped.
    pub min_token_chars: usize,
    /// Extra jieba dictionary (`word [freq] [tag]` per line).
    pub user_dict: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            min_token_chars: 2,
            user_dict: None,
        }
    }
}

impl PipelineConfig {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            top_n: env_parse("PAGEFREQ_TOP_N", d.top_n),
            min_token_chars: env_parse("PAGEFREQ_MIN_TOKEN_CHARS", d.min_token_chars).max(1),
            user_dict: env("PAGEFREQ_USER_DICT").map(PathBuf::from),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    pub timeout_ms: u64,
    pub connect_timeout_ms: u64,
    pub max_bytes: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            connect_timeout_ms: 10_000,
            max_bytes: 5_000_000,
            user_agent: concat!("pagefreq/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl FetchConfig {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            timeout_ms: env_parse("PAGEFREQ_TIMEOUT_MS", d.timeout_ms),
            connect_timeout_ms: env_parse("PAGEFREQ_CONNECT_TIMEOUT_MS", d.connect_timeout_ms),
            max_bytes: env_parse("PAGEFREQ_MAX_BYTES", d.max_bytes),
            user_agent: env("PAGEFREQ_USER_AGENT").unwrap_or(d.user_agent),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartConfig {
    /// Must be able to render the token script (CJK for the common case).
    pub font_family: String,
    pub font_size: u32,
    pub x_tick_angle: i32,
    /// Upper bound on y-axis gridlines; the tick step is `max(1, max_freq / max_gridlines)`.
    pub max_gridlines: u64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            font_family: "SimHei".to_string(),
            font_size: 12,
            x_tick_angle: 45,
            max_gridlines: 10,
        }
    }
}

impl ChartConfig {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            font_family: env("PAGEFREQ_FONT_FAMILY").unwrap_or(d.font_family),
            font_size: env_parse("PAGEFREQ_FONT_SIZE", d.font_size),
            x_tick_angle: d.x_tick_angle,
            max_gridlines: env_parse("PAGEFREQ_MAX_GRIDLINES", d.max_gridlines).max(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WordCloudConfig {
    pub width: u32,
    pub height: u32,
    pub background: [u8; 3],
    pub font_path: PathBuf,
    /// Face index inside a font collection (.ttc); 0 for plain fonts.
    pub font_index: u32,
    pub max_font_size: f32,
    pub min_font_size: f32,
    /// Empty pixels kept around each placed word.
    pub margin: u32,
}

impl Default for WordCloudConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
            background: [255, 255, 255],
            font_path: PathBuf::from("wqy-zenhei.ttc"),
            font_index: 0,
            max_font_size: 96.0,
            min_font_size: 8.0,
            margin: 2,
        }
    }
}

impl WordCloudConfig {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            width: env_parse("PAGEFREQ_WORDCLOUD_WIDTH", d.width).max(1),
            height: env_parse("PAGEFREQ_WORDCLOUD_HEIGHT", d.height).max(1),
            background: env("PAGEFREQ_BACKGROUND")
                .and_then(|s| parse_color(&s))
                .unwrap_or(d.background),
            font_path: env("PAGEFREQ_FONT").map(PathBuf::from).unwrap_or(d.font_path),
            font_index: env_parse("PAGEFREQ_FONT_INDEX", d.font_index),
            ..d
        }
    }
}

/// `white`, `black`, or `#rrggbb`.
pub fn parse_color(s: &str) -> Option<[u8; 3]> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "white" => return Some([255, 255, 255]),
        "black" => return Some([0, 0, 0]),
        _ => {}
    }
    let hex = s.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}
