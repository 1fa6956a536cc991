//! Word segmentation for normalized page text.
//!
//! Han-script runs have no spaces between words, so they go through the jieba
//! dictionary segmenter. Everything else is split on Unicode word boundaries
//! (UAX #29), which keeps space-delimited words of any script intact.

use crate::config::PipelineConfig;
use jieba_rs::Jieba;
use pagefreq_core::{Error, Result};
use std::fs::File;
use std::io::BufReader;
use std::sync::OnceLock;
use unicode_segmentation::UnicodeSegmentation;

fn han_run_re() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"\p{Han}+").expect("valid han regex"))
}

pub struct Tokenizer {
    jieba: Jieba,
    /// Use jieba's HMM pass for out-of-dictionary Han words.
    hmm: bool,
    min_chars: usize,
}

impl Tokenizer {
    /// Default dictionary, HMM on, tokens must be at least `min_chars` long.
    pub fn new(min_chars: usize) -> Self {
        Self {
            jieba: Jieba::new(),
            hmm: true,
            min_chars: min_chars.max(1),
        }
    }

    pub fn from_config(cfg: &PipelineConfig) -> Result<Self> {
        let mut tok = Self::new(cfg.min_token_chars);
        if let Some(path) = cfg.user_dict.as_deref() {
            let f = File::open(path).map_err(|e| {
                Error::NotConfigured(format!("user dictionary {}: {e}", path.display()))
            })?;
            tok.jieba
                .load_dict(&mut BufReader::new(f))
                .map_err(|e| {
                    Error::NotConfigured(format!("user dictionary {}: {e}", path.display()))
                })?;
            tracing::debug!(path = %path.display(), "loaded user dictionary");
        }
        Ok(tok)
    }

    pub fn with_hmm(mut self, hmm: bool) -> Self {
        self.hmm = hmm;
        self
    }

    /// Raw segmentation, before any length filtering. Whitespace is never returned.
    pub fn segment<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut out = Vec::new();
        for chunk in text.split_whitespace() {
            let mut last = 0usize;
            for m in han_run_re().find_iter(chunk) {
                out.extend(chunk[last..m.start()].unicode_words());
                out.extend(self.jieba.cut(m.as_str(), self.hmm));
                last = m.end();
            }
            out.extend(chunk[last..].unicode_words());
        }
        out
    }

    /// Segment and drop tokens that are blank or shorter than the minimum length.
    pub fn tokenize<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let tokens: Vec<&str> = self
            .segment(text)
            .into_iter()
            .map(str::trim)
            .filter(|t| !t.is_empty() && t.chars().count() >= self.min_chars)
            .collect();
        tracing::debug!(tokens = tokens.len(), "tokenized");
        tokens
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(PipelineConfig::default().min_token_chars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;
    use std::sync::OnceLock;

    // Building the default dictionary is the slow part; share one per test binary.
    fn shared() -> &'static Tokenizer {
        static TOK: OnceLock<Tokenizer> = OnceLock::new();
        TOK.get_or_init(Tokenizer::default)
    }

    #[test]
    fn segments_chinese_with_dictionary() {
        let tokens = shared().tokenize("我们中出了一个叛徒");
        for w in ["我们", "一个", "叛徒"] {
            assert!(tokens.contains(&w), "missing {w} in {tokens:?}");
        }
        assert!(tokens.iter().all(|t| t.chars().count() > 1));
    }

    #[test]
    fn single_character_words_are_dropped() {
        let tok = Tokenizer::new(2).with_hmm(false);
        assert!(tok.tokenize("猫和狗和猫").is_empty());
        assert_eq!(tok.tokenize("a b c 我"), Vec::<&str>::new());
    }

    #[test]
    fn mixed_script_keeps_space_delimited_words() {
        let tokens = shared().tokenize("Rust 编程语言 Привет мир iPhone15 foo_bar");
        for w in ["Rust", "Привет", "мир", "iPhone15", "foo_bar"] {
            assert!(tokens.contains(&w), "missing {w} in {tokens:?}");
        }
        assert!(tokens.iter().all(|t| !t.contains(' ')));
    }

    #[test]
    fn han_runs_are_split_from_adjacent_latin() {
        let segs = shared().segment("苹果iPhone");
        assert_eq!(segs.last(), Some(&"iPhone"));
        assert_eq!(segs.concat(), "苹果iPhone");
    }

    #[test]
    fn min_chars_is_configurable() {
        let tok = Tokenizer::new(4);
        assert_eq!(tok.tokenize("abc abcd abcde"), vec!["abcd", "abcde"]);
    }

    #[test]
    fn user_dictionary_is_loaded() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "苹果蓝莓 1000000 n").unwrap();
        let cfg = PipelineConfig {
            user_dict: Some(f.path().to_path_buf()),
            ..PipelineConfig::default()
        };
        let tok = Tokenizer::from_config(&cfg).unwrap();
        assert_eq!(tok.tokenize("苹果蓝莓"), vec!["苹果蓝莓"]);
    }

    #[test]
    fn missing_user_dictionary_is_a_config_error() {
        let cfg = PipelineConfig {
            user_dict: Some("/definitely/not/here.dict".into()),
            ..PipelineConfig::default()
        };
        let err = Tokenizer::from_config(&cfg).err().expect("should fail");
        assert!(matches!(err, Error::NotConfigured(_)), "{err}");
    }

    #[test]
    fn empty_text_yields_no_tokens() {
        assert!(shared().tokenize("").is_empty());
        assert!(shared().segment("   ").is_empty());
    }

    proptest! {
        #[test]
        fn no_token_is_shorter_than_two_chars(s in "[a-zA-Z0-9猫狗苹果香蕉我们的是 ]{0,80}") {
            let tokens = shared().tokenize(&s);
            for t in &tokens {
                prop_assert!(t.chars().count() > 1, "short token {t:?}");
                prop_assert!(!t.trim().is_empty());
            }
        }

        #[test]
        fn segmentation_is_deterministic(s in "[a-z猫狗苹果香蕉我们的是 ]{0,80}") {
            prop_assert_eq!(shared().segment(&s), shared().segment(&s));
        }
    }
}
