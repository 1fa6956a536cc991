//! Character-encoding guessing for fetched pages.
//!
//! Order of evidence: byte-order mark, `charset=` in the Content-Type header,
//! a `<meta>` charset declaration near the top of the document, then a
//! statistical guess over the body. Decoding is always lossy-successful.

use encoding_rs::Encoding;
use pagefreq_core::RawDocument;
use std::sync::OnceLock;

/// How far into the body to look for a `<meta>` charset.
const META_SNIFF_BYTES: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharsetSource {
    Bom,
    Header,
    Meta,
    Detected,
}

#[derive(Debug, Clone)]
pub struct DecodedDocument {
    pub text: String,
    /// WHATWG name of the encoding used, e.g. `UTF-8` or `GBK`.
    pub charset: &'static str,
    pub charset_source: CharsetSource,
    /// True when malformed sequences were replaced with U+FFFD.
    pub had_errors: bool,
}

fn charset_from_content_type(content_type: &str) -> Option<&'static Encoding> {
    content_type.split(';').skip(1).find_map(|param| {
        let (k, v) = param.split_once('=')?;
        if !k.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        let v = v.trim().trim_matches(|c| c == '"' || c == '\'');
        Encoding::for_label(v.as_bytes())
    })
}

fn meta_charset_re() -> &'static regex::bytes::Regex {
    static RE: OnceLock<regex::bytes::Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Covers both `<meta charset="x">` and the http-equiv content form.
        regex::bytes::Regex::new(r#"(?i-u)<meta[^>]*?charset\s*=\s*["']?\s*([a-z0-9_:.\-]+)"#)
            .expect("valid meta charset regex")
    })
}

fn charset_from_meta(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(META_SNIFF_BYTES)];
    let caps = meta_charset_re().captures(head)?;
    let enc = Encoding::for_label(caps.get(1)?.as_bytes())?;
    // A page that claims UTF-16 in ASCII-compatible markup is lying about itself.
    if enc == encoding_rs::UTF_16LE || enc == encoding_rs::UTF_16BE {
        return Some(encoding_rs::UTF_8);
    }
    Some(enc)
}

fn detect(bytes: &[u8]) -> &'static Encoding {
    let mut det = chardetng::EncodingDetector::new();
    det.feed(bytes, true);
    det.guess(None, true)
}

/// Pick an encoding for `bytes` without decoding.
pub fn sniff_encoding(bytes: &[u8], content_type: Option<&str>) -> (&'static Encoding, CharsetSource) {
    if let Some((enc, _bom_len)) = Encoding::for_bom(bytes) {
        return (enc, CharsetSource::Bom);
    }
    if let Some(enc) = content_type.and_then(charset_from_content_type) {
        return (enc, CharsetSource::Header);
    }
    if let Some(enc) = charset_from_meta(bytes) {
        return (enc, CharsetSource::Meta);
    }
    (detect(bytes), CharsetSource::Detected)
}

pub fn decode(doc: &RawDocument) -> DecodedDocument {
    let (enc, charset_source) = sniff_encoding(&doc.bytes, doc.content_type.as_deref());
    // `decode` strips a BOM if present and otherwise uses `enc`.
    let (text, used, had_errors) = enc.decode(&doc.bytes);
    tracing::debug!(
        charset = used.name(),
        source = ?charset_source,
        had_errors,
        "decoded document"
    );
    DecodedDocument {
        text: text.into_owned(),
        charset: used.name(),
        charset_source,
        had_errors,
    }
}
