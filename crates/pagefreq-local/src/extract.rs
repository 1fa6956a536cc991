use std::sync::OnceLock;

/// Elements whose text content is never shown to a reader.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

fn non_word_re() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"[^\w\s]").expect("valid punctuation regex"))
}

fn whitespace_run_re() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"\s+").expect("valid whitespace regex"))
}

/// Concatenate the visible text nodes of an HTML document, in document order.
///
/// Nodes are joined with no separator, so adjacent inline runs merge the way a
/// browser's `textContent` would. Malformed markup never fails: html5ever always
/// builds some tree.
pub fn visible_text(html: &str) -> String {
    let doc = html_scraper::Html::parse_document(html);
    let mut out = String::with_capacity(html.len() / 2);
    for node in doc.tree.root().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if hidden {
            continue;
        }
        out.push_str(text);
    }
    out
}

/// Drop everything that is neither a word character nor whitespace, collapse
/// whitespace runs to one ASCII space, and trim.
pub fn normalize_text(s: &str) -> String {
    let stripped = non_word_re().replace_all(s, "");
    whitespace_run_re()
        .replace_all(&stripped, " ")
        .trim()
        .to_string()
}

/// HTML -> normalized plain text.
pub fn extract_text(html: &str) -> String {
    let raw = visible_text(html);
    let text = normalize_text(&raw);
    tracing::debug!(
        html_bytes = html.len(),
        visible_chars = raw.chars().count(),
        text_chars = text.chars().count(),
        "extracted text"
    );
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn extracts_the_cjk_scenario() {
        let html = "<html><body><p>猫和狗和猫</p></body></html>";
        assert_eq!(extract_text(html), "猫和狗和猫");
    }

    #[test]
    fn strips_punctuation_and_collapses_whitespace() {
        let html = "<html><head><title>Hello, World!</title></head>\n<body>\n\t<h1>苹果，香蕉。</h1>\n\n<p>foo_bar   baz-qux (v1.2)</p></body></html>";
        assert_eq!(
            extract_text(html),
            "Hello World 苹果香蕉 foo_bar bazqux v12"
        );
    }

    #[test]
    fn skips_script_style_and_comments() {
        let html = r#"<html><head><style>p { color: red; }</style>
            <script>var tracking = "secret";</script></head>
            <body><!-- hidden note --><p>shown</p><noscript>enable js</noscript></body></html>"#;
        assert_eq!(extract_text(html), "shown");
    }

    #[test]
    fn adjacent_nodes_join_without_separator() {
        assert_eq!(extract_text("<p>ab</p><p>cd</p>"), "abcd");
        assert_eq!(extract_text("<p>ab</p>\n<p>cd</p>"), "ab cd");
    }

    #[test]
    fn malformed_and_empty_input_never_fail() {
        assert_eq!(extract_text(""), "");
        assert_eq!(extract_text("<<<>>>"), "");
        assert_eq!(extract_text("<div><p>unclosed <b>bold"), "unclosed bold");
        assert_eq!(extract_text("plain text, no tags"), "plain text no tags");
    }

    proptest! {
        #[test]
        fn normalized_text_has_no_punctuation_or_double_spaces(s in any::<String>()) {
            let t = normalize_text(&s);
            prop_assert!(!t.contains("  "));
            prop_assert_eq!(t.trim(), t.as_str());
            prop_assert!(!non_word_re().is_match(&t));
            prop_assert!(!t.chars().any(|c| c.is_whitespace() && c != ' '));
        }

        #[test]
        fn extraction_is_deterministic(body in "[a-z猫狗 <>/p,.!]{0,64}") {
            let html = format!("<html><body>{body}</body></html>");
            prop_assert_eq!(extract_text(&html), extract_text(&html));
        }
    }
}
