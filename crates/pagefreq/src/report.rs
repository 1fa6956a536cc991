use anyhow::Result;
use pagefreq_core::{ChartSpec, RankedTopTable};
use pagefreq_local::PageAnalysis;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub const REPORT_SCHEMA_VERSION: u64 = 1;

pub fn now_epoch_s() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

pub fn default_out_dir(now: u64) -> PathBuf {
    PathBuf::from(format!(".generated/pagefreq-{now}"))
}

pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(p) = path.parent() {
        fs::create_dir_all(p)?;
    }
    Ok(())
}

pub fn write_json(path: &Path, v: &serde_json::Value) -> Result<()> {
    ensure_parent_dir(path)?;
    fs::write(path, serde_json::to_string_pretty(v)? + "\n")?;
    Ok(())
}

/// Paths of the artifacts a run wrote.
#[derive(Debug, Clone, Default)]
pub struct Artifacts {
    pub chart: Option<PathBuf>,
    pub wordcloud: Option<PathBuf>,
}

pub fn report_json(
    page: &PageAnalysis,
    chart: &ChartSpec,
    artifacts: &Artifacts,
    generated_at_epoch_s: u64,
) -> serde_json::Value {
    let path_str = |p: &Option<PathBuf>| p.as_ref().map(|p| p.display().to_string());
    serde_json::json!({
        "schema_version": REPORT_SCHEMA_VERSION,
        "kind": "pagefreq_report",
        "generated_at_epoch_s": generated_at_epoch_s,
        "url": page.url,
        "final_url": page.final_url,
        "status": page.status,
        "content_type": page.content_type,
        "charset": page.charset,
        "charset_detected": page.charset_detected,
        "truncated": page.truncated,
        "chart_kind": chart.kind.as_str(),
        "counts": {
            "text_chars": page.analysis.text_chars,
            "tokens": page.analysis.token_count,
            "distinct_tokens": page.analysis.distinct_tokens,
            "ranked": page.analysis.table.len(),
        },
        "artifacts": {
            "chart": path_str(&artifacts.chart),
            "wordcloud": path_str(&artifacts.wordcloud),
        },
        "table": page.analysis.table,
    })
}

/// Rank-indexed plain-text table. The word column is padded by char count, so
/// wide glyphs can push the frequency column slightly right.
pub fn render_table_text(table: &RankedTopTable) -> String {
    if table.is_empty() {
        return "(no words of two or more characters found)\n".to_string();
    }
    let word_w = table
        .iter()
        .map(|e| e.word.chars().count())
        .max()
        .unwrap_or(0)
        .max("word".len());
    let mut out = format!("{:>4}  {:<word_w$}  {:>9}\n", "rank", "word", "frequency");
    for e in table {
        let pad = word_w.saturating_sub(e.word.chars().count());
        out.push_str(&format!(
            "{:>4}  {}{}  {:>9}\n",
            e.rank,
            e.word,
            " ".repeat(pad),
            e.frequency
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagefreq_core::RankedEntry;

    #[test]
    fn default_out_dir_is_under_generated() {
        assert_eq!(
            default_out_dir(1700000000),
            PathBuf::from(".generated/pagefreq-1700000000")
        );
    }

    #[test]
    fn text_table_lists_rank_word_frequency() {
        let t = RankedTopTable {
            entries: vec![
                RankedEntry {
                    word: "苹果".into(),
                    frequency: 5,
                    rank: 1,
                },
                RankedEntry {
                    word: "banana".into(),
                    frequency: 3,
                    rank: 2,
                },
            ],
        };
        let s = render_table_text(&t);
        let lines: Vec<&str> = s.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("rank") && lines[0].contains("frequency"));
        assert!(lines[1].trim_start().starts_with("1  苹果"));
        assert!(lines[1].trim_end().ends_with('5'));
        assert!(lines[2].contains("banana"));
    }

    #[test]
    fn empty_table_says_so() {
        assert!(render_table_text(&RankedTopTable::default()).contains("no words"));
    }

    #[test]
    fn write_json_creates_parent_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("a/b/report.json");
        write_json(&p, &serde_json::json!({"ok": true})).unwrap();
        let v: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&p).unwrap()).unwrap();
        assert_eq!(v["ok"].as_bool(), Some(true));
    }
}
