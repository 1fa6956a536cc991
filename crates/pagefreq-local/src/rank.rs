use crate::freq::FrequencyTable;
use pagefreq_core::{RankedEntry, RankedTopTable};
use std::cmp::Reverse;

/// Sort by frequency (descending), keep the first `top_n`, and number them 1..=n.
///
/// Ties are broken by the token itself in ascending Unicode scalar order, so the
/// result never depends on how the frequency table happens to iterate.
pub fn rank_top(table: &FrequencyTable, top_n: usize) -> RankedTopTable {
    let mut rows: Vec<(&str, u64)> = table.iter().collect();
    rows.sort_by_key(|&(word, freq)| (Reverse(freq), word));
    let entries: Vec<RankedEntry> = rows
        .into_iter()
        .take(top_n)
        .enumerate()
        .map(|(i, (word, frequency))| RankedEntry {
            word: word.to_string(),
            frequency,
            rank: i + 1,
        })
        .collect();
    tracing::debug!(
        distinct = table.len(),
        ranked = entries.len(),
        "ranked frequency table"
    );
    RankedTopTable { entries }
}
