use std::collections::BTreeMap;

/// Distinct token -> occurrence count. Every stored count is >= 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: BTreeMap<String, u64>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut t = Self::new();
        t.extend(tokens);
        t
    }

    pub fn add(&mut self, token: &str) {
        if let Some(n) = self.counts.get_mut(token) {
            *n += 1;
        } else {
            self.counts.insert(token.to_string(), 1);
        }
    }

    pub fn get(&self, token: &str) -> u64 {
        self.counts.get(token).copied().unwrap_or(0)
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts, i.e. the length of the token sequence that built the table.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<S: AsRef<str>> Extend<S> for FrequencyTable {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for tok in iter {
            self.add(tok.as_ref());
        }
    }
}

impl<S: AsRef<str>> FromIterator<S> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::from_tokens(iter)
    }
}

impl<K: Into<String>, const N: usize> From<[(K, u64); N]> for FrequencyTable {
    /// Build a table from explicit counts; zero counts are skipped.
    fn from(pairs: [(K, u64); N]) -> Self {
        let counts = pairs
            .into_iter()
            .filter(|(_, n)| *n > 0)
            .map(|(k, n)| (k.into(), n))
            .collect();
        Self { counts }
    }
}
