//! A tiny counting histogram, used by the sizes report to tally how many
//! source files share each width/height.

use std::collections::BTreeMap;
use std::fmt;

/// Counts occurrences of string keys (e.g. `"1920"`), printed sorted by key
/// so a report is reproducible across runs.
#[derive(Debug, Default)]
pub struct Histogram {
    counts: BTreeMap<String, u64>,
}

impl Histogram {
    /// An empty histogram.
    pub fn new() -> Self {
        Histogram::default()
    }

    /// Record one more occurrence of `key`.
    pub fn add(&mut self, key: impl Into<String>) {
        *self.counts.entry(key.into()).or_insert(0) += 1;
    }

    /// The count recorded for `key`, or 0 if never added.
    pub fn get(&self, key: &str) -> u64 {
        *self.counts.get(key).unwrap_or(&0)
    }

    /// All `(key, count)` pairs, sorted by key.
    pub fn rows(&self) -> Vec<(String, u64)> {
        self.counts.iter().map(|(k, v)| (k.clone(), *v)).collect()
    }
}

impl fmt::Display for Histogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, count) in &self.counts {
            writeln!(f, "{count:>6} @ {key}")?;
        }
        Ok(())
    }
}
