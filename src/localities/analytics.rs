//! Aggregate statistics over the locality list.

use std::collections::BTreeMap;

use serde::Serialize;

use super::Locality;
use super::scoring::round1;

const TOP_N: usize = 3;

/// Derived view recomputed from the full list on every call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalityAnalytics {
    pub count: usize,
    /// Mean score rounded to one decimal; 0 for an empty list
    pub average_score: f64,
    /// Highest scoring localities, best first
    pub top_localities: Vec<Locality>,
    /// How many localities carry each source tag
    pub source_counts: BTreeMap<String, usize>,
}

impl LocalityAnalytics {
    pub fn compute(localities: &[Locality]) -> Self {
        let count = localities.len();
        let average_score = if count == 0 {
            0.0
        } else {
            round1(localities.iter().map(|l| l.score).sum::<f64>() / count as f64)
        };

        let mut ranked: Vec<&Locality> = localities.iter().collect();
        // Stable sort keeps list order among equal scores
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        let top_localities = ranked.into_iter().take(TOP_N).cloned().collect();

        let mut source_counts = BTreeMap::new();
        for locality in localities {
            for source in &locality.sources {
                *source_counts.entry(source.clone()).or_insert(0) += 1;
            }
        }

        Self {
            count,
            average_score,
            top_localities,
            source_counts,
        }
    }
}
