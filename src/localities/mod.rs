//! # Locality ratings
//!
//! Chennai localities scored on five dimensions, plus community-submitted
//! suggestions that wait locally until the backend accepts them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod analytics;
pub mod filter;
pub mod scoring;
pub mod store;

pub use analytics::LocalityAnalytics;
pub use filter::LocalityFilters;
pub use scoring::{compute_score, suggestion_to_locality, DEFAULT_METRIC};
pub use store::LocalityStore;

/// Per-dimension scores, each in `[0, 5]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub liveability: f64,
    pub connectivity: f64,
    pub food_culture: f64,
    pub affordability: f64,
    pub buzz: f64,
}

impl Metrics {
    pub fn new(
        liveability: f64,
        connectivity: f64,
        food_culture: f64,
        affordability: f64,
        buzz: f64,
    ) -> Self {
        Self {
            liveability,
            connectivity,
            food_culture,
            affordability,
            buzz,
        }
    }
}

/// Metrics as supplied with a suggestion; any dimension may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialMetrics {
    #[serde(default)]
    pub liveability: Option<f64>,
    #[serde(default)]
    pub connectivity: Option<f64>,
    #[serde(default)]
    pub food_culture: Option<f64>,
    #[serde(default)]
    pub affordability: Option<f64>,
    #[serde(default)]
    pub buzz: Option<f64>,
}

impl PartialMetrics {
    /// Fill missing dimensions with [`DEFAULT_METRIC`].
    pub fn complete(&self) -> Metrics {
        Metrics {
            liveability: self.liveability.unwrap_or(DEFAULT_METRIC),
            connectivity: self.connectivity.unwrap_or(DEFAULT_METRIC),
            food_culture: self.food_culture.unwrap_or(DEFAULT_METRIC),
            affordability: self.affordability.unwrap_or(DEFAULT_METRIC),
            buzz: self.buzz.unwrap_or(DEFAULT_METRIC),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Synced,
}

/// A ranked locality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Locality {
    pub id: String,
    pub name_en: String,
    pub name_ta: String,
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub pincode: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub highlights: Vec<String>,
    pub metrics: Metrics,
    /// Derived from `metrics`. Records from the backend or device storage
    /// may carry any value here; the stores correct it with
    /// [`Locality::normalize_score`] before use.
    pub score: f64,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub is_community_submission: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_status: Option<SubmissionStatus>,
}

impl Locality {
    pub fn new(id: &str, name_en: &str, name_ta: &str, metrics: Metrics) -> Self {
        Self {
            id: id.to_string(),
            name_en: name_en.to_string(),
            name_ta: name_ta.to_string(),
            area: String::new(),
            pincode: String::new(),
            description: String::new(),
            highlights: Vec::new(),
            metrics,
            score: compute_score(&metrics),
            sources: Vec::new(),
            is_community_submission: false,
            submission_status: None,
        }
    }

    /// Replace metrics and recompute the score.
    pub fn set_metrics(&mut self, metrics: Metrics) {
        self.metrics = metrics;
        self.score = compute_score(&metrics);
    }

    /// Re-derive the score from the current metrics. Used on records that
    /// arrive from outside (backend, storage).
    pub fn normalize_score(&mut self) {
        self.score = compute_score(&self.metrics);
    }

    /// Blend a user rating into liveability by arithmetic mean.
    pub fn apply_rating(&mut self, rating: f64) {
        let mut metrics = self.metrics;
        metrics.liveability = (metrics.liveability + rating) / 2.0;
        self.set_metrics(metrics);
    }
}

/// Fields a user fills in when proposing a locality.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionInput {
    pub name_en: String,
    pub name_ta: String,
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub pincode: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub metrics: PartialMetrics,
    #[serde(default)]
    pub submitted_by: Option<String>,
}

/// A locality proposal awaiting backend sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalitySuggestion {
    pub id: String,
    pub name_en: String,
    pub name_ta: String,
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub pincode: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub metrics: PartialMetrics,
    #[serde(default)]
    pub submitted_by: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl LocalitySuggestion {
    pub fn from_input(id: String, input: SuggestionInput, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name_en: input.name_en,
            name_ta: input.name_ta,
            area: input.area,
            pincode: input.pincode,
            description: input.description,
            highlights: input.highlights,
            metrics: input.metrics,
            submitted_by: input.submitted_by,
            submitted_at: now,
        }
    }
}

/// Result of submitting a suggestion.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    /// The backend accepted it immediately.
    Synced(Locality),
    /// Stored locally; retried on the next successful refresh.
    Queued(Locality),
}

impl SubmissionOutcome {
    pub fn locality(&self) -> &Locality {
        match self {
            SubmissionOutcome::Synced(l) | SubmissionOutcome::Queued(l) => l,
        }
    }

    pub fn is_synced(&self) -> bool {
        matches!(self, SubmissionOutcome::Synced(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_metrics_default_to_three() {
        let partial = PartialMetrics {
            liveability: Some(4.0),
            buzz: Some(2.0),
            ..Default::default()
        };
        let m = partial.complete();
        assert_eq!(m.liveability, 4.0);
        assert_eq!(m.connectivity, 3.0);
        assert_eq!(m.food_culture, 3.0);
        assert_eq!(m.affordability, 3.0);
        assert_eq!(m.buzz, 2.0);
    }

    #[test]
    fn test_apply_rating_blends_liveability_only() {
        let mut loc = Locality::new("adyar", "Adyar", "அடையாறு", Metrics::new(4.0, 4.0, 4.0, 4.0, 4.0));
        loc.apply_rating(5.0);
        assert_eq!(loc.metrics.liveability, 4.5);
        assert_eq!(loc.metrics.connectivity, 4.0);
        assert_eq!(loc.score, compute_score(&loc.metrics));
        // 4.5*0.25 + 4.0*0.75 = 4.125
        assert_eq!(loc.score, 4.1);
    }

    #[test]
    fn test_deserialized_score_is_normalized() {
        let json = r#"{
            "id": "x", "nameEn": "X", "nameTa": "எக்ஸ்",
            "metrics": {"liveability": 5, "connectivity": 5, "foodCulture": 5, "affordability": 5, "buzz": 5},
            "score": 1.0
        }"#;
        let mut loc: Locality = serde_json::from_str(json).unwrap();
        loc.normalize_score();
        assert_eq!(loc.score, 5.0);
    }
}
