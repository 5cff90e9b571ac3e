//! Weighted locality score.

use super::{Locality, LocalitySuggestion, Metrics, SubmissionStatus};

/// Value used for metric dimensions a suggestion leaves out.
pub const DEFAULT_METRIC: f64 = 3.0;

const LIVEABILITY_WEIGHT: f64 = 0.25;
const CONNECTIVITY_WEIGHT: f64 = 0.20;
const FOOD_CULTURE_WEIGHT: f64 = 0.20;
const AFFORDABILITY_WEIGHT: f64 = 0.15;
const BUZZ_WEIGHT: f64 = 0.20;

/// Round to one decimal place, halves away from zero.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Weighted sum of the five metrics, rounded to one decimal.
pub fn compute_score(metrics: &Metrics) -> f64 {
    round1(
        metrics.liveability * LIVEABILITY_WEIGHT
            + metrics.connectivity * CONNECTIVITY_WEIGHT
            + metrics.food_culture * FOOD_CULTURE_WEIGHT
            + metrics.affordability * AFFORDABILITY_WEIGHT
            + metrics.buzz * BUZZ_WEIGHT,
    )
}

/// Display form of a pending suggestion.
pub fn suggestion_to_locality(suggestion: &LocalitySuggestion) -> Locality {
    let metrics = suggestion.metrics.complete();
    Locality {
        id: suggestion.id.clone(),
        name_en: suggestion.name_en.clone(),
        name_ta: suggestion.name_ta.clone(),
        area: suggestion.area.clone(),
        pincode: suggestion.pincode.clone().unwrap_or_default(),
        description: suggestion.description.clone().unwrap_or_default(),
        highlights: suggestion.highlights.clone(),
        metrics,
        score: compute_score(&metrics),
        sources: vec!["community".to_string()],
        is_community_submission: true,
        submission_status: Some(SubmissionStatus::Pending),
    }
}
