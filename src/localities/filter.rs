//! Client-side locality filtering.

use serde::{Deserialize, Serialize};

use super::Locality;

/// Filter criteria. Unset fields match everything; set fields are
/// AND-combined. Text comparisons are case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalityFilters {
    /// Substring of name (English or Tamil), description or any highlight
    pub query: Option<String>,
    /// Substring of the area
    pub area: Option<String>,
    /// Prefix of the pincode
    pub pincode: Option<String>,
    /// Inclusive lower bound on score
    pub min_score: Option<f64>,
}

impl LocalityFilters {
    pub fn is_empty(&self) -> bool {
        non_blank(&self.query).is_none()
            && non_blank(&self.area).is_none()
            && non_blank(&self.pincode).is_none()
            && self.min_score.is_none()
    }

    pub fn matches(&self, locality: &Locality) -> bool {
        if let Some(query) = non_blank(&self.query) {
            let query = query.to_lowercase();
            let hit = contains_ci(&locality.name_en, &query)
                || contains_ci(&locality.name_ta, &query)
                || contains_ci(&locality.description, &query)
                || locality.highlights.iter().any(|h| contains_ci(h, &query));
            if !hit {
                return false;
            }
        }

        if let Some(area) = non_blank(&self.area) {
            if !contains_ci(&locality.area, &area.to_lowercase()) {
                return false;
            }
        }

        if let Some(pincode) = non_blank(&self.pincode) {
            if !locality.pincode.starts_with(pincode) {
                return false;
            }
        }

        if let Some(min_score) = self.min_score {
            if locality.score < min_score {
                return false;
            }
        }

        true
    }

    pub fn apply<'a>(&self, localities: &'a [Locality]) -> Vec<&'a Locality> {
        localities.iter().filter(|l| self.matches(l)).collect()
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// `needle` must already be lowercase.
fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::localities::Metrics;

    fn locality(id: &str, name: &str, area: &str, pincode: &str, m: f64) -> Locality {
        let mut loc = Locality::new(id, name, "", Metrics::new(m, m, m, m, m));
        loc.area = area.to_string();
        loc.pincode = pincode.to_string();
        loc.highlights = vec!["Filter coffee".to_string()];
        loc
    }

    fn sample() -> Vec<Locality> {
        vec![
            locality("tnagar", "T. Nagar", "Central Chennai", "600017", 4.6),
            locality("velachery", "Velachery", "South Chennai", "600042", 4.0),
            locality("chengalpattu", "Chengalpattu", "Suburbs", "603001", 3.5),
        ]
    }

    #[test]
    fn test_empty_filters_match_all() {
        let all = sample();
        let filters = LocalityFilters::default();
        assert!(filters.is_empty());
        assert_eq!(filters.apply(&all).len(), 3);
    }

    #[test]
    fn test_pincode_prefix() {
        let all = sample();
        let filters = LocalityFilters {
            pincode: Some("6000".to_string()),
            ..Default::default()
        };
        let ids: Vec<&str> = filters.apply(&all).iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["tnagar", "velachery"]);
    }

    #[test]
    fn test_min_score() {
        let all = sample();
        let filters = LocalityFilters {
            min_score: Some(4.5),
            ..Default::default()
        };
        let hits = filters.apply(&all);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "tnagar");
    }

    #[test]
    fn test_query_is_case_insensitive_and_searches_highlights() {
        let all = sample();
        let by_name = LocalityFilters {
            query: Some("VELA".to_string()),
            ..Default::default()
        };
        assert_eq!(by_name.apply(&all).len(), 1);

        let by_highlight = LocalityFilters {
            query: Some("coffee".to_string()),
            ..Default::default()
        };
        assert_eq!(by_highlight.apply(&all).len(), 3);
    }

    #[test]
    fn test_filters_are_and_combined() {
        let all = sample();
        let filters = LocalityFilters {
            area: Some("chennai".to_string()),
            min_score: Some(4.5),
            ..Default::default()
        };
        let hits = filters.apply(&all);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "tnagar");
    }
}
