//! Shared domain types used by both stores.

use serde::{Deserialize, Serialize};

// ============================================================================
// Users
// ============================================================================

/// A community member, embedded by value wherever it is referenced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            phone: None,
        }
    }
}

// ============================================================================
// Bilingual locations
// ============================================================================

/// A place name in English and Tamil.
///
/// Older records carry a single `"English / Tamil"` string; newer ones carry
/// the structured form. Both deserialize from the same field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Location {
    Structured {
        english: String,
        tamil: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        landmark: Option<String>,
    },
    Plain(String),
}

impl Location {
    pub fn structured(english: &str, tamil: &str, landmark: Option<&str>) -> Self {
        Location::Structured {
            english: english.to_string(),
            tamil: tamil.to_string(),
            landmark: landmark.map(str::to_string),
        }
    }

    /// English part of the name.
    pub fn english(&self) -> &str {
        match self {
            Location::Structured { english, .. } => english,
            Location::Plain(s) => s.split(" / ").next().unwrap_or(s).trim(),
        }
    }

    /// Tamil part of the name; plain strings without a separator have none.
    pub fn tamil(&self) -> Option<&str> {
        match self {
            Location::Structured { tamil, .. } => Some(tamil),
            Location::Plain(s) => s.split_once(" / ").map(|(_, ta)| ta.trim()),
        }
    }

    pub fn landmark(&self) -> Option<&str> {
        match self {
            Location::Structured { landmark, .. } => landmark.as_deref(),
            Location::Plain(_) => None,
        }
    }
}
