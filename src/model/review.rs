use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_RATING: u8 = 5;

/// One review per (subject, reviewer). The document id is derived from that
/// pair so a second submission replaces the first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: String,
    pub subject_id: String,
    pub reviewer_id: String,
    pub reviewer_name: String,
    pub rating: u8,
    #[serde(default)]
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Review {
    pub fn key(subject_id: &str, reviewer_id: &str) -> String {
        format!("{subject_id}:{reviewer_id}")
    }

    pub fn stars(&self) -> String {
        let filled = self.rating.min(MAX_RATING) as usize;
        format!("{}{}", "★".repeat(filled), "☆".repeat(MAX_RATING as usize - filled))
    }
}
