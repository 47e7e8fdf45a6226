use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::review::Review;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitReviewRequest {
    /// 0 is what an untouched star picker sends. Wide so out-of-range
    /// numbers reach the validator instead of failing to parse.
    #[serde(default)]
    #[validate(range(min = 1, max = 5, message = "Please select a rating."))]
    pub rating: i64,
    #[serde(default)]
    #[validate(length(max = 2000, message = "Review is too long."))]
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    pub reviewer_id: String,
    pub reviewer_name: String,
    pub rating: u8,
    pub stars: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl From<&Review> for ReviewView {
    fn from(review: &Review) -> Self {
        ReviewView {
            reviewer_id: review.reviewer_id.clone(),
            reviewer_name: review.reviewer_name.clone(),
            rating: review.rating,
            stars: review.stars(),
            text: review.text.clone(),
            timestamp: review.timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStatus {
    pub already_reviewed: bool,
}
