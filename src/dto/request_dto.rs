use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::service_request::ServiceRequest;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceRequest {
    #[validate(length(min = 1, max = 120, message = "Please describe what you need in the title."))]
    pub title: String,
    #[validate(length(min = 1, max = 5000, message = "Please add a description."))]
    pub description: String,
    /// Hide the request after this many days instead of the default window.
    #[validate(range(min = 1, max = 30, message = "Expiry must be between 1 and 30 days."))]
    pub ttl_days: Option<i64>,
}

/// What the public requests board shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBoard {
    /// Stored requests, old ones included.
    pub total: usize,
    /// Newest first.
    pub recent: Vec<ServiceRequest>,
}

impl RequestBoard {
    pub fn empty_message(&self) -> Option<&'static str> {
        if self.total == 0 {
            Some("Be the first to request a service!")
        } else if self.recent.is_empty() {
            Some("There are no recent service requests.")
        } else {
            None
        }
    }
}
