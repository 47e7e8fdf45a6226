use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::listing::ServiceListing;
use crate::model::user::PublicUser;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetFeaturedRequest {
    pub is_featured: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SetPlanRequest {
    #[validate(length(min = 1, message = "Please choose a plan."))]
    pub plan: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOverview {
    pub listings: Vec<ServiceListing>,
    pub users: Vec<PublicUser>,
    pub listing_count: usize,
    pub user_count: usize,
}
