use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dto::review_dto::ReviewView;
use crate::model::listing::ServiceListing;
use crate::model::user::PublicUser;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 80, message = "Please enter your name."))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 1000, message = "Bio is too long."))]
    pub bio: String,
    #[validate(length(max = 32, message = "WhatsApp number is too long."))]
    pub whatsapp: Option<String>,
}

/// A public profile with what the user offers and what others said.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub user: PublicUser,
    /// Newest first.
    pub listings: Vec<ServiceListing>,
    /// Newest first.
    pub reviews: Vec<ReviewView>,
}
