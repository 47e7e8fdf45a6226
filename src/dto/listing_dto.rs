use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::model::listing::{ListingChanges, ServiceListing};
use crate::util::html::format_price;
use crate::util::image_store::ImageUpload;
use crate::util::image_url::{transformed_url, ImageKind};

/// Fields of the add-service form once the multipart body has been read.
#[derive(Debug, Clone, Default, Validate)]
pub struct NewListing {
    #[validate(length(min = 1, max = 120, message = "Please enter a service title."))]
    pub title: String,
    #[validate(length(min = 1, max = 5000, message = "Please enter a service description."))]
    pub description: String,
    #[validate(range(min = 0, message = "Price cannot be negative."))]
    pub price: Option<i64>,
    pub image: Option<ImageUpload>,
}

/// `price: null` clears the price, an absent `price` leaves it alone.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListingRequest {
    #[validate(length(min = 1, max = 120, message = "Please enter a service title."))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 5000, message = "Please enter a service description."))]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub price: Option<Option<i64>>,
}

impl UpdateListingRequest {
    pub fn into_changes(self) -> ListingChanges {
        ListingChanges {
            title: self.title,
            description: self.description,
            price: self.price.map(|p| p.filter(|v| *v > 0)),
            image_url: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// `?id=` as used by the service and profile pages.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: Option<i64>,
    pub price_label: String,
    pub image_url: String,
    pub thumbnail_url: String,
    pub full_image_url: String,
    pub provider_id: String,
    pub provider_name: String,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&ServiceListing> for ListingResponse {
    fn from(listing: &ServiceListing) -> Self {
        ListingResponse {
            id: listing.id.clone(),
            title: listing.title.clone(),
            description: listing.description.clone(),
            price: listing.price,
            price_label: format_price(listing.price),
            image_url: listing.image_url.clone(),
            thumbnail_url: transformed_url(&listing.image_url, ImageKind::Thumbnail),
            full_image_url: transformed_url(&listing.image_url, ImageKind::Full),
            provider_id: listing.provider_id.clone(),
            provider_name: listing.provider_name.clone(),
            is_featured: listing.is_featured,
            created_at: listing.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_field_distinguishes_absent_from_null() {
        let absent: UpdateListingRequest = serde_json::from_str(r#"{"title":"Tiling"}"#).unwrap();
        assert_eq!(absent.price, None);

        let cleared: UpdateListingRequest = serde_json::from_str(r#"{"price":null}"#).unwrap();
        assert_eq!(cleared.price, Some(None));

        let set: UpdateListingRequest = serde_json::from_str(r#"{"price":25000}"#).unwrap();
        assert_eq!(set.into_changes().price, Some(Some(25000)));
    }

    #[test]
    fn zero_price_is_stored_as_no_price() {
        let zero: UpdateListingRequest = serde_json::from_str(r#"{"price":0}"#).unwrap();
        assert_eq!(zero.into_changes().price, Some(None));
    }
}
