use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A service offered by a provider. Stored in the `services` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceListing {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    /// Whole UGX. Absent or zero renders as "Contact for Quote".
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub image_url: String,
    pub provider_id: String,
    pub provider_name: String,
    #[serde(default)]
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ServiceListing {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.provider_id == user_id
    }

    /// Case-insensitive match on title, description and provider name.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
            || self.provider_name.to_lowercase().contains(&needle)
    }
}

/// Partial update applied by the owner or an admin.
#[derive(Debug, Clone, Default)]
pub struct ListingChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Option<i64>>,
    pub image_url: Option<String>,
}

impl ListingChanges {
    pub fn apply(&self, listing: &mut ServiceListing) {
        if let Some(title) = &self.title {
            listing.title = title.clone();
        }
        if let Some(description) = &self.description {
            listing.description = description.clone();
        }
        if let Some(price) = self.price {
            listing.price = price;
        }
        if let Some(image_url) = &self.image_url {
            listing.image_url = image_url.clone();
        }
    }

    /// `$set` body touching only the changed fields and `updatedAt`.
    pub fn set_document(&self, at: DateTime<Utc>) -> Result<bson::Document, bson::ser::Error> {
        let mut set = bson::Document::new();
        if let Some(title) = &self.title {
            set.insert("title", title.as_str());
        }
        if let Some(description) = &self.description {
            set.insert("description", description.as_str());
        }
        if let Some(price) = self.price {
            set.insert("price", bson::to_bson(&price)?);
        }
        if let Some(image_url) = &self.image_url {
            set.insert("imageUrl", image_url.as_str());
        }
        set.insert("updatedAt", bson::to_bson(&at)?);
        Ok(set)
    }
}
