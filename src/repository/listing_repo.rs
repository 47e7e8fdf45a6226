use crate::model::listing::{ListingChanges, ServiceListing};
use crate::repository::mongo::SERVICES;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::doc;
use futures::stream::TryStreamExt;
use chrono::Utc;
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};
use mongodb::Database;
use tracing::{error, info, instrument};

#[async_trait]
pub trait ListingRepository: Send + Sync {
    async fn create(&self, listing: ServiceListing) -> RepositoryResult<ServiceListing>;
    async fn get_by_id(&self, id: &str) -> RepositoryResult<Option<ServiceListing>>;
    /// Write only the fields named in `changes`; returns the stored listing.
    async fn update(&self, id: &str, changes: ListingChanges) -> RepositoryResult<ServiceListing>;
    async fn delete(&self, id: &str) -> RepositoryResult<()>;
    async fn list_all(&self) -> RepositoryResult<Vec<ServiceListing>>;
    async fn list_by_provider(&self, provider_id: &str) -> RepositoryResult<Vec<ServiceListing>>;
    async fn count_by_provider(&self, provider_id: &str) -> RepositoryResult<u64>;
    async fn set_featured(&self, id: &str, featured: bool) -> RepositoryResult<()>;
}

pub struct MongoListingRepository {
    collection: mongodb::Collection<ServiceListing>,
}

impl MongoListingRepository {
    pub fn new(db: &Database) -> Self {
        MongoListingRepository {
            collection: db.collection::<ServiceListing>(SERVICES),
        }
    }

    async fn find_many(&self, filter: Option<bson::Document>) -> RepositoryResult<Vec<ServiceListing>> {
        let cursor = self
            .collection
            .find(filter, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to list services: {}", e)))?;
        cursor
            .try_collect()
            .await
            .map_err(|e| RepositoryError::serialization(format!("Failed to deserialize service: {}", e)))
    }
}

#[async_trait]
impl ListingRepository for MongoListingRepository {
    #[instrument(skip(self, listing), fields(title = %listing.title, provider = %listing.provider_id))]
    async fn create(&self, listing: ServiceListing) -> RepositoryResult<ServiceListing> {
        info!("Creating new service listing");
        match self.collection.insert_one(&listing, None).await {
            Ok(_) => {
                info!(id = %listing.id, "Service listing created");
                Ok(listing)
            }
            Err(e) => {
                error!("Failed to create service listing: {}", e);
                Err(RepositoryError::database(format!("Failed to create service listing: {}", e)))
            }
        }
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: &str) -> RepositoryResult<Option<ServiceListing>> {
        self.collection
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to fetch service by ID: {}", e)))
    }

    #[instrument(skip(self, changes))]
    async fn update(&self, id: &str, changes: ListingChanges) -> RepositoryResult<ServiceListing> {
        let set = changes.set_document(Utc::now())?;
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set }, options)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to update service: {}", e)))?;
        updated.ok_or_else(|| {
            error!("No service found to update");
            RepositoryError::not_found(format!("No service found to update for ID: {}", id))
        })
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> RepositoryResult<()> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to delete service: {}", e)))?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::not_found(format!("No service found to delete for ID: {}", id)));
        }
        info!("Service listing deleted");
        Ok(())
    }

    async fn list_all(&self) -> RepositoryResult<Vec<ServiceListing>> {
        self.find_many(None).await
    }

    async fn list_by_provider(&self, provider_id: &str) -> RepositoryResult<Vec<ServiceListing>> {
        self.find_many(Some(doc! { "providerId": provider_id })).await
    }

    async fn count_by_provider(&self, provider_id: &str) -> RepositoryResult<u64> {
        self.collection
            .count_documents(doc! { "providerId": provider_id }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to count services: {}", e)))
    }

    #[instrument(skip(self))]
    async fn set_featured(&self, id: &str, featured: bool) -> RepositoryResult<()> {
        let result = self
            .collection
            .update_one(doc! { "_id": id }, doc! { "$set": { "isFeatured": featured } }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to update featured flag: {}", e)))?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!("No service found for ID: {}", id)));
        }
        Ok(())
    }
}
