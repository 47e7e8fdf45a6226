use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{error, info, instrument, warn};

use crate::dto::listing_dto::NewListing;
use crate::model::listing::{ListingChanges, ServiceListing};
use crate::model::new_id;
use crate::repository::listing_repo::ListingRepository;
use crate::repository::user_repo::UserRepository;
use crate::service::user_service::{image_error, PROFILE_NOT_FOUND};
use crate::util::error::{ServiceError, ServiceResult};
use crate::util::image_store::ImageStore;
use crate::util::jwt::Claims;

pub const NO_IMAGE: &str = "Please select an image file.";
pub const SERVICE_NOT_FOUND: &str = "Service not found.";
/// How many featured listings the home page shows.
pub const FEATURED_LIMIT: usize = 6;
const IMAGE_FOLDER: &str = "services";

pub fn plan_limit_message(limit: u64) -> String {
    format!(
        "Your current plan allows {} listing{}. Upgrade to add more.",
        limit,
        if limit == 1 { "" } else { "s" }
    )
}

#[async_trait]
pub trait ListingService: Send + Sync {
    async fn create_listing(&self, owner_id: &str, draft: NewListing) -> ServiceResult<ServiceListing>;
    async fn update_listing(&self, actor: &Claims, id: &str, changes: ListingChanges) -> ServiceResult<ServiceListing>;
    async fn delete_listing(&self, actor: &Claims, id: &str) -> ServiceResult<()>;
    async fn get_listing(&self, id: &str) -> ServiceResult<ServiceListing>;
    /// Newest first.
    async fn list_all(&self) -> ServiceResult<Vec<ServiceListing>>;
    async fn search(&self, query: &str) -> ServiceResult<Vec<ServiceListing>>;
    async fn featured(&self, limit: usize) -> ServiceResult<Vec<ServiceListing>>;
    async fn list_by_provider(&self, provider_id: &str) -> ServiceResult<Vec<ServiceListing>>;
}

pub struct ListingServiceImpl {
    pub listing_repo: Arc<dyn ListingRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub image_store: Arc<dyn ImageStore>,
    /// One lock per provider, held from the plan-limit count to the insert.
    create_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl ListingServiceImpl {
    pub fn new(
        listing_repo: Arc<dyn ListingRepository>,
        user_repo: Arc<dyn UserRepository>,
        image_store: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            listing_repo,
            user_repo,
            image_store,
            create_locks: Mutex::new(HashMap::new()),
        }
    }

    fn create_lock(&self, owner_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.create_locks.lock().unwrap_or_else(|p| p.into_inner());
        locks.retain(|id, lock| id == owner_id || Arc::strong_count(lock) > 1);
        locks.entry(owner_id.to_string()).or_default().clone()
    }

    async fn owned_listing(&self, actor: &Claims, id: &str) -> ServiceResult<ServiceListing> {
        let listing = self.get_listing(id).await?;
        if !listing.is_owned_by(actor.user_id()) && !actor.is_admin() {
            warn!(listing_id = %id, actor = %actor.user_id(), "Refused change to someone else's listing");
            return Err(ServiceError::Forbidden(
                "You can only change your own services.".to_string(),
            ));
        }
        Ok(listing)
    }
}

fn newest_first(mut listings: Vec<ServiceListing>) -> Vec<ServiceListing> {
    listings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    listings
}

#[async_trait]
impl ListingService for ListingServiceImpl {
    #[instrument(skip(self, draft), fields(title = %draft.title))]
    async fn create_listing(&self, owner_id: &str, draft: NewListing) -> ServiceResult<ServiceListing> {
        let Some(image) = draft.image else {
            return Err(ServiceError::InvalidInput(NO_IMAGE.to_string()));
        };
        let title = draft.title.trim();
        let description = draft.description.trim();
        if title.is_empty() || description.is_empty() {
            return Err(ServiceError::InvalidInput(
                "Please fill in the service title and description.".to_string(),
            ));
        }
        image.check().map_err(image_error)?;

        let owner = self
            .user_repo
            .find_by_id(owner_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(PROFILE_NOT_FOUND.to_string()))?;
        let lock = self.create_lock(owner_id);
        let _slot = lock.lock().await;
        if let Some(limit) = owner.effective_plan().listing_limit() {
            let existing = self.listing_repo.count_by_provider(owner_id).await?;
            if existing >= limit {
                info!(existing, limit, plan = owner.effective_plan().as_str(), "Listing limit reached");
                return Err(ServiceError::Forbidden(plan_limit_message(limit)));
            }
        }

        let image_url = self.image_store.upload(IMAGE_FOLDER, image).await.map_err(|e| {
            error!("Image upload failed: {e}");
            image_error(e)
        })?;
        let now = Utc::now();
        let listing = ServiceListing {
            id: new_id(),
            title: title.to_string(),
            description: description.to_string(),
            price: draft.price.filter(|p| *p > 0),
            image_url,
            provider_id: owner.id.clone(),
            provider_name: owner.name.clone(),
            is_featured: false,
            created_at: now,
            updated_at: now,
        };
        let listing = self.listing_repo.create(listing).await?;
        info!(listing_id = %listing.id, "Service listing created");
        Ok(listing)
    }

    #[instrument(skip(self, actor, changes), fields(actor = %actor.user_id()))]
    async fn update_listing(&self, actor: &Claims, id: &str, changes: ListingChanges) -> ServiceResult<ServiceListing> {
        let mut preview = self.owned_listing(actor, id).await?;
        changes.apply(&mut preview);
        if preview.title.trim().is_empty() || preview.description.trim().is_empty() {
            return Err(ServiceError::InvalidInput(
                "Please fill in the service title and description.".to_string(),
            ));
        }
        let listing = self.listing_repo.update(id, changes).await?;
        info!("Service listing updated");
        Ok(listing)
    }

    #[instrument(skip(self, actor), fields(actor = %actor.user_id()))]
    async fn delete_listing(&self, actor: &Claims, id: &str) -> ServiceResult<()> {
        self.owned_listing(actor, id).await?;
        self.listing_repo.delete(id).await?;
        info!("Service listing deleted");
        Ok(())
    }

    async fn get_listing(&self, id: &str) -> ServiceResult<ServiceListing> {
        self.listing_repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(SERVICE_NOT_FOUND.to_string()))
    }

    async fn list_all(&self) -> ServiceResult<Vec<ServiceListing>> {
        Ok(newest_first(self.listing_repo.list_all().await?))
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> ServiceResult<Vec<ServiceListing>> {
        let listings = self.list_all().await?;
        Ok(listings.into_iter().filter(|l| l.matches(query)).collect())
    }

    async fn featured(&self, limit: usize) -> ServiceResult<Vec<ServiceListing>> {
        let listings = self.list_all().await?;
        Ok(listings.into_iter().filter(|l| l.is_featured).take(limit).collect())
    }

    async fn list_by_provider(&self, provider_id: &str) -> ServiceResult<Vec<ServiceListing>> {
        Ok(newest_first(self.listing_repo.list_by_provider(provider_id).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::user::{Plan, Role, User};
    use crate::repository::memory::{InMemoryListingRepository, InMemoryUserRepository};
    use crate::util::image_store::{ImageStoreError, ImageUpload, InMemoryImageStore};
    use bytes::Bytes;
    use std::time::Duration;

    /// Holds every upload long enough for a second request to overlap.
    #[derive(Default)]
    struct SlowImageStore {
        inner: InMemoryImageStore,
    }

    #[async_trait]
    impl ImageStore for SlowImageStore {
        async fn upload(&self, folder: &str, image: ImageUpload) -> Result<String, ImageStoreError> {
            tokio::time::sleep(Duration::from_millis(50)).await;
            self.inner.upload(folder, image).await
        }
    }

    fn draft(title: &str) -> NewListing {
        NewListing {
            title: title.to_string(),
            description: "Weekly garden care".to_string(),
            price: Some(15_000),
            image: Some(ImageUpload {
                file_name: "garden.png".into(),
                content_type: "image/png".into(),
                bytes: Bytes::from_static(b"png"),
            }),
        }
    }

    async fn spark_user(users: &InMemoryUserRepository) -> User {
        let now = Utc::now();
        users
            .insert(User {
                id: new_id(),
                name: "Grace".into(),
                email: "grace@example.com".into(),
                password_hash: String::new(),
                role: Role::User,
                plan: Some(Plan::Spark),
                bio: String::new(),
                profile_photo_url: String::new(),
                whatsapp: None,
                email_verified: true,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn concurrent_creates_respect_the_plan_limit() {
        let users = Arc::new(InMemoryUserRepository::default());
        let listings = Arc::new(InMemoryListingRepository::default());
        let images = Arc::new(SlowImageStore::default());
        let owner = spark_user(&users).await;
        let service = ListingServiceImpl::new(listings.clone(), users, images.clone());

        let (first, second) = tokio::join!(
            service.create_listing(&owner.id, draft("Gardening")),
            service.create_listing(&owner.id, draft("Hedge trimming")),
        );

        let results = [first, second];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(ServiceError::Forbidden(m)) if m == &plan_limit_message(1))));
        assert_eq!(listings.count_by_provider(&owner.id).await.unwrap(), 1);
        assert_eq!(images.inner.upload_count(), 1);
    }

    #[test]
    fn limit_message_pluralizes() {
        assert_eq!(
            plan_limit_message(1),
            "Your current plan allows 1 listing. Upgrade to add more."
        );
        assert_eq!(
            plan_limit_message(10),
            "Your current plan allows 10 listings. Upgrade to add more."
        );
    }
}
