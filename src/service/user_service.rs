use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::dto::profile_dto::{ProfileView, UpdateProfileRequest};
use crate::dto::review_dto::ReviewView;
use crate::model::user::{Plan, PublicUser, User, UserChanges};
use crate::repository::listing_repo::ListingRepository;
use crate::repository::review_repo::ReviewRepository;
use crate::repository::user_repo::UserRepository;
use crate::util::error::{ServiceError, ServiceResult};
use crate::util::image_store::{ImageStore, ImageStoreError, ImageUpload};

pub const PROFILE_NOT_FOUND: &str = "User profile not found.";
/// Shown wherever a user document is missing or has no name.
pub const FALLBACK_NAME: &str = "User";

#[async_trait]
pub trait UserService: Send + Sync {
    async fn get_user(&self, user_id: &str) -> ServiceResult<User>;
    async fn get_profile(&self, user_id: &str) -> ServiceResult<ProfileView>;
    async fn update_profile(&self, user_id: &str, request: UpdateProfileRequest) -> ServiceResult<PublicUser>;
    async fn upload_profile_photo(&self, user_id: &str, image: ImageUpload) -> ServiceResult<PublicUser>;
    /// Load the user and store `spark` if the document has no plan yet.
    async fn ensure_plan(&self, user_id: &str) -> ServiceResult<User>;
    async fn display_name(&self, user_id: &str) -> String;
}

pub struct UserServiceImpl {
    pub user_repo: Arc<dyn UserRepository>,
    pub listing_repo: Arc<dyn ListingRepository>,
    pub review_repo: Arc<dyn ReviewRepository>,
    pub image_store: Arc<dyn ImageStore>,
}

impl UserServiceImpl {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        listing_repo: Arc<dyn ListingRepository>,
        review_repo: Arc<dyn ReviewRepository>,
        image_store: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            user_repo,
            listing_repo,
            review_repo,
            image_store,
        }
    }
}

pub(crate) fn image_error(err: ImageStoreError) -> ServiceError {
    match err {
        ImageStoreError::UnsupportedType(_) => {
            ServiceError::InvalidInput("Please choose a JPEG, PNG, WebP or GIF image.".to_string())
        }
        ImageStoreError::TooLarge => ServiceError::InvalidInput("That image is too large (10 MB max).".to_string()),
        other => ServiceError::InternalError(format!("Image upload failed: {}", other)),
    }
}

#[async_trait]
impl UserService for UserServiceImpl {
    async fn get_user(&self, user_id: &str) -> ServiceResult<User> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(PROFILE_NOT_FOUND.to_string()))
    }

    #[instrument(skip(self))]
    async fn get_profile(&self, user_id: &str) -> ServiceResult<ProfileView> {
        let user = self.get_user(user_id).await?;
        let mut listings = self.listing_repo.list_by_provider(user_id).await?;
        listings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let mut reviews = self.review_repo.list_for_subject(user_id).await?;
        reviews.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(ProfileView {
            user: PublicUser::from(&user),
            listings,
            reviews: reviews.iter().map(ReviewView::from).collect(),
        })
    }

    #[instrument(skip(self, request))]
    async fn update_profile(&self, user_id: &str, request: UpdateProfileRequest) -> ServiceResult<PublicUser> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(ServiceError::InvalidInput("Please enter your name.".to_string()));
        }
        self.get_user(user_id).await?;
        let changes = UserChanges {
            name: Some(name.to_string()),
            bio: Some(request.bio.trim().to_string()),
            whatsapp: Some(
                request
                    .whatsapp
                    .map(|w| w.trim().to_string())
                    .filter(|w| !w.is_empty()),
            ),
            ..Default::default()
        };
        let user = self.user_repo.update(user_id, changes).await.map_err(|e| {
            error!("Failed to update profile: {e}");
            e
        })?;
        info!("Profile updated");
        Ok(PublicUser::from(&user))
    }

    #[instrument(skip(self, image), fields(size = image.bytes.len()))]
    async fn upload_profile_photo(&self, user_id: &str, image: ImageUpload) -> ServiceResult<PublicUser> {
        image.check().map_err(image_error)?;
        self.get_user(user_id).await?;
        let url = self
            .image_store
            .upload(&format!("profiles/{}", user_id), image)
            .await
            .map_err(image_error)?;
        let changes = UserChanges {
            profile_photo_url: Some(url),
            ..Default::default()
        };
        let user = self.user_repo.update(user_id, changes).await?;
        info!("Profile photo updated");
        Ok(PublicUser::from(&user))
    }

    #[instrument(skip(self))]
    async fn ensure_plan(&self, user_id: &str) -> ServiceResult<User> {
        let mut user = self.get_user(user_id).await?;
        if user.plan.is_none() {
            info!("User has no plan, storing spark");
            let changes = UserChanges {
                plan: Some(Plan::Spark),
                ..Default::default()
            };
            user = self.user_repo.update(user_id, changes).await?;
        }
        Ok(user)
    }

    async fn display_name(&self, user_id: &str) -> String {
        match self.user_repo.find_by_id(user_id).await {
            Ok(Some(user)) if !user.name.trim().is_empty() => user.name,
            Ok(_) => FALLBACK_NAME.to_string(),
            Err(e) => {
                error!(user_id, "Could not fetch user name: {e}");
                FALLBACK_NAME.to_string()
            }
        }
    }
}
