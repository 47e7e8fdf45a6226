use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::dto::admin_dto::AdminOverview;
use crate::model::user::{Plan, PublicUser, UserChanges};
use crate::repository::listing_repo::ListingRepository;
use crate::repository::user_repo::UserRepository;
use crate::service::listing_service::SERVICE_NOT_FOUND;
use crate::service::user_service::PROFILE_NOT_FOUND;
use crate::util::error::{ServiceError, ServiceResult};

#[async_trait]
pub trait AdminService: Send + Sync {
    async fn overview(&self) -> ServiceResult<AdminOverview>;
    async fn set_featured(&self, listing_id: &str, featured: bool) -> ServiceResult<()>;
    async fn set_plan(&self, user_id: &str, plan: Plan) -> ServiceResult<PublicUser>;
}

pub struct AdminServiceImpl {
    pub listing_repo: Arc<dyn ListingRepository>,
    pub user_repo: Arc<dyn UserRepository>,
}

impl AdminServiceImpl {
    pub fn new(listing_repo: Arc<dyn ListingRepository>, user_repo: Arc<dyn UserRepository>) -> Self {
        Self {
            listing_repo,
            user_repo,
        }
    }
}

#[async_trait]
impl AdminService for AdminServiceImpl {
    #[instrument(skip(self))]
    async fn overview(&self) -> ServiceResult<AdminOverview> {
        let (listings, users) = tokio::try_join!(self.listing_repo.list_all(), self.user_repo.list())?;
        let mut listings = listings;
        listings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let mut users: Vec<PublicUser> = users.iter().map(PublicUser::from).collect();
        users.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(AdminOverview {
            listing_count: listings.len(),
            user_count: users.len(),
            listings,
            users,
        })
    }

    #[instrument(skip(self))]
    async fn set_featured(&self, listing_id: &str, featured: bool) -> ServiceResult<()> {
        if self.listing_repo.get_by_id(listing_id).await?.is_none() {
            return Err(ServiceError::NotFound(SERVICE_NOT_FOUND.to_string()));
        }
        self.listing_repo.set_featured(listing_id, featured).await?;
        info!("Featured flag updated");
        Ok(())
    }

    #[instrument(skip(self), fields(plan = plan.as_str()))]
    async fn set_plan(&self, user_id: &str, plan: Plan) -> ServiceResult<PublicUser> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(PROFILE_NOT_FOUND.to_string()))?;
        let changes = UserChanges {
            plan: Some(plan),
            ..Default::default()
        };
        let user = self.user_repo.update(user_id, changes).await?;
        info!("Plan updated");
        Ok(PublicUser::from(&user))
    }
}
