use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::dto::request_dto::{CreateServiceRequest, RequestBoard};
use crate::model::new_id;
use crate::model::service_request::ServiceRequest;
use crate::repository::request_repo::ServiceRequestRepository;
use crate::repository::user_repo::UserRepository;
use crate::util::error::{ServiceError, ServiceResult};

#[async_trait]
pub trait ServiceRequestService: Send + Sync {
    async fn create_request(&self, requester_id: &str, request: CreateServiceRequest) -> ServiceResult<ServiceRequest>;
    /// Requests still inside the recent window at `now`, newest first.
    async fn board(&self, now: DateTime<Utc>) -> ServiceResult<RequestBoard>;
}

pub struct ServiceRequestServiceImpl {
    pub request_repo: Arc<dyn ServiceRequestRepository>,
    pub user_repo: Arc<dyn UserRepository>,
}

impl ServiceRequestServiceImpl {
    pub fn new(request_repo: Arc<dyn ServiceRequestRepository>, user_repo: Arc<dyn UserRepository>) -> Self {
        Self {
            request_repo,
            user_repo,
        }
    }
}

#[async_trait]
impl ServiceRequestService for ServiceRequestServiceImpl {
    #[instrument(skip(self, request), fields(title = %request.title))]
    async fn create_request(&self, requester_id: &str, request: CreateServiceRequest) -> ServiceResult<ServiceRequest> {
        let title = request.title.trim();
        let description = request.description.trim();
        if title.is_empty() || description.is_empty() {
            return Err(ServiceError::InvalidInput(
                "Please fill in the title and description.".to_string(),
            ));
        }
        let requester_name = match self.user_repo.find_by_id(requester_id).await? {
            Some(user) if !user.name.trim().is_empty() => user.name,
            _ => "Anonymous".to_string(),
        };
        let now = Utc::now();
        let stored = ServiceRequest {
            id: new_id(),
            title: title.to_string(),
            description: description.to_string(),
            requester_id: requester_id.to_string(),
            requester_name,
            created_at: now,
            expires_at: request.ttl_days.map(|days| now + Duration::days(days)),
        };
        let stored = self.request_repo.create(stored).await?;
        info!(request_id = %stored.id, "Service request posted");
        Ok(stored)
    }

    async fn board(&self, now: DateTime<Utc>) -> ServiceResult<RequestBoard> {
        let all = self.request_repo.list_all().await?;
        let total = all.len();
        let mut recent: Vec<ServiceRequest> = all.into_iter().filter(|r| r.is_recent(now)).collect();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(RequestBoard { total, recent })
    }
}
