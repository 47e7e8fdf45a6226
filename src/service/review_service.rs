use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::dto::review_dto::{ReviewView, SubmitReviewRequest};
use crate::model::review::{Review, MAX_RATING};
use crate::repository::review_repo::ReviewRepository;
use crate::repository::user_repo::UserRepository;
use crate::service::user_service::PROFILE_NOT_FOUND;
use crate::util::error::{ServiceError, ServiceResult};

pub const MISSING_RATING: &str = "Please select a rating.";
const ANONYMOUS: &str = "Anonymous";

#[async_trait]
pub trait ReviewService: Send + Sync {
    /// Store the reviewer's opinion of `subject_id`, replacing an earlier one.
    async fn submit_review(&self, reviewer_id: &str, subject_id: &str, request: SubmitReviewRequest) -> ServiceResult<Review>;
    async fn has_reviewed(&self, reviewer_id: &str, subject_id: &str) -> ServiceResult<bool>;
    /// Newest first.
    async fn list_for(&self, subject_id: &str) -> ServiceResult<Vec<ReviewView>>;
}

pub struct ReviewServiceImpl {
    pub review_repo: Arc<dyn ReviewRepository>,
    pub user_repo: Arc<dyn UserRepository>,
}

impl ReviewServiceImpl {
    pub fn new(review_repo: Arc<dyn ReviewRepository>, user_repo: Arc<dyn UserRepository>) -> Self {
        Self { review_repo, user_repo }
    }
}

#[async_trait]
impl ReviewService for ReviewServiceImpl {
    #[instrument(skip(self, request), fields(rating = request.rating))]
    async fn submit_review(&self, reviewer_id: &str, subject_id: &str, request: SubmitReviewRequest) -> ServiceResult<Review> {
        let rating = u8::try_from(request.rating)
            .ok()
            .filter(|r| (1..=MAX_RATING).contains(r))
            .ok_or_else(|| ServiceError::InvalidInput(MISSING_RATING.to_string()))?;
        if reviewer_id == subject_id {
            return Err(ServiceError::InvalidInput("You cannot review yourself.".to_string()));
        }
        if self.user_repo.find_by_id(subject_id).await?.is_none() {
            return Err(ServiceError::NotFound(PROFILE_NOT_FOUND.to_string()));
        }
        let reviewer_name = match self.user_repo.find_by_id(reviewer_id).await? {
            Some(user) if !user.name.trim().is_empty() => user.name,
            _ => ANONYMOUS.to_string(),
        };
        let review = Review {
            id: Review::key(subject_id, reviewer_id),
            subject_id: subject_id.to_string(),
            reviewer_id: reviewer_id.to_string(),
            reviewer_name,
            rating,
            text: request.text.trim().to_string(),
            timestamp: Utc::now(),
        };
        let review = self.review_repo.upsert(review).await?;
        info!(review_id = %review.id, "Review stored");
        Ok(review)
    }

    async fn has_reviewed(&self, reviewer_id: &str, subject_id: &str) -> ServiceResult<bool> {
        Ok(self.review_repo.find(subject_id, reviewer_id).await?.is_some())
    }

    async fn list_for(&self, subject_id: &str) -> ServiceResult<Vec<ReviewView>> {
        let mut reviews = self.review_repo.list_for_subject(subject_id).await?;
        reviews.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(reviews.iter().map(ReviewView::from).collect())
    }
}
