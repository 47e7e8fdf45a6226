use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::model::new_id;
use crate::model::question::Question;
use crate::repository::listing_repo::ListingRepository;
use crate::repository::question_repo::QuestionRepository;
use crate::repository::user_repo::UserRepository;
use crate::service::listing_service::SERVICE_NOT_FOUND;
use crate::util::error::{ServiceError, ServiceResult};
use crate::util::jwt::Claims;

#[async_trait]
pub trait QuestionService: Send + Sync {
    async fn ask(&self, asker_id: &str, service_id: &str, question: &str) -> ServiceResult<Question>;
    /// Only the listing's provider or an admin may answer, and only once.
    async fn answer(&self, actor: &Claims, question_id: &str, answer: &str) -> ServiceResult<Question>;
    /// Oldest first.
    async fn list_for_service(&self, service_id: &str) -> ServiceResult<Vec<Question>>;
}

pub struct QuestionServiceImpl {
    pub question_repo: Arc<dyn QuestionRepository>,
    pub listing_repo: Arc<dyn ListingRepository>,
    pub user_repo: Arc<dyn UserRepository>,
}

impl QuestionServiceImpl {
    pub fn new(
        question_repo: Arc<dyn QuestionRepository>,
        listing_repo: Arc<dyn ListingRepository>,
        user_repo: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            question_repo,
            listing_repo,
            user_repo,
        }
    }
}

#[async_trait]
impl QuestionService for QuestionServiceImpl {
    #[instrument(skip(self, question))]
    async fn ask(&self, asker_id: &str, service_id: &str, question: &str) -> ServiceResult<Question> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ServiceError::InvalidInput("Please type your question.".to_string()));
        }
        if self.listing_repo.get_by_id(service_id).await?.is_none() {
            return Err(ServiceError::NotFound(SERVICE_NOT_FOUND.to_string()));
        }
        let asker_name = match self.user_repo.find_by_id(asker_id).await? {
            Some(user) if !user.name.trim().is_empty() => user.name,
            _ => "Anonymous".to_string(),
        };
        let entry = Question {
            id: new_id(),
            service_id: service_id.to_string(),
            asker_id: asker_id.to_string(),
            asker_name,
            question: question.to_string(),
            answer: None,
            answered_at: None,
            created_at: Utc::now(),
        };
        let entry = self.question_repo.create(entry).await?;
        info!(question_id = %entry.id, "Question asked");
        Ok(entry)
    }

    #[instrument(skip(self, actor, answer), fields(actor = %actor.user_id()))]
    async fn answer(&self, actor: &Claims, question_id: &str, answer: &str) -> ServiceResult<Question> {
        let answer = answer.trim();
        if answer.is_empty() {
            return Err(ServiceError::InvalidInput("Please type an answer.".to_string()));
        }
        let question = self
            .question_repo
            .get_by_id(question_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Question not found.".to_string()))?;
        let listing = self
            .listing_repo
            .get_by_id(&question.service_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(SERVICE_NOT_FOUND.to_string()))?;
        if !listing.is_owned_by(actor.user_id()) && !actor.is_admin() {
            warn!("Answer refused, actor does not own the listing");
            return Err(ServiceError::Forbidden(
                "Only the service provider can answer questions.".to_string(),
            ));
        }
        if !self.question_repo.answer(question_id, answer, Utc::now()).await? {
            return Err(ServiceError::Conflict("This question has already been answered.".to_string()));
        }
        info!("Question answered");
        self.question_repo
            .get_by_id(question_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Question not found.".to_string()))
    }

    async fn list_for_service(&self, service_id: &str) -> ServiceResult<Vec<Question>> {
        let mut questions = self.question_repo.list_for_service(service_id).await?;
        questions.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(questions)
    }
}
