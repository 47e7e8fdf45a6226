use crate::model::question::Question;
use crate::repository::mongo::QUESTIONS;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::doc;
use chrono::{DateTime, Utc};
use futures::stream::TryStreamExt;
use mongodb::Database;
use tracing::{info, instrument};

#[async_trait]
pub trait QuestionRepository: Send + Sync {
    async fn create(&self, question: Question) -> RepositoryResult<Question>;
    async fn get_by_id(&self, id: &str) -> RepositoryResult<Option<Question>>;
    /// Set the answer only if none exists yet. Returns false when the question
    /// was already answered.
    async fn answer(&self, id: &str, answer: &str, at: DateTime<Utc>) -> RepositoryResult<bool>;
    async fn list_for_service(&self, service_id: &str) -> RepositoryResult<Vec<Question>>;
}

pub struct MongoQuestionRepository {
    collection: mongodb::Collection<Question>,
}

impl MongoQuestionRepository {
    pub fn new(db: &Database) -> Self {
        MongoQuestionRepository {
            collection: db.collection::<Question>(QUESTIONS),
        }
    }
}

#[async_trait]
impl QuestionRepository for MongoQuestionRepository {
    #[instrument(skip(self, question), fields(service_id = %question.service_id))]
    async fn create(&self, question: Question) -> RepositoryResult<Question> {
        self.collection
            .insert_one(&question, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to create question: {}", e)))?;
        info!("Question created");
        Ok(question)
    }

    async fn get_by_id(&self, id: &str) -> RepositoryResult<Option<Question>> {
        self.collection
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to fetch question: {}", e)))
    }

    #[instrument(skip(self, answer))]
    async fn answer(&self, id: &str, answer: &str, at: DateTime<Utc>) -> RepositoryResult<bool> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": id, "answer": null },
                doc! { "$set": { "answer": answer, "answeredAt": bson::to_bson(&at)? } },
                None,
            )
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to answer question: {}", e)))?;
        Ok(result.modified_count > 0)
    }

    async fn list_for_service(&self, service_id: &str) -> RepositoryResult<Vec<Question>> {
        let cursor = self
            .collection
            .find(doc! { "serviceId": service_id }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to list questions: {}", e)))?;
        cursor
            .try_collect()
            .await
            .map_err(|e| RepositoryError::serialization(format!("Failed to deserialize question: {}", e)))
    }
}
