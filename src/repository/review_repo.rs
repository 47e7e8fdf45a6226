use crate::model::review::Review;
use crate::repository::mongo::REVIEWS;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::doc;
use futures::stream::TryStreamExt;
use mongodb::{options::ReplaceOptions, Database};
use tracing::{info, instrument};

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Insert or replace the review keyed by (subject, reviewer).
    async fn upsert(&self, review: Review) -> RepositoryResult<Review>;
    async fn find(&self, subject_id: &str, reviewer_id: &str) -> RepositoryResult<Option<Review>>;
    async fn list_for_subject(&self, subject_id: &str) -> RepositoryResult<Vec<Review>>;
}

pub struct MongoReviewRepository {
    collection: mongodb::Collection<Review>,
}

impl MongoReviewRepository {
    pub fn new(db: &Database) -> Self {
        MongoReviewRepository {
            collection: db.collection::<Review>(REVIEWS),
        }
    }
}

#[async_trait]
impl ReviewRepository for MongoReviewRepository {
    #[instrument(skip(self, review), fields(subject = %review.subject_id, reviewer = %review.reviewer_id))]
    async fn upsert(&self, mut review: Review) -> RepositoryResult<Review> {
        review.id = Review::key(&review.subject_id, &review.reviewer_id);
        let options = ReplaceOptions::builder().upsert(true).build();
        self.collection
            .replace_one(doc! { "_id": review.id.as_str() }, &review, options)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to save review: {}", e)))?;
        info!("Review saved");
        Ok(review)
    }

    async fn find(&self, subject_id: &str, reviewer_id: &str) -> RepositoryResult<Option<Review>> {
        self.collection
            .find_one(doc! { "_id": Review::key(subject_id, reviewer_id) }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to fetch review: {}", e)))
    }

    async fn list_for_subject(&self, subject_id: &str) -> RepositoryResult<Vec<Review>> {
        let cursor = self
            .collection
            .find(doc! { "subjectId": subject_id }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to list reviews: {}", e)))?;
        cursor
            .try_collect()
            .await
            .map_err(|e| RepositoryError::serialization(format!("Failed to deserialize review: {}", e)))
    }
}
