//! In-process repositories used when `STORAGE_BACKEND=memory` and by the
//! integration tests. Each one mirrors the semantics of its Mongo twin.

use crate::model::chat::{Chat, Message};
use crate::model::listing::{ListingChanges, ServiceListing};
use crate::model::question::Question;
use crate::model::review::Review;
use crate::model::service_request::ServiceRequest;
use crate::model::user::{User, UserChanges};
use crate::repository::chat_repo::ChatRepository;
use crate::repository::listing_repo::ListingRepository;
use crate::repository::question_repo::QuestionRepository;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use crate::repository::request_repo::ServiceRequestRepository;
use crate::repository::review_repo::ReviewRepository;
use crate::repository::user_repo::UserRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: User) -> RepositoryResult<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::already_exists(format!("Duplicate email: {}", user.email)));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn update(&self, id: &str, changes: UserChanges) -> RepositoryResult<User> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(id)
            .ok_or_else(|| RepositoryError::not_found(format!("No user found to update for ID: {}", id)))?;
        changes.apply(user, Utc::now());
        Ok(user.clone())
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        Ok(self.users.read().await.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn list(&self) -> RepositoryResult<Vec<User>> {
        Ok(self.users.read().await.values().cloned().collect())
    }
}

#[derive(Default)]
pub struct InMemoryListingRepository {
    listings: RwLock<HashMap<String, ServiceListing>>,
}

#[async_trait]
impl ListingRepository for InMemoryListingRepository {
    async fn create(&self, listing: ServiceListing) -> RepositoryResult<ServiceListing> {
        self.listings.write().await.insert(listing.id.clone(), listing.clone());
        Ok(listing)
    }

    async fn get_by_id(&self, id: &str) -> RepositoryResult<Option<ServiceListing>> {
        Ok(self.listings.read().await.get(id).cloned())
    }

    async fn update(&self, id: &str, changes: ListingChanges) -> RepositoryResult<ServiceListing> {
        let mut listings = self.listings.write().await;
        let listing = listings
            .get_mut(id)
            .ok_or_else(|| RepositoryError::not_found(format!("No service found to update for ID: {}", id)))?;
        changes.apply(listing);
        listing.updated_at = Utc::now();
        Ok(listing.clone())
    }

    async fn delete(&self, id: &str) -> RepositoryResult<()> {
        self.listings
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found(format!("No service found to delete for ID: {}", id)))
    }

    async fn list_all(&self) -> RepositoryResult<Vec<ServiceListing>> {
        Ok(self.listings.read().await.values().cloned().collect())
    }

    async fn list_by_provider(&self, provider_id: &str) -> RepositoryResult<Vec<ServiceListing>> {
        Ok(self
            .listings
            .read()
            .await
            .values()
            .filter(|l| l.provider_id == provider_id)
            .cloned()
            .collect())
    }

    async fn count_by_provider(&self, provider_id: &str) -> RepositoryResult<u64> {
        Ok(self
            .listings
            .read()
            .await
            .values()
            .filter(|l| l.provider_id == provider_id)
            .count() as u64)
    }

    async fn set_featured(&self, id: &str, featured: bool) -> RepositoryResult<()> {
        let mut listings = self.listings.write().await;
        let listing = listings
            .get_mut(id)
            .ok_or_else(|| RepositoryError::not_found(format!("No service found for ID: {}", id)))?;
        listing.is_featured = featured;
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryChatRepository {
    chats: RwLock<HashMap<String, Chat>>,
    messages: RwLock<Vec<Message>>,
}

#[async_trait]
impl ChatRepository for InMemoryChatRepository {
    async fn ensure_chat(&self, chat_id: &str, users: &[String]) -> RepositoryResult<Chat> {
        let mut chats = self.chats.write().await;
        let chat = chats
            .entry(chat_id.to_string())
            .or_insert_with(|| Chat::new(chat_id.to_string(), Vec::new()));
        for user in users {
            if !chat.has_participant(user) {
                chat.users.push(user.clone());
            }
        }
        Ok(chat.clone())
    }

    async fn get(&self, chat_id: &str) -> RepositoryResult<Option<Chat>> {
        Ok(self.chats.read().await.get(chat_id).cloned())
    }

    async fn append_message(&self, message: Message) -> RepositoryResult<Message> {
        let mut chats = self.chats.write().await;
        let chat = chats
            .get_mut(&message.chat_id)
            .ok_or_else(|| RepositoryError::not_found(format!("Chat not found: {}", message.chat_id)))?;
        chat.last_message = Some(message.text.clone());
        chat.last_updated = Some(message.timestamp);
        chat.last_sender_id = Some(message.sender_id.clone());
        chat.last_read.insert(message.sender_id.clone(), message.timestamp);
        self.messages.write().await.push(message.clone());
        Ok(message)
    }

    async fn mark_read(&self, chat_id: &str, user_id: &str, at: DateTime<Utc>) -> RepositoryResult<()> {
        if let Some(chat) = self.chats.write().await.get_mut(chat_id) {
            chat.last_read.insert(user_id.to_string(), at);
        }
        Ok(())
    }

    async fn list_for_user(&self, user_id: &str) -> RepositoryResult<Vec<Chat>> {
        Ok(self
            .chats
            .read()
            .await
            .values()
            .filter(|c| c.has_participant(user_id))
            .cloned()
            .collect())
    }

    async fn list_messages(&self, chat_id: &str) -> RepositoryResult<Vec<Message>> {
        let mut messages: Vec<Message> = self
            .messages
            .read()
            .await
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.timestamp);
        Ok(messages)
    }
}

#[derive(Default)]
pub struct InMemoryReviewRepository {
    reviews: RwLock<HashMap<String, Review>>,
}

#[async_trait]
impl ReviewRepository for InMemoryReviewRepository {
    async fn upsert(&self, mut review: Review) -> RepositoryResult<Review> {
        review.id = Review::key(&review.subject_id, &review.reviewer_id);
        self.reviews.write().await.insert(review.id.clone(), review.clone());
        Ok(review)
    }

    async fn find(&self, subject_id: &str, reviewer_id: &str) -> RepositoryResult<Option<Review>> {
        Ok(self
            .reviews
            .read()
            .await
            .get(&Review::key(subject_id, reviewer_id))
            .cloned())
    }

    async fn list_for_subject(&self, subject_id: &str) -> RepositoryResult<Vec<Review>> {
        Ok(self
            .reviews
            .read()
            .await
            .values()
            .filter(|r| r.subject_id == subject_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryServiceRequestRepository {
    requests: RwLock<Vec<ServiceRequest>>,
}

#[async_trait]
impl ServiceRequestRepository for InMemoryServiceRequestRepository {
    async fn create(&self, request: ServiceRequest) -> RepositoryResult<ServiceRequest> {
        self.requests.write().await.push(request.clone());
        Ok(request)
    }

    async fn list_all(&self) -> RepositoryResult<Vec<ServiceRequest>> {
        Ok(self.requests.read().await.clone())
    }
}

#[derive(Default)]
pub struct InMemoryQuestionRepository {
    questions: RwLock<HashMap<String, Question>>,
}

#[async_trait]
impl QuestionRepository for InMemoryQuestionRepository {
    async fn create(&self, question: Question) -> RepositoryResult<Question> {
        self.questions.write().await.insert(question.id.clone(), question.clone());
        Ok(question)
    }

    async fn get_by_id(&self, id: &str) -> RepositoryResult<Option<Question>> {
        Ok(self.questions.read().await.get(id).cloned())
    }

    async fn answer(&self, id: &str, answer: &str, at: DateTime<Utc>) -> RepositoryResult<bool> {
        let mut questions = self.questions.write().await;
        match questions.get_mut(id) {
            Some(q) if q.answer.is_none() => {
                q.answer = Some(answer.to_string());
                q.answered_at = Some(at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_for_service(&self, service_id: &str) -> RepositoryResult<Vec<Question>> {
        Ok(self
            .questions
            .read()
            .await
            .values()
            .filter(|q| q.service_id == service_id)
            .cloned()
            .collect())
    }
}
