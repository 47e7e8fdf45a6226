use crate::model::chat::{Chat, Message};
use crate::repository::mongo::{CHATS, MESSAGES};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::doc;
use chrono::{DateTime, Utc};
use futures::stream::TryStreamExt;
use mongodb::{options::UpdateOptions, Database};
use tracing::{debug, error, info, instrument};

#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// Create the chat if missing and merge `users` into its participant set.
    async fn ensure_chat(&self, chat_id: &str, users: &[String]) -> RepositoryResult<Chat>;
    async fn get(&self, chat_id: &str) -> RepositoryResult<Option<Chat>>;
    /// Append the message, then move the chat's last-message summary forward.
    async fn append_message(&self, message: Message) -> RepositoryResult<Message>;
    async fn mark_read(&self, chat_id: &str, user_id: &str, at: DateTime<Utc>) -> RepositoryResult<()>;
    async fn list_for_user(&self, user_id: &str) -> RepositoryResult<Vec<Chat>>;
    /// Messages of a chat, oldest first.
    async fn list_messages(&self, chat_id: &str) -> RepositoryResult<Vec<Message>>;
}

pub struct MongoChatRepository {
    chats: mongodb::Collection<Chat>,
    messages: mongodb::Collection<Message>,
}

impl MongoChatRepository {
    pub fn new(db: &Database) -> Self {
        MongoChatRepository {
            chats: db.collection::<Chat>(CHATS),
            messages: db.collection::<Message>(MESSAGES),
        }
    }
}

#[async_trait]
impl ChatRepository for MongoChatRepository {
    #[instrument(skip(self, users))]
    async fn ensure_chat(&self, chat_id: &str, users: &[String]) -> RepositoryResult<Chat> {
        let options = UpdateOptions::builder().upsert(true).build();
        self.chats
            .update_one(
                doc! { "_id": chat_id },
                doc! {
                    "$addToSet": { "users": { "$each": users.to_vec() } },
                    "$setOnInsert": { "lastRead": {} },
                },
                options,
            )
            .await
            .map_err(|e| {
                error!("Failed to upsert chat: {}", e);
                RepositoryError::database(format!("Failed to upsert chat: {}", e))
            })?;
        self.get(chat_id)
            .await?
            .ok_or_else(|| RepositoryError::not_found(format!("Chat vanished after upsert: {}", chat_id)))
    }

    async fn get(&self, chat_id: &str) -> RepositoryResult<Option<Chat>> {
        self.chats
            .find_one(doc! { "_id": chat_id }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to fetch chat: {}", e)))
    }

    #[instrument(skip(self, message), fields(chat_id = %message.chat_id, sender = %message.sender_id))]
    async fn append_message(&self, message: Message) -> RepositoryResult<Message> {
        self.messages
            .insert_one(&message, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to insert message: {}", e)))?;

        let at = bson::to_bson(&message.timestamp)?;
        let read_key = format!("lastRead.{}", message.sender_id);
        let result = self
            .chats
            .update_one(
                doc! { "_id": message.chat_id.as_str() },
                doc! { "$set": {
                    "lastMessage": message.text.as_str(),
                    "lastUpdated": at.clone(),
                    "lastSenderId": message.sender_id.as_str(),
                    read_key: at,
                } },
                None,
            )
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to update chat summary: {}", e)))?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!("Chat not found: {}", message.chat_id)));
        }
        info!("Message appended");
        Ok(message)
    }

    async fn mark_read(&self, chat_id: &str, user_id: &str, at: DateTime<Utc>) -> RepositoryResult<()> {
        let read_key = format!("lastRead.{}", user_id);
        self.chats
            .update_one(doc! { "_id": chat_id }, doc! { "$set": { read_key: bson::to_bson(&at)? } }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to mark chat read: {}", e)))?;
        debug!(chat_id, user_id, "Chat marked read");
        Ok(())
    }

    async fn list_for_user(&self, user_id: &str) -> RepositoryResult<Vec<Chat>> {
        let cursor = self
            .chats
            .find(doc! { "users": user_id }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to list chats: {}", e)))?;
        cursor
            .try_collect()
            .await
            .map_err(|e| RepositoryError::serialization(format!("Failed to deserialize chat: {}", e)))
    }

    async fn list_messages(&self, chat_id: &str) -> RepositoryResult<Vec<Message>> {
        let cursor = self
            .messages
            .find(doc! { "chatId": chat_id }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to list messages: {}", e)))?;
        let mut messages: Vec<Message> = cursor
            .try_collect()
            .await
            .map_err(|e| RepositoryError::serialization(format!("Failed to deserialize message: {}", e)))?;
        messages.sort_by_key(|m| m.timestamp);
        Ok(messages)
    }
}
