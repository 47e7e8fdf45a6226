use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::dto::chat_dto::{ChatView, ConversationSummary, MessageView};
use crate::model::chat::{chat_id_for, Chat, Message};
use crate::model::new_id;
use crate::repository::chat_repo::ChatRepository;
use crate::repository::review_repo::ReviewRepository;
use crate::repository::user_repo::UserRepository;
use crate::service::user_service::FALLBACK_NAME;
use crate::util::error::{ServiceError, ServiceResult};
use crate::util::realtime::{RealtimeEvent, RealtimeHub, Subscription, Topic};

pub const MISSING_RECIPIENT: &str = "Missing recipient ID in URL.";
const CHAT_NOT_FOUND: &str = "Conversation not found.";

#[async_trait]
pub trait ChatService: Send + Sync {
    /// Resolve (creating if needed) the conversation between `me` and the
    /// recipient, and mark it read for `me`.
    async fn open_chat(&self, me: &str, recipient_id: Option<&str>, chat_id: Option<&str>) -> ServiceResult<ChatView>;
    async fn send_message(&self, me: &str, chat_id: &str, text: &str) -> ServiceResult<Message>;
    async fn messages(&self, me: &str, chat_id: &str) -> ServiceResult<Vec<MessageView>>;
    /// Never fails; a missed read marker only leaves the chat bold in the inbox.
    async fn mark_read(&self, me: &str, chat_id: &str);
    async fn conversations(&self, me: &str) -> ServiceResult<Vec<ConversationSummary>>;
    async fn subscribe_chat(&self, me: &str, chat_id: &str) -> ServiceResult<Subscription>;
    fn subscribe_inbox(&self, me: &str) -> Subscription;
}

pub struct ChatServiceImpl {
    pub chat_repo: Arc<dyn ChatRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub review_repo: Arc<dyn ReviewRepository>,
    pub hub: RealtimeHub,
}

impl ChatServiceImpl {
    pub fn new(
        chat_repo: Arc<dyn ChatRepository>,
        user_repo: Arc<dyn UserRepository>,
        review_repo: Arc<dyn ReviewRepository>,
        hub: RealtimeHub,
    ) -> Self {
        Self {
            chat_repo,
            user_repo,
            review_repo,
            hub,
        }
    }

    async fn participant_chat(&self, me: &str, chat_id: &str) -> ServiceResult<Chat> {
        let chat = self
            .chat_repo
            .get(chat_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(CHAT_NOT_FOUND.to_string()))?;
        if !chat.has_participant(me) {
            warn!(chat_id, user_id = me, "Access to a conversation by a non-participant");
            return Err(ServiceError::Forbidden(
                "You are not part of this conversation.".to_string(),
            ));
        }
        Ok(chat)
    }

    async fn name_of(&self, user_id: &str) -> String {
        match self.user_repo.find_by_id(user_id).await {
            Ok(Some(user)) if !user.name.trim().is_empty() => user.name,
            Ok(_) => FALLBACK_NAME.to_string(),
            Err(e) => {
                warn!(user_id, "Could not fetch recipient name: {e}");
                FALLBACK_NAME.to_string()
            }
        }
    }
}

fn preview(chat: &Chat, me: &str) -> String {
    let prefix = if chat.last_sender_id.as_deref() == Some(me) { "You: " } else { "" };
    match chat.last_message.as_deref() {
        Some(text) if !text.is_empty() => format!("{}{}", prefix, text),
        _ => format!("{}No messages yet", prefix),
    }
}

#[async_trait]
impl ChatService for ChatServiceImpl {
    #[instrument(skip(self))]
    async fn open_chat(&self, me: &str, recipient_id: Option<&str>, chat_id: Option<&str>) -> ServiceResult<ChatView> {
        let recipient_id = recipient_id
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or_else(|| ServiceError::InvalidInput(MISSING_RECIPIENT.to_string()))?;
        if recipient_id == me {
            return Err(ServiceError::InvalidInput(
                "You cannot start a conversation with yourself.".to_string(),
            ));
        }
        let derived = chat_id_for(me, recipient_id);
        if let Some(supplied) = chat_id.map(str::trim).filter(|c| !c.is_empty()) {
            if supplied != derived {
                warn!(supplied, derived = %derived, "Chat id does not match participants");
                return Err(ServiceError::InvalidInput(
                    "This conversation link is not valid.".to_string(),
                ));
            }
        }

        let users = [me.to_string(), recipient_id.to_string()];
        let chat = self.chat_repo.ensure_chat(&derived, &users).await?;
        let recipient_name = self.name_of(recipient_id).await;
        self.mark_read(me, &chat.id).await;
        let messages = self
            .chat_repo
            .list_messages(&chat.id)
            .await?
            .iter()
            .map(|m| MessageView::for_viewer(m, me))
            .collect();
        let already_reviewed = self.review_repo.find(recipient_id, me).await?.is_some();
        debug!(chat_id = %chat.id, "Conversation opened");
        Ok(ChatView {
            chat_id: chat.id,
            recipient_id: recipient_id.to_string(),
            recipient_name,
            messages,
            already_reviewed,
        })
    }

    #[instrument(skip(self, text))]
    async fn send_message(&self, me: &str, chat_id: &str, text: &str) -> ServiceResult<Message> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ServiceError::InvalidInput("Message cannot be empty.".to_string()));
        }
        let chat = self.participant_chat(me, chat_id).await?;
        let message = Message {
            id: new_id(),
            chat_id: chat.id.clone(),
            sender_id: me.to_string(),
            text: text.to_string(),
            timestamp: Utc::now(),
        };
        let message = self.chat_repo.append_message(message).await?;

        let delivered = self.hub.publish(
            &Topic::Chat(chat.id.clone()),
            RealtimeEvent::Message {
                message: message.clone(),
            },
        );
        for user in &chat.users {
            self.hub.publish(
                &Topic::Inbox(user.clone()),
                RealtimeEvent::ChatUpdated {
                    chat_id: chat.id.clone(),
                    last_message: message.text.clone(),
                    last_sender_id: message.sender_id.clone(),
                    last_updated: message.timestamp,
                },
            );
        }
        info!(message_id = %message.id, live_listeners = delivered, "Message sent");
        Ok(message)
    }

    async fn messages(&self, me: &str, chat_id: &str) -> ServiceResult<Vec<MessageView>> {
        self.participant_chat(me, chat_id).await?;
        Ok(self
            .chat_repo
            .list_messages(chat_id)
            .await?
            .iter()
            .map(|m| MessageView::for_viewer(m, me))
            .collect())
    }

    async fn mark_read(&self, me: &str, chat_id: &str) {
        if let Err(e) = self.chat_repo.mark_read(chat_id, me, Utc::now()).await {
            warn!(chat_id, user_id = me, "Could not mark conversation read: {e}");
        }
    }

    #[instrument(skip(self))]
    async fn conversations(&self, me: &str) -> ServiceResult<Vec<ConversationSummary>> {
        let mut chats = self.chat_repo.list_for_user(me).await?;
        chats.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));

        let mut summaries = Vec::with_capacity(chats.len());
        for chat in chats {
            let recipient_id = chat.counterpart(me).map(str::to_string);
            let recipient_name = match &recipient_id {
                Some(id) => self.name_of(id).await,
                None => FALLBACK_NAME.to_string(),
            };
            summaries.push(ConversationSummary {
                preview: preview(&chat, me),
                unread: chat.is_unread_for(me),
                chat_id: chat.id,
                recipient_id,
                recipient_name,
                last_updated: chat.last_updated,
            });
        }
        Ok(summaries)
    }

    async fn subscribe_chat(&self, me: &str, chat_id: &str) -> ServiceResult<Subscription> {
        let chat = self.participant_chat(me, chat_id).await?;
        Ok(self.hub.subscribe(Topic::Chat(chat.id)))
    }

    fn subscribe_inbox(&self, me: &str) -> Subscription {
        self.hub.subscribe(Topic::Inbox(me.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_prefixes_own_messages() {
        let mut chat = Chat::new("a_b".into(), vec!["a".into(), "b".into()]);
        assert_eq!(preview(&chat, "a"), "No messages yet");
        chat.last_message = Some("See you at 5".into());
        chat.last_sender_id = Some("a".into());
        assert_eq!(preview(&chat, "a"), "You: See you at 5");
        assert_eq!(preview(&chat, "b"), "See you at 5");
    }
}
