use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::chat::Message;

/// `?recipientId=...&chatId=...` as linked from profiles, listings and the inbox.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenChatQuery {
    #[serde(rename = "recipientId")]
    pub recipient_id: Option<String>,
    #[serde(rename = "chatId")]
    pub chat_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(length(max = 4000, message = "Message is too long."))]
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: String,
    pub sender_id: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Posted by the viewer.
    pub sent: bool,
}

impl MessageView {
    pub fn for_viewer(message: &Message, viewer_id: &str) -> Self {
        MessageView {
            id: message.id.clone(),
            sender_id: message.sender_id.clone(),
            text: message.text.clone(),
            timestamp: message.timestamp,
            sent: message.sender_id == viewer_id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatView {
    pub chat_id: String,
    pub recipient_id: String,
    pub recipient_name: String,
    pub messages: Vec<MessageView>,
    pub already_reviewed: bool,
}

/// One row of the inbox.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub chat_id: String,
    pub recipient_id: Option<String>,
    pub recipient_name: String,
    pub preview: String,
    pub unread: bool,
    pub last_updated: Option<DateTime<Utc>>,
}
