use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Derive the conversation id for two users.
///
/// The pair is sorted before joining, so whichever side starts the
/// conversation the same document is addressed.
pub fn chat_id_for(a: &str, b: &str) -> String {
    let mut pair = [a, b];
    pair.sort_unstable();
    pair.join("_")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    #[serde(rename = "_id")]
    pub id: String,
    pub users: Vec<String>,
    #[serde(default)]
    pub last_message: Option<String>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_sender_id: Option<String>,
    #[serde(default)]
    pub last_read: HashMap<String, DateTime<Utc>>,
}

impl Chat {
    pub fn new(id: String, users: Vec<String>) -> Self {
        Chat {
            id,
            users,
            last_message: None,
            last_updated: None,
            last_sender_id: None,
            last_read: HashMap::new(),
        }
    }

    pub fn has_participant(&self, user_id: &str) -> bool {
        self.users.iter().any(|u| u == user_id)
    }

    /// The other side of the conversation, as seen by `user_id`.
    pub fn counterpart(&self, user_id: &str) -> Option<&str> {
        self.users.iter().map(String::as_str).find(|u| *u != user_id)
    }

    /// Unread when something was posted after `user_id` last looked and they
    /// were not the one who posted it.
    pub fn is_unread_for(&self, user_id: &str) -> bool {
        let Some(last_updated) = self.last_updated else {
            return false;
        };
        if self.last_sender_id.as_deref() == Some(user_id) {
            return false;
        }
        match self.last_read.get(user_id) {
            Some(read_at) => *read_at < last_updated,
            None => true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(rename = "_id")]
    pub id: String,
    pub chat_id: String,
    pub sender_id: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn chat_id_is_order_independent() {
        assert_eq!(chat_id_for("alice", "bob"), "alice_bob");
        assert_eq!(chat_id_for("bob", "alice"), "alice_bob");
        assert_eq!(chat_id_for("u9", "u10"), chat_id_for("u10", "u9"));
    }

    #[test]
    fn counterpart_is_the_other_user() {
        let chat = Chat::new("a_b".into(), vec!["a".into(), "b".into()]);
        assert_eq!(chat.counterpart("a"), Some("b"));
        assert_eq!(chat.counterpart("b"), Some("a"));
    }

    #[test]
    fn unread_rules() {
        let now = Utc::now();
        let mut chat = Chat::new("a_b".into(), vec!["a".into(), "b".into()]);
        assert!(!chat.is_unread_for("a"), "empty chat is never unread");

        chat.last_updated = Some(now);
        chat.last_sender_id = Some("b".into());
        assert!(chat.is_unread_for("a"));
        assert!(!chat.is_unread_for("b"), "own message is not unread");

        chat.last_read.insert("a".into(), now + Duration::seconds(1));
        assert!(!chat.is_unread_for("a"));

        chat.last_read.insert("a".into(), now - Duration::seconds(1));
        assert!(chat.is_unread_for("a"));
    }
}
