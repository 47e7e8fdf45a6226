use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::debug;

use crate::model::chat::Message;

const CHANNEL_CAPACITY: usize = 64;

/// What a listener can be subscribed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Every message posted in one conversation.
    Chat(String),
    /// Summary changes of every conversation a user takes part in.
    Inbox(String),
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RealtimeEvent {
    Message {
        message: Message,
    },
    ChatUpdated {
        chat_id: String,
        last_message: String,
        last_sender_id: String,
        last_updated: DateTime<Utc>,
    },
}

impl RealtimeEvent {
    pub fn name(&self) -> &'static str {
        match self {
            RealtimeEvent::Message { .. } => "message",
            RealtimeEvent::ChatUpdated { .. } => "chat_updated",
        }
    }
}

type Channels = Mutex<HashMap<Topic, broadcast::Sender<RealtimeEvent>>>;

/// The map stays consistent across a panic, so a poisoned lock is reused.
fn lock(channels: &Channels) -> MutexGuard<'_, HashMap<Topic, broadcast::Sender<RealtimeEvent>>> {
    channels.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-process fan-out of chat activity. Channels are created on first
/// subscription and removed when their last subscription is dropped.
#[derive(Clone, Default)]
pub struct RealtimeHub {
    channels: Arc<Channels>,
}

impl RealtimeHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, topic: Topic) -> Subscription {
        let rx = lock(&self.channels)
            .entry(topic.clone())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe();
        debug!(?topic, "Realtime subscription opened");
        Subscription {
            topic,
            rx: Some(rx),
            channels: Arc::clone(&self.channels),
        }
    }

    /// Deliver to current subscribers of `topic`. Returns how many received it.
    /// A channel found without receivers is removed.
    pub fn publish(&self, topic: &Topic, event: RealtimeEvent) -> usize {
        let mut channels = lock(&self.channels);
        let Some(tx) = channels.get(topic) else {
            return 0;
        };
        match tx.send(event) {
            Ok(delivered) => delivered,
            Err(_) => {
                channels.remove(topic);
                0
            }
        }
    }

    pub fn open_topics(&self) -> usize {
        lock(&self.channels).len()
    }
}

/// A live subscription. Dropping it unsubscribes.
pub struct Subscription {
    topic: Topic,
    /// Taken on drop so the receiver count is settled under the lock.
    rx: Option<broadcast::Receiver<RealtimeEvent>>,
    channels: Arc<Channels>,
}

impl Subscription {
    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    pub async fn recv(&mut self) -> Result<RealtimeEvent, RecvError> {
        match self.rx.as_mut() {
            Some(rx) => rx.recv().await,
            None => Err(RecvError::Closed),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let mut channels = lock(&self.channels);
        drop(self.rx.take());
        let idle = channels
            .get(&self.topic)
            .map(|tx| tx.receiver_count() == 0)
            .unwrap_or(false);
        if idle {
            channels.remove(&self.topic);
        }
        drop(channels);
        debug!(topic = ?self.topic, "Realtime subscription closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(chat_id: &str, text: &str) -> RealtimeEvent {
        RealtimeEvent::Message {
            message: Message {
                id: "m".into(),
                chat_id: chat_id.into(),
                sender_id: "a".into(),
                text: text.into(),
                timestamp: Utc::now(),
            },
        }
    }

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let hub = RealtimeHub::new();
        let topic = Topic::Chat("a_b".into());
        let mut sub = hub.subscribe(topic.clone());
        assert_eq!(hub.publish(&topic, message("a_b", "hi")), 1);
        match sub.recv().await.unwrap() {
            RealtimeEvent::Message { message } => assert_eq!(message.text, "hi"),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn publishing_without_listeners_is_a_no_op() {
        let hub = RealtimeHub::new();
        assert_eq!(hub.publish(&Topic::Inbox("u1".into()), message("x", "y")), 0);
        assert_eq!(hub.open_topics(), 0);
    }

    #[test]
    fn dropping_last_subscription_releases_the_channel() {
        let hub = RealtimeHub::new();
        let topic = Topic::Chat("a_b".into());
        let first = hub.subscribe(topic.clone());
        let second = hub.subscribe(topic.clone());
        assert_eq!(hub.open_topics(), 1);
        drop(first);
        assert_eq!(hub.open_topics(), 1);
        drop(second);
        assert_eq!(hub.open_topics(), 0);
    }

    #[test]
    fn concurrent_drops_leave_no_idle_channel() {
        let hub = RealtimeHub::new();
        let topic = Topic::Chat("a_b".into());
        for _ in 0..200 {
            let subs: Vec<_> = (0..4).map(|_| hub.subscribe(topic.clone())).collect();
            let handles: Vec<_> = subs
                .into_iter()
                .map(|sub| std::thread::spawn(move || drop(sub)))
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }
            assert_eq!(hub.open_topics(), 0);
        }
    }

    #[test]
    fn publish_prunes_a_channel_without_receivers() {
        let hub = RealtimeHub::new();
        let topic = Topic::Inbox("u1".into());
        lock(&hub.channels).insert(topic.clone(), broadcast::channel(4).0);
        assert_eq!(hub.open_topics(), 1);
        assert_eq!(hub.publish(&topic, message("x", "y")), 0);
        assert_eq!(hub.open_topics(), 0);
    }

    #[tokio::test]
    async fn keeps_delivering_after_a_panic_while_locked() {
        let hub = RealtimeHub::new();
        let topic = Topic::Chat("a_b".into());
        let mut sub = hub.subscribe(topic.clone());

        let poisoner = hub.clone();
        let result = std::thread::spawn(move || {
            let _guard = poisoner.channels.lock().unwrap();
            panic!("listener bookkeeping failed");
        })
        .join();
        assert!(result.is_err());
        assert!(hub.channels.is_poisoned());

        assert_eq!(hub.publish(&topic, message("a_b", "still here")), 1);
        match sub.recv().await.unwrap() {
            RealtimeEvent::Message { message } => assert_eq!(message.text, "still here"),
            other => panic!("unexpected event {:?}", other),
        }
        drop(sub);
        assert_eq!(hub.open_topics(), 0);
    }
}
