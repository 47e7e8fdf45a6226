use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use redis::aio::ConnectionManager;
use redis::Client;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument};

use crate::config::RedisConfig;

#[derive(Debug, thiserror::Error)]
pub enum TokenStoreError {
    #[error("Connection error: {0}")]
    ConnectionError(String),
    #[error("Operation error: {0}")]
    OperationError(String),
}

impl From<redis::RedisError> for TokenStoreError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_connection_refusal() || err.is_io_error() {
            TokenStoreError::ConnectionError(err.to_string())
        } else {
            TokenStoreError::OperationError(err.to_string())
        }
    }
}

/// Short-lived key/value storage for one-time tokens.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn put(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), TokenStoreError>;
    /// Read and remove in one step, so a token can be redeemed once.
    async fn take(&self, key: &str) -> Result<Option<String>, TokenStoreError>;
}

#[derive(Clone)]
pub struct RedisTokenStore {
    connection_manager: ConnectionManager,
}

impl RedisTokenStore {
    #[instrument(skip(config), fields(host = %config.host, port = config.port, db = config.database))]
    pub async fn new(config: &RedisConfig) -> Result<Self, TokenStoreError> {
        info!("Initializing Redis token store");
        let client = Client::open(config.get_connection_url()).map_err(|e| {
            error!("Failed to create Redis client: {}", e);
            TokenStoreError::ConnectionError(format!("Client creation failed: {}", e))
        })?;
        let connection_manager = ConnectionManager::new(client).await.map_err(|e| {
            error!("Failed to create Redis connection manager: {}", e);
            TokenStoreError::ConnectionError(format!("Connection manager creation failed: {}", e))
        })?;

        let store = RedisTokenStore { connection_manager };
        let mut conn = store.connection_manager.clone();
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        debug!("Redis answered {}", pong);
        Ok(store)
    }
}

#[async_trait]
impl TokenStore for RedisTokenStore {
    async fn put(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), TokenStoreError> {
        let mut conn = self.connection_manager.clone();
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl_secs)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn take(&self, key: &str) -> Result<Option<String>, TokenStoreError> {
        let mut conn = self.connection_manager.clone();
        let value: Option<String> = redis::cmd("GETDEL").arg(key).query_async(&mut conn).await?;
        Ok(value)
    }
}

/// Process-local store; entries past their deadline read as absent.
#[derive(Default)]
pub struct InMemoryTokenStore {
    entries: Mutex<HashMap<String, (String, DateTime<Utc>)>>,
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn put(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), TokenStoreError> {
        let deadline = Utc::now() + Duration::seconds(ttl_secs as i64);
        let mut entries = self.entries.lock().await;
        entries.retain(|_, (_, d)| *d > Utc::now());
        entries.insert(key.to_string(), (value.to_string(), deadline));
        Ok(())
    }

    async fn take(&self, key: &str) -> Result<Option<String>, TokenStoreError> {
        Ok(self
            .entries
            .lock()
            .await
            .remove(key)
            .filter(|(_, deadline)| *deadline > Utc::now())
            .map(|(value, _)| value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn take_is_single_use() {
        let store = InMemoryTokenStore::default();
        store.put("k", "v", 60).await.unwrap();
        assert_eq!(store.take("k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(store.take("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn expired_entries_read_as_absent() {
        let store = InMemoryTokenStore::default();
        store.put("k", "v", 0).await.unwrap();
        assert_eq!(store.take("k").await.unwrap(), None);
    }
}
