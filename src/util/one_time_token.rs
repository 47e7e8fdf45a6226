use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::util::token_store::{TokenStore, TokenStoreError};

const TOKEN_LENGTH: usize = 48;

#[derive(Debug, Error)]
pub enum OneTimeTokenError {
    #[error("Token store error: {0}")]
    Store(#[from] TokenStoreError),
    #[error("Token not found or expired")]
    TokenNotFound,
    #[error("Invalid token format")]
    InvalidToken,
}

/// What a token may be redeemed for. Each purpose has its own key space and lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    EmailVerification,
    PasswordReset,
}

impl TokenPurpose {
    pub fn ttl_secs(&self) -> u64 {
        match self {
            TokenPurpose::EmailVerification => 24 * 60 * 60,
            TokenPurpose::PasswordReset => 60 * 60,
        }
    }

    fn key_prefix(&self) -> &'static str {
        match self {
            TokenPurpose::EmailVerification => "verify_email:",
            TokenPurpose::PasswordReset => "password_reset:",
        }
    }

    fn key(&self, token: &str) -> String {
        format!("{}{}", self.key_prefix(), token)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenGrant {
    pub user_id: String,
    pub email: String,
    pub purpose: TokenPurpose,
}

/// Issues random tokens bound to a user and redeems each of them once.
#[derive(Clone)]
pub struct OneTimeTokens {
    store: Arc<dyn TokenStore>,
}

impl OneTimeTokens {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        OneTimeTokens { store }
    }

    fn generate_secure_token() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LENGTH)
            .map(char::from)
            .collect()
    }

    #[instrument(skip(self, email))]
    pub async fn issue(&self, purpose: TokenPurpose, user_id: &str, email: &str) -> Result<String, OneTimeTokenError> {
        let token = Self::generate_secure_token();
        let grant = TokenGrant {
            user_id: user_id.to_string(),
            email: email.to_string(),
            purpose,
        };
        let value = serde_json::to_string(&grant).map_err(|_| OneTimeTokenError::InvalidToken)?;
        self.store.put(&purpose.key(&token), &value, purpose.ttl_secs()).await?;
        info!(?purpose, "One-time token issued");
        Ok(token)
    }

    /// Consume the token. A second redemption of the same token fails.
    pub async fn redeem(&self, purpose: TokenPurpose, token: &str) -> Result<TokenGrant, OneTimeTokenError> {
        if token.len() != TOKEN_LENGTH || !token.chars().all(|c| c.is_ascii_alphanumeric()) {
            warn!("Malformed one-time token rejected");
            return Err(OneTimeTokenError::InvalidToken);
        }
        let raw = self
            .store
            .take(&purpose.key(token))
            .await?
            .ok_or(OneTimeTokenError::TokenNotFound)?;
        let grant: TokenGrant = serde_json::from_str(&raw).map_err(|_| OneTimeTokenError::InvalidToken)?;
        if grant.purpose != purpose {
            return Err(OneTimeTokenError::InvalidToken);
        }
        Ok(grant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::token_store::InMemoryTokenStore;

    fn tokens() -> OneTimeTokens {
        OneTimeTokens::new(Arc::new(InMemoryTokenStore::default()))
    }

    #[tokio::test]
    async fn token_redeems_once() {
        let tokens = tokens();
        let token = tokens.issue(TokenPurpose::PasswordReset, "u1", "a@b.c").await.unwrap();
        let grant = tokens.redeem(TokenPurpose::PasswordReset, &token).await.unwrap();
        assert_eq!(grant.user_id, "u1");
        assert!(matches!(
            tokens.redeem(TokenPurpose::PasswordReset, &token).await,
            Err(OneTimeTokenError::TokenNotFound)
        ));
    }

    #[tokio::test]
    async fn purposes_do_not_cross() {
        let tokens = tokens();
        let token = tokens.issue(TokenPurpose::EmailVerification, "u1", "a@b.c").await.unwrap();
        assert!(tokens.redeem(TokenPurpose::PasswordReset, &token).await.is_err());
    }

    #[test]
    fn lifetimes() {
        assert_eq!(TokenPurpose::EmailVerification.ttl_secs(), 86_400);
        assert_eq!(TokenPurpose::PasswordReset.ttl_secs(), 3_600);
    }
}
