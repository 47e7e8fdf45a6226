use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::model::user::{Role, User};

/// JWT token claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub email: String,
    pub name: String,
    /// `user` or `admin`
    pub role: String,
    pub iat: i64,
    pub exp: i64,
    /// `access` or `refresh`
    pub token_type: String,
    pub jti: String,
}

impl Claims {
    pub fn user_id(&self) -> &str {
        &self.sub
    }

    pub fn is_admin(&self) -> bool {
        Role::parse(&self.role) == Some(Role::Admin)
    }
}

/// Token pair containing access and refresh tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

#[derive(Debug, Clone, Copy)]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

/// Error types for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Failed to encode JWT token: {0}")]
    EncodingFailed(String),
    #[error("Failed to decode JWT token: {0}")]
    DecodingFailed(String),
    #[error("Token has expired")]
    TokenExpired,
    #[error("Invalid token format")]
    InvalidToken,
    #[error("Invalid token type: expected {expected}, got {actual}")]
    InvalidTokenType { expected: String, actual: String },
}

pub trait JwtTokenUtils: Send + Sync {
    fn generate_token_pair(&self, user: &User) -> Result<TokenPair, JwtError>;
    fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError>;
    fn validate_refresh_token(&self, token: &str) -> Result<Claims, JwtError>;
    fn extract_token_from_header(&self, auth_header: &str) -> Result<String, JwtError>;
}

#[derive(Debug, Clone)]
pub struct JwtTokenUtilsImpl {
    pub jwt_config: JwtConfig,
}

impl JwtTokenUtilsImpl {
    pub fn new(jwt_config: JwtConfig) -> Self {
        JwtTokenUtilsImpl { jwt_config }
    }

    fn generate_token(&self, user: &User, token_type: TokenType, expires_in_minutes: i64) -> Result<String, JwtError> {
        debug!("Generating {} token for user: {}", token_type.as_str(), user.id);

        let now = Utc::now();
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role.as_str().to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(expires_in_minutes)).timestamp(),
            token_type: token_type.as_str().to_string(),
            jti: Uuid::new_v4().to_string(),
        };

        let encoding_key = EncodingKey::from_secret(self.jwt_config.jwt_secret.as_bytes());
        encode(&Header::new(Algorithm::HS256), &claims, &encoding_key).map_err(|err| {
            error!("Failed to encode JWT token: {}", err);
            JwtError::EncodingFailed(err.to_string())
        })
    }

    pub fn validate_token(&self, token: &str, expected: TokenType) -> Result<Claims, JwtError> {
        let decoding_key = DecodingKey::from_secret(self.jwt_config.jwt_secret.as_bytes());
        let validation = Validation::new(Algorithm::HS256);

        let claims = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|err| {
                debug!("Failed to decode JWT token: {}", err);
                match err.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                    _ => JwtError::DecodingFailed(err.to_string()),
                }
            })?
            .claims;

        if claims.exp < Utc::now().timestamp() {
            warn!("Token has expired for user: {}", claims.sub);
            return Err(JwtError::TokenExpired);
        }
        if claims.token_type != expected.as_str() {
            warn!("Invalid token type: expected {}, got {}", expected.as_str(), claims.token_type);
            return Err(JwtError::InvalidTokenType {
                expected: expected.as_str().to_string(),
                actual: claims.token_type,
            });
        }
        Ok(claims)
    }
}

impl JwtTokenUtils for JwtTokenUtilsImpl {
    fn generate_token_pair(&self, user: &User) -> Result<TokenPair, JwtError> {
        let access_token = self.generate_token(user, TokenType::Access, self.jwt_config.access_token_expiration)?;
        let refresh_token = self.generate_token(user, TokenType::Refresh, self.jwt_config.refresh_token_expiration)?;
        info!("Generated token pair for user: {}", user.id);
        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.jwt_config.access_token_expiration * 60,
            token_type: "Bearer".to_string(),
        })
    }

    fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate_token(token, TokenType::Access)
    }

    fn validate_refresh_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate_token(token, TokenType::Refresh)
    }

    fn extract_token_from_header(&self, auth_header: &str) -> Result<String, JwtError> {
        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .ok_or(JwtError::InvalidToken)?;
        if token.is_empty() {
            return Err(JwtError::InvalidToken);
        }
        Ok(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        let now = Utc::now();
        User {
            id: "u1".into(),
            name: "Grace Atuhaire".into(),
            email: "grace@example.com".into(),
            password_hash: String::new(),
            role,
            plan: None,
            bio: String::new(),
            profile_photo_url: String::new(),
            whatsapp: None,
            email_verified: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn access_token_round_trip_carries_role() {
        let jwt = JwtTokenUtilsImpl::new(JwtConfig::default());
        let pair = jwt.generate_token_pair(&user(Role::Admin)).unwrap();
        let claims = jwt.validate_access_token(&pair.access_token).unwrap();
        assert_eq!(claims.user_id(), "u1");
        assert!(claims.is_admin());
        assert_eq!(claims.name, "Grace Atuhaire");
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let jwt = JwtTokenUtilsImpl::new(JwtConfig::default());
        let pair = jwt.generate_token_pair(&user(Role::User)).unwrap();
        assert!(matches!(
            jwt.validate_access_token(&pair.refresh_token),
            Err(JwtError::InvalidTokenType { .. })
        ));
        assert!(jwt.validate_refresh_token(&pair.refresh_token).is_ok());
    }

    #[test]
    fn bearer_header_parsing() {
        let jwt = JwtTokenUtilsImpl::new(JwtConfig::default());
        assert_eq!(jwt.extract_token_from_header("Bearer abc").unwrap(), "abc");
        assert!(jwt.extract_token_from_header("Basic abc").is_err());
        assert!(jwt.extract_token_from_header("Bearer  ").is_err());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let jwt = JwtTokenUtilsImpl::new(JwtConfig::default());
        let other = JwtTokenUtilsImpl::new(JwtConfig {
            jwt_secret: "another_secret_that_is_also_long_enough_to_pass".into(),
            ..JwtConfig::default()
        });
        let pair = other.generate_token_pair(&user(Role::User)).unwrap();
        assert!(jwt.validate_access_token(&pair.access_token).is_err());
    }
}
