use std::env;
use tracing::{debug, error, info, warn};

use crate::config::{parsed_var, required_var, ConfigError};

const MIN_SECRET_LEN: usize = 32;

/// JWT configuration structure
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// JWT secret key for signing tokens
    pub jwt_secret: String,
    /// Access token expiration time in minutes
    pub access_token_expiration: i64,
    /// Refresh token expiration time in minutes
    pub refresh_token_expiration: i64,
    pub jwt_issuer: Option<String>,
}

impl JwtConfig {
    /// Load JWT configuration from environment variables
    ///
    /// Expected environment variables:
    /// - JWT_SECRET: Secret key for signing JWT tokens (required, 32+ chars)
    /// - JWT_ACCESS_TOKEN_EXPIRY: Access token expiration in minutes (defaults to 60)
    /// - JWT_REFRESH_TOKEN_EXPIRY: Refresh token expiration in minutes (defaults to 10080 = 1 week)
    /// - JWT_ISSUER: JWT issuer (optional)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading JWT configuration from environment variables");

        let config = JwtConfig {
            jwt_secret: required_var("JWT_SECRET")?,
            access_token_expiration: parsed_var("JWT_ACCESS_TOKEN_EXPIRY", 60)?,
            refresh_token_expiration: parsed_var("JWT_REFRESH_TOKEN_EXPIRY", 10080)?,
            jwt_issuer: env::var("JWT_ISSUER").ok(),
        };
        config.validate()?;
        debug!("JWT secret loaded (length: {} chars)", config.jwt_secret.len());
        info!("JWT configuration loaded successfully");
        Ok(config)
    }

    /// Validate the JWT configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.len() < MIN_SECRET_LEN {
            error!("JWT secret is too short (minimum {} characters required)", MIN_SECRET_LEN);
            return Err(ConfigError::ValidationError(format!(
                "JWT secret must be at least {} characters long",
                MIN_SECRET_LEN
            )));
        }
        if self.access_token_expiration <= 0 || self.refresh_token_expiration <= 0 {
            error!("Token expirations must be greater than 0");
            return Err(ConfigError::ValidationError(
                "Token expirations must be greater than 0".to_string(),
            ));
        }
        if self.access_token_expiration >= self.refresh_token_expiration {
            warn!("Access token expiration is greater than or equal to refresh token expiration");
        }
        Ok(())
    }
}

/// Fixed configuration for local runs and tests.
impl Default for JwtConfig {
    fn default() -> Self {
        JwtConfig {
            jwt_secret: "kabale_market_development_secret_that_is_long_enough".to_string(),
            access_token_expiration: 60,
            refresh_token_expiration: 10080,
            jwt_issuer: Some("kabale-market".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_secret_is_rejected() {
        let config = JwtConfig {
            jwt_secret: "short".to_string(),
            ..JwtConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(JwtConfig::default().validate().is_ok());
    }
}
