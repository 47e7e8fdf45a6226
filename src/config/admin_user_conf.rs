use serde::{Deserialize, Serialize};
use std::env;
use tracing::{info, warn};

use crate::config::{required_var, ConfigError};

/// Bootstrap administrator created at startup when no user holds the email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUserConfig {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl AdminUserConfig {
    /// `Ok(None)` when ADMIN_EMAIL is unset; the other variables are then not read.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let Ok(email) = env::var("ADMIN_EMAIL") else {
            warn!("ADMIN_EMAIL not set, no bootstrap administrator will be created");
            return Ok(None);
        };
        let config = AdminUserConfig {
            name: env::var("ADMIN_NAME").unwrap_or_else(|_| "Administrator".to_string()),
            email,
            password: required_var("ADMIN_PASSWORD")?,
        };
        if config.password.len() < 6 {
            return Err(ConfigError::ValidationError(
                "ADMIN_PASSWORD must be at least 6 characters".to_string(),
            ));
        }
        info!(email = %config.email, "Bootstrap administrator configured");
        Ok(Some(config))
    }
}
