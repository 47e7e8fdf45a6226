use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, info};

use crate::config::{parsed_var, required_var, ConfigError};

/// SMTP settings for outgoing account mail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    /// Wrap the connection in TLS.
    pub use_tls: bool,
    /// Upgrade a plain connection with STARTTLS. Only read when `use_tls` is set.
    pub use_starttls: bool,
    pub from_email: String,
    pub from_name: String,
    pub connection_timeout_secs: u64,
}

impl EmailConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading email configuration from environment variables");

        let config = EmailConfig {
            smtp_host: required_var("SMTP_HOST")?,
            smtp_port: parsed_var("SMTP_PORT", 587)?,
            smtp_username: env::var("SMTP_USERNAME").unwrap_or_default(),
            smtp_password: env::var("SMTP_PASSWORD").unwrap_or_default(),
            use_tls: parsed_var("SMTP_USE_TLS", true)?,
            use_starttls: parsed_var("SMTP_USE_STARTTLS", true)?,
            from_email: required_var("SMTP_FROM_EMAIL")?,
            from_name: env::var("SMTP_FROM_NAME").unwrap_or_else(|_| "Kabale Market".to_string()),
            connection_timeout_secs: parsed_var("SMTP_CONNECTION_TIMEOUT", 30)?,
        };
        config.validate()?;
        debug!(host = %config.smtp_host, port = config.smtp_port, "Email configuration loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.smtp_host.is_empty() {
            error!("SMTP host is empty");
            return Err(ConfigError::ValidationError("SMTP host cannot be empty".to_string()));
        }
        if self.smtp_port == 0 {
            return Err(ConfigError::ValidationError("SMTP port cannot be 0".to_string()));
        }
        if !self.from_email.contains('@') {
            error!("Invalid from email address: {}", self.from_email);
            return Err(ConfigError::ValidationError(format!(
                "Invalid from email address: {}",
                self.from_email
            )));
        }
        Ok(())
    }

    /// Display-name mailbox string, e.g. `Kabale Market <no-reply@example.com>`.
    pub fn from_mailbox(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EmailConfig {
        EmailConfig {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: String::new(),
            use_tls: true,
            use_starttls: true,
            from_email: "no-reply@example.com".to_string(),
            from_name: "Kabale Market".to_string(),
            connection_timeout_secs: 30,
        }
    }

    #[test]
    fn from_mailbox_format() {
        assert_eq!(config().from_mailbox(), "Kabale Market <no-reply@example.com>");
    }

    #[test]
    fn rejects_bad_sender() {
        let mut config = config();
        config.from_email = "nobody".to_string();
        assert!(config.validate().is_err());
    }
}
