use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, info};

use crate::config::{parsed_var, required_var, ConfigError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinioConfig {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket_name: String,
    /// Public origin that serves the bucket, prefixed to object keys in stored URLs.
    pub public_url: String,
    pub secure: bool,
}

impl MinioConfig {
    /// Load MinIO configuration from environment variables
    ///
    /// Expected environment variables:
    /// - MINIO_ENDPOINT: MinIO server endpoint (e.g., "localhost:9000")
    /// - MINIO_ACCESS_KEY / MINIO_SECRET_KEY: credentials
    /// - MINIO_BUCKET_NAME: bucket for listing and profile images (defaults to "kabale-images")
    /// - MINIO_PUBLIC_URL: public origin for stored links (defaults to the endpoint URL)
    /// - MINIO_SECURE: Whether to use HTTPS (defaults to false)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading MinIO configuration from environment variables");

        let endpoint = required_var("MINIO_ENDPOINT")?;
        let secure = parsed_var("MINIO_SECURE", false)?;
        let mut config = MinioConfig {
            endpoint,
            access_key: required_var("MINIO_ACCESS_KEY")?,
            secret_key: required_var("MINIO_SECRET_KEY")?,
            bucket_name: env::var("MINIO_BUCKET_NAME").unwrap_or_else(|_| "kabale-images".to_string()),
            public_url: String::new(),
            secure,
        };
        config.public_url = env::var("MINIO_PUBLIC_URL").unwrap_or_else(|_| config.get_endpoint_url());
        config.validate()?;
        debug!(endpoint = %config.endpoint, bucket = %config.bucket_name, "MinIO configuration loaded");
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.is_empty() || self.access_key.is_empty() || self.secret_key.is_empty() {
            error!("MinIO endpoint or credentials are empty");
            return Err(ConfigError::ValidationError(
                "MinIO endpoint and credentials cannot be empty".to_string(),
            ));
        }
        if !self
            .bucket_name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
        {
            error!("Invalid bucket name format: {}", self.bucket_name);
            return Err(ConfigError::ValidationError(
                "Bucket name contains invalid characters".to_string(),
            ));
        }
        if self.bucket_name.len() < 3 || self.bucket_name.len() > 63 {
            return Err(ConfigError::ValidationError(
                "Bucket name must be between 3 and 63 characters".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the full endpoint URL with protocol
    pub fn get_endpoint_url(&self) -> String {
        let protocol = if self.secure { "https" } else { "http" };
        format!("{}://{}", protocol, self.endpoint)
    }

    /// Public URL of an object in the configured bucket.
    pub fn object_url(&self, object_name: &str) -> String {
        format!(
            "{}/{}/{}",
            self.public_url.trim_end_matches('/'),
            self.bucket_name,
            object_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MinioConfig {
        MinioConfig {
            endpoint: "localhost:9000".to_string(),
            access_key: "minioadmin".to_string(),
            secret_key: "minioadmin".to_string(),
            bucket_name: "kabale-images".to_string(),
            public_url: "http://localhost:9000/".to_string(),
            secure: false,
        }
    }

    #[test]
    fn endpoint_and_object_urls() {
        let mut config = config();
        assert_eq!(config.get_endpoint_url(), "http://localhost:9000");
        assert_eq!(
            config.object_url("services/a.jpg"),
            "http://localhost:9000/kabale-images/services/a.jpg"
        );
        config.secure = true;
        assert_eq!(config.get_endpoint_url(), "https://localhost:9000");
    }

    #[test]
    fn bucket_name_rules() {
        let mut config = config();
        assert!(config.validate().is_ok());
        config.bucket_name = "ab".to_string();
        assert!(config.validate().is_err());
        config.bucket_name = "Upper_Case".to_string();
        assert!(config.validate().is_err());
    }
}
