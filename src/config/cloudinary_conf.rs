use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{required_var, ConfigError};

/// Unsigned-upload settings for the Cloudinary image host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub upload_preset: String,
}

impl CloudinaryConfig {
    /// Expected environment variables: CLOUDINARY_CLOUD_NAME, CLOUDINARY_UPLOAD_PRESET.
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading Cloudinary configuration from environment variables");
        let config = CloudinaryConfig {
            cloud_name: required_var("CLOUDINARY_CLOUD_NAME")?,
            upload_preset: required_var("CLOUDINARY_UPLOAD_PRESET")?,
        };
        if config.cloud_name.trim().is_empty() || config.upload_preset.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Cloudinary cloud name and upload preset cannot be empty".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn upload_url(&self) -> String {
        format!("https://api.cloudinary.com/v1_1/{}/image/upload", self.cloud_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_url_uses_cloud_name() {
        let config = CloudinaryConfig {
            cloud_name: "kabale".to_string(),
            upload_preset: "unsigned".to_string(),
        };
        assert_eq!(config.upload_url(), "https://api.cloudinary.com/v1_1/kabale/image/upload");
    }
}
