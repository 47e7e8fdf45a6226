pub mod admin_user_conf;
pub mod app_conf;
pub mod cloudinary_conf;
pub mod email_conf;
pub mod jwt_conf;
pub mod minio_conf;
pub mod mongo_conf;
pub mod redis_conf;

pub use admin_user_conf::AdminUserConfig;
pub use app_conf::{AppConfig, ImageBackend, MailBackend, StorageBackend, TokenBackend};
pub use cloudinary_conf::CloudinaryConfig;
pub use email_conf::EmailConfig;
pub use jwt_conf::JwtConfig;
pub use minio_conf::MinioConfig;
pub use mongo_conf::MongoConfig;
pub use redis_conf::RedisConfig;

/// Common configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Read a required variable, logging and mapping the miss.
pub(crate) fn required_var(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| {
        tracing::error!("{} environment variable not found", name);
        ConfigError::EnvVarNotFound(name.to_string())
    })
}

/// Read and parse an optional variable, falling back to `default` when unset.
pub(crate) fn parsed_var<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|_| {
            tracing::error!("Invalid {} value: {}", name, raw);
            ConfigError::ParseError(format!("Invalid {} value: {}", name, raw))
        }),
        Err(_) => {
            tracing::warn!("{} not set, using default: {}", name, default);
            Ok(default)
        }
    }
}
