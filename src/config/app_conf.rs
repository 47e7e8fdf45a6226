use std::env;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

use crate::config::{parsed_var, ConfigError};

/// Where documents live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Mongo,
    Memory,
}

/// Where uploaded images go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageBackend {
    Cloudinary,
    Minio,
    Memory,
}

/// Where one-time verification and reset tokens are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenBackend {
    Redis,
    Memory,
}

/// How outgoing mail is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailBackend {
    Smtp,
    Log,
}

macro_rules! backend_names {
    ($ty:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_ascii_lowercase().as_str() {
                    $($name => Ok($ty::$variant),)+
                    other => Err(ConfigError::InvalidValue(format!(
                        "unknown {} '{}'",
                        stringify!($ty),
                        other
                    ))),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let name = match self {
                    $($ty::$variant => $name,)+
                };
                f.write_str(name)
            }
        }
    };
}

backend_names!(StorageBackend { Mongo => "mongo", Memory => "memory" });
backend_names!(ImageBackend { Cloudinary => "cloudinary", Minio => "minio", Memory => "memory" });
backend_names!(TokenBackend { Redis => "redis", Memory => "memory" });
backend_names!(MailBackend { Smtp => "smtp", Log => "log" });

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Absolute origin used when building links that leave the app (mail).
    pub public_base_url: String,
    pub storage_backend: StorageBackend,
    pub image_backend: ImageBackend,
    pub token_backend: TokenBackend,
    pub mail_backend: MailBackend,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading application configuration from environment variables");
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parsed_var("APP_PORT", 8080u16)?;
        let public_base_url =
            env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| format!("http://{}:{}", host, port));

        let config = AppConfig {
            host,
            port,
            public_base_url,
            storage_backend: parsed_var("STORAGE_BACKEND", StorageBackend::Mongo)?,
            image_backend: parsed_var("IMAGE_BACKEND", ImageBackend::Cloudinary)?,
            token_backend: parsed_var("TOKEN_BACKEND", TokenBackend::Redis)?,
            mail_backend: parsed_var("MAIL_BACKEND", MailBackend::Smtp)?,
        };
        debug!(?config, "Application configuration loaded");
        Ok(config)
    }

    /// Everything in-process; what the integration tests run against.
    pub fn in_memory() -> Self {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            public_base_url: "http://localhost".to_string(),
            storage_backend: StorageBackend::Memory,
            image_backend: ImageBackend::Memory,
            token_backend: TokenBackend::Memory,
            mail_backend: MailBackend::Log,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_names_parse_case_insensitively() {
        assert_eq!("Memory".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert_eq!("minio".parse::<ImageBackend>().unwrap(), ImageBackend::Minio);
        assert!("postgres".parse::<StorageBackend>().is_err());
        assert_eq!(MailBackend::Log.to_string(), "log");
    }
}
