use async_trait::async_trait;
use bytes::Bytes;
use minio::s3::args::{BucketExistsArgs, MakeBucketArgs, PutObjectArgs};
use minio::s3::client::{Client, ClientBuilder};
use minio::s3::creds::StaticProvider;
use minio::s3::http::BaseUrl;
use serde::Deserialize;
use std::io::Cursor;
use std::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::config::{CloudinaryConfig, MinioConfig};

/// Largest image accepted from a form, in bytes.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ImageStoreError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Unsupported image type: {0}")]
    UnsupportedType(String),
    #[error("Image is too large")]
    TooLarge,
    #[error("Upload failed: {0}")]
    UploadFailed(String),
}

/// An image file taken from a multipart form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl ImageUpload {
    /// File extension for the accepted image types.
    pub fn extension(&self) -> Result<&'static str, ImageStoreError> {
        match self.content_type.as_str() {
            "image/jpeg" | "image/jpg" => Ok("jpg"),
            "image/png" => Ok("png"),
            "image/webp" => Ok("webp"),
            "image/gif" => Ok("gif"),
            other => Err(ImageStoreError::UnsupportedType(other.to_string())),
        }
    }

    pub fn check(&self) -> Result<(), ImageStoreError> {
        self.extension()?;
        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(ImageStoreError::TooLarge);
        }
        Ok(())
    }

    fn object_name(&self, folder: &str) -> Result<String, ImageStoreError> {
        Ok(format!("{}/{}.{}", folder, Uuid::new_v4(), self.extension()?))
    }
}

/// Image hosting. `upload` returns the URL to persist on the document.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn upload(&self, folder: &str, image: ImageUpload) -> Result<String, ImageStoreError>;
}

#[derive(Debug, Clone)]
pub struct MinioImageStore {
    client: Client,
    config: MinioConfig,
}

impl MinioImageStore {
    #[instrument(skip(config), fields(endpoint = %config.endpoint, bucket = %config.bucket_name))]
    pub async fn new(config: MinioConfig) -> Result<Self, ImageStoreError> {
        config
            .validate()
            .map_err(|e| ImageStoreError::ConfigError(e.to_string()))?;

        let base_url = config
            .get_endpoint_url()
            .parse::<BaseUrl>()
            .map_err(|e| ImageStoreError::ConfigError(format!("Invalid endpoint URL: {}", e)))?;
        let provider = StaticProvider::new(&config.access_key, &config.secret_key, None);
        let client = ClientBuilder::new(base_url)
            .provider(Some(Box::new(provider)))
            .build()
            .map_err(|e| ImageStoreError::ConfigError(format!("Client creation failed: {}", e)))?;

        let store = MinioImageStore { client, config };
        store.ensure_bucket_exists().await?;
        info!("MinIO image store initialized");
        Ok(store)
    }

    async fn ensure_bucket_exists(&self) -> Result<(), ImageStoreError> {
        let bucket = &self.config.bucket_name;
        let exists_args =
            BucketExistsArgs::new(bucket).map_err(|e| ImageStoreError::ConfigError(e.to_string()))?;
        let exists = self
            .client
            .bucket_exists(&exists_args)
            .await
            .map_err(|e| ImageStoreError::UploadFailed(format!("Bucket exists check failed: {}", e)))?;
        if exists {
            return Ok(());
        }

        warn!("Bucket '{}' does not exist, creating it", bucket);
        let make_args = MakeBucketArgs::new(bucket).map_err(|e| ImageStoreError::ConfigError(e.to_string()))?;
        self.client
            .make_bucket(&make_args)
            .await
            .map_err(|e| ImageStoreError::UploadFailed(format!("Bucket creation failed: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl ImageStore for MinioImageStore {
    #[instrument(skip(self, image), fields(size = image.bytes.len()))]
    async fn upload(&self, folder: &str, image: ImageUpload) -> Result<String, ImageStoreError> {
        image.check()?;
        let object_name = image.object_name(folder)?;

        let bucket_name = self.config.bucket_name.clone();
        let object = object_name.clone();
        let client = self.client.clone();
        let content_type = image.content_type;
        let data = image.bytes;

        // The args borrow a reader that is not Send, so the upload runs on a blocking thread.
        tokio::task::spawn_blocking(move || {
            let mut reader = Cursor::new(data);
            let len = reader.get_ref().len();
            let mut args = PutObjectArgs::new(&bucket_name, &object, &mut reader, Some(len), None)
                .map_err(|e| ImageStoreError::UploadFailed(e.to_string()))?;
            args.content_type = content_type.as_str();
            futures::executor::block_on(client.put_object(&mut args))
                .map_err(|e| ImageStoreError::UploadFailed(e.to_string()))?;
            Ok::<(), ImageStoreError>(())
        })
        .await
        .map_err(|e| {
            error!("Failed to join blocking upload task: {}", e);
            ImageStoreError::UploadFailed(format!("Join error: {}", e))
        })??;

        let url = self.config.object_url(&object_name);
        info!(url = %url, "Image stored in MinIO");
        Ok(url)
    }
}

#[derive(Debug, Deserialize)]
struct CloudinaryUploadResponse {
    secure_url: String,
}

/// Unsigned uploads to a Cloudinary upload preset.
pub struct CloudinaryImageStore {
    http: reqwest::Client,
    config: CloudinaryConfig,
}

impl CloudinaryImageStore {
    pub fn new(config: CloudinaryConfig) -> Self {
        CloudinaryImageStore {
            http: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl ImageStore for CloudinaryImageStore {
    #[instrument(skip(self, image), fields(size = image.bytes.len()))]
    async fn upload(&self, folder: &str, image: ImageUpload) -> Result<String, ImageStoreError> {
        image.check()?;
        let part = reqwest::multipart::Part::bytes(image.bytes.to_vec())
            .file_name(image.file_name)
            .mime_str(&image.content_type)
            .map_err(|e| ImageStoreError::UnsupportedType(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .text("upload_preset", self.config.upload_preset.clone())
            .text("folder", folder.to_string())
            .part("file", part);

        let response = self
            .http
            .post(self.config.upload_url())
            .multipart(form)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                error!("Cloudinary upload failed: {}", e);
                ImageStoreError::UploadFailed(e.to_string())
            })?;
        let body: CloudinaryUploadResponse = response
            .json()
            .await
            .map_err(|e| ImageStoreError::UploadFailed(format!("Unexpected upload response: {}", e)))?;
        debug!(url = %body.secure_url, "Image stored in Cloudinary");
        Ok(body.secure_url)
    }
}

/// Keeps uploads in memory and hands back Cloudinary-shaped URLs.
#[derive(Default)]
pub struct InMemoryImageStore {
    uploads: Mutex<Vec<(String, ImageUpload)>>,
}

impl InMemoryImageStore {
    pub fn upload_count(&self) -> usize {
        self.uploads.lock().map(|u| u.len()).unwrap_or(0)
    }
}

#[async_trait]
impl ImageStore for InMemoryImageStore {
    async fn upload(&self, folder: &str, image: ImageUpload) -> Result<String, ImageStoreError> {
        image.check()?;
        let object_name = image.object_name(folder)?;
        let url = format!("https://res.cloudinary.com/local/image/upload/{}", object_name);
        if let Ok(mut uploads) = self.uploads.lock() {
            uploads.push((url.clone(), image));
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(len: usize) -> ImageUpload {
        ImageUpload {
            file_name: "a.png".into(),
            content_type: "image/png".into(),
            bytes: Bytes::from(vec![0; len]),
        }
    }

    #[tokio::test]
    async fn memory_store_returns_cloudinary_shaped_url() {
        let store = InMemoryImageStore::default();
        let url = store.upload("services", png(10)).await.unwrap();
        assert!(url.starts_with("https://res.cloudinary.com/local/image/upload/services/"));
        assert!(url.ends_with(".png"));
        assert_eq!(store.upload_count(), 1);
    }

    #[tokio::test]
    async fn rejects_non_images_and_oversized_files() {
        let store = InMemoryImageStore::default();
        let pdf = ImageUpload {
            content_type: "application/pdf".into(),
            ..png(10)
        };
        assert!(matches!(
            store.upload("services", pdf).await,
            Err(ImageStoreError::UnsupportedType(_))
        ));
        assert!(matches!(
            store.upload("services", png(MAX_IMAGE_BYTES + 1)).await,
            Err(ImageStoreError::TooLarge)
        ));
        assert_eq!(store.upload_count(), 0);
    }
}
