use axum::Router;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::app::state::{AppState, Backends};
use crate::config::{
    AdminUserConfig, AppConfig, CloudinaryConfig, ConfigError, EmailConfig, ImageBackend, JwtConfig, MailBackend,
    MinioConfig, MongoConfig, RedisConfig, StorageBackend, TokenBackend,
};
use crate::repository::chat_repo::MongoChatRepository;
use crate::repository::listing_repo::MongoListingRepository;
use crate::repository::mongo;
use crate::repository::question_repo::MongoQuestionRepository;
use crate::repository::repository_error::RepositoryError;
use crate::repository::request_repo::MongoServiceRequestRepository;
use crate::repository::review_repo::MongoReviewRepository;
use crate::repository::user_repo::MongoUserRepository;
use crate::router::create_router;
use crate::util::email::{EmailError, LogMailer, Mailer, SmtpMailer};
use crate::util::image_store::{
    CloudinaryImageStore, ImageStore, ImageStoreError, InMemoryImageStore, MinioImageStore,
};
use crate::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl};
use crate::util::token_store::{InMemoryTokenStore, RedisTokenStore, TokenStore, TokenStoreError};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
    #[error("Image store error: {0}")]
    ImageStore(#[from] ImageStoreError),
    #[error("Token store error: {0}")]
    TokenStore(#[from] TokenStoreError),
    #[error("Mailer error: {0}")]
    Mailer(#[from] EmailError),
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

pub struct App {
    config: AppConfig,
    router: Router,
    pub state: AppState,
}

impl Backends {
    /// Connect every collaborator the configuration asks for.
    pub async fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        // Start from the in-process versions and swap in what is configured.
        let mut backends = Backends::in_memory();

        match config.storage_backend {
            StorageBackend::Mongo => {
                let mongo_config = MongoConfig::from_env()?;
                let db = mongo::connect(&mongo_config).await?;
                backends.users = Arc::new(MongoUserRepository::new(&db).await?);
                backends.listings = Arc::new(MongoListingRepository::new(&db));
                backends.chats = Arc::new(MongoChatRepository::new(&db));
                backends.reviews = Arc::new(MongoReviewRepository::new(&db));
                backends.requests = Arc::new(MongoServiceRequestRepository::new(&db));
                backends.questions = Arc::new(MongoQuestionRepository::new(&db));
                info!(database = %mongo_config.database, "Using MongoDB storage");
            }
            StorageBackend::Memory => warn!("Using in-memory storage, data is lost on restart"),
        }

        backends.images = match config.image_backend {
            ImageBackend::Cloudinary => {
                Arc::new(CloudinaryImageStore::new(CloudinaryConfig::from_env()?)) as Arc<dyn ImageStore>
            }
            ImageBackend::Minio => Arc::new(MinioImageStore::new(MinioConfig::from_env()?).await?),
            ImageBackend::Memory => Arc::new(InMemoryImageStore::default()),
        };

        backends.token_store = match config.token_backend {
            TokenBackend::Redis => {
                Arc::new(RedisTokenStore::new(&RedisConfig::from_env()?).await?) as Arc<dyn TokenStore>
            }
            TokenBackend::Memory => Arc::new(InMemoryTokenStore::default()),
        };

        backends.mailer = match config.mail_backend {
            MailBackend::Smtp => Arc::new(SmtpMailer::new(EmailConfig::from_env()?)?) as Arc<dyn Mailer>,
            MailBackend::Log => Arc::new(LogMailer::default()),
        };

        info!(
            storage = %config.storage_backend,
            images = %config.image_backend,
            tokens = %config.token_backend,
            mail = %config.mail_backend,
            "Backends ready"
        );
        Ok(backends)
    }
}

impl App {
    pub async fn new(config: AppConfig) -> Result<Self, AppError> {
        let backends = Backends::from_config(&config).await?;
        let jwt_config = JwtConfig::from_env()?;
        let app = Self::with_backends(config, backends, jwt_config);
        app.create_first_admin_user().await;
        Ok(app)
    }

    /// Build around already constructed backends; used by the tests.
    pub fn with_backends(config: AppConfig, backends: Backends, jwt_config: JwtConfig) -> Self {
        let jwt_utils: Arc<dyn JwtTokenUtils> = Arc::new(JwtTokenUtilsImpl::new(jwt_config));
        let state = AppState::new(backends, jwt_utils, &config.public_base_url);
        let router = create_router(state.clone());
        App { config, router, state }
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub async fn start(self) -> Result<(), AppError> {
        let addr = self.config.bind_address();
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!("🚀 Server running at http://{}", addr);
        axum::serve(listener, self.router).await?;
        Ok(())
    }

    async fn create_first_admin_user(&self) {
        let admin_conf = match AdminUserConfig::from_env() {
            Ok(Some(c)) => c,
            Ok(None) => {
                info!("No admin user configured, skipping bootstrap");
                return;
            }
            Err(e) => {
                warn!("Admin user config not loaded: {e}");
                return;
            }
        };
        if let Err(e) = self.state.auth_service.bootstrap_admin(&admin_conf).await {
            error!("Failed to create admin user: {e}");
        }
    }
}
