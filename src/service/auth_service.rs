use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::config::AdminUserConfig;
use crate::dto::auth_dto::AuthResponse;
use crate::model::new_id;
use crate::model::user::{Plan, PublicUser, Role, User, UserChanges};
use crate::repository::repository_error::RepositoryError;
use crate::repository::user_repo::UserRepository;
use crate::util::email::{EmailMessage, Mailer};
use crate::util::error::{ServiceError, ServiceResult};
use crate::util::jwt::{JwtTokenUtils, TokenPair};
use crate::util::one_time_token::{OneTimeTokenError, OneTimeTokens, TokenPurpose};
use crate::util::password::{PasswordUtils, PasswordUtilsImpl};

pub const SHORT_PASSWORD: &str = "Password must be at least 6 characters.";
pub const EMAIL_TAKEN: &str = "This email is already registered.";
pub const BAD_CREDENTIALS: &str = "Invalid email or password. Please try again.";
const BAD_LINK: &str = "This link is invalid or has expired.";

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn signup(&self, name: &str, email: &str, password: &str) -> ServiceResult<AuthResponse>;
    async fn login(&self, email: &str, password: &str) -> ServiceResult<AuthResponse>;
    async fn refresh_token(&self, refresh_token: &str) -> ServiceResult<TokenPair>;
    async fn send_verification(&self, user_id: &str) -> ServiceResult<()>;
    async fn verify_email(&self, token: &str) -> ServiceResult<PublicUser>;
    /// Always succeeds for well-formed input so callers cannot probe for accounts.
    async fn request_password_reset(&self, email: &str) -> ServiceResult<()>;
    async fn reset_password(&self, token: &str, new_password: &str) -> ServiceResult<()>;
    /// Create the configured administrator unless the email is already taken.
    async fn bootstrap_admin(&self, config: &AdminUserConfig) -> ServiceResult<bool>;
}

pub struct AuthServiceImpl {
    pub user_repo: Arc<dyn UserRepository>,
    pub jwt_utils: Arc<dyn JwtTokenUtils>,
    pub tokens: OneTimeTokens,
    pub mailer: Arc<dyn Mailer>,
    pub public_base_url: String,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn token_error(err: OneTimeTokenError) -> ServiceError {
    match err {
        OneTimeTokenError::TokenNotFound | OneTimeTokenError::InvalidToken => {
            ServiceError::InvalidInput(BAD_LINK.to_string())
        }
        OneTimeTokenError::Store(e) => ServiceError::InternalError(format!("Token store error: {}", e)),
    }
}

impl AuthServiceImpl {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        jwt_utils: Arc<dyn JwtTokenUtils>,
        tokens: OneTimeTokens,
        mailer: Arc<dyn Mailer>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            user_repo,
            jwt_utils,
            tokens,
            mailer,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn issue_pair(&self, user: &User) -> ServiceResult<TokenPair> {
        self.jwt_utils
            .generate_token_pair(user)
            .map_err(|e| ServiceError::InternalError(format!("JWT error: {}", e)))
    }

    async fn create_user(&self, name: &str, email: &str, password: &str, role: Role) -> ServiceResult<User> {
        if !PasswordUtilsImpl::is_long_enough(password) {
            return Err(ServiceError::InvalidInput(SHORT_PASSWORD.to_string()));
        }
        let email = normalize_email(email);
        if self.user_repo.find_by_email(&email).await?.is_some() {
            warn!("Signup rejected, email already registered");
            return Err(ServiceError::Conflict(EMAIL_TAKEN.to_string()));
        }
        let hash = PasswordUtilsImpl::hash_password(password)
            .map_err(|e| ServiceError::InternalError(format!("Password hash error: {}", e)))?;
        let now = Utc::now();
        let user = User {
            id: new_id(),
            name: name.trim().to_string(),
            email,
            password_hash: hash,
            role,
            plan: Some(Plan::Spark),
            bio: String::new(),
            profile_photo_url: String::new(),
            whatsapp: None,
            email_verified: false,
            created_at: now,
            updated_at: now,
        };
        match self.user_repo.insert(user).await {
            Ok(user) => {
                info!(user_id = %user.id, "User inserted successfully");
                Ok(user)
            }
            Err(RepositoryError::AlreadyExists(_)) => Err(ServiceError::Conflict(EMAIL_TAKEN.to_string())),
            Err(e) => {
                error!("Failed to insert user: {e}");
                Err(e.into())
            }
        }
    }

    async fn mail_verification(&self, user: &User) -> ServiceResult<()> {
        let token = self
            .tokens
            .issue(TokenPurpose::EmailVerification, &user.id, &user.email)
            .await
            .map_err(token_error)?;
        let url = format!("{}/verify-email?token={}", self.public_base_url, token);
        self.mailer
            .send(EmailMessage::verification(&user.email, &user.name, &url))
            .await
            .map_err(|e| ServiceError::InternalError(format!("Email error: {}", e)))
    }

    async fn load_user(&self, user_id: &str) -> ServiceResult<User> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User profile not found.".to_string()))
    }
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    #[instrument(skip(self, password), fields(email = %email))]
    async fn signup(&self, name: &str, email: &str, password: &str) -> ServiceResult<AuthResponse> {
        info!("Registering new user");
        let user = self.create_user(name, email, password, Role::User).await?;
        let tokens = self.issue_pair(&user)?;
        // The account exists either way; a failed mail can be re-sent later.
        if let Err(e) = self.mail_verification(&user).await {
            error!("Failed to send verification email: {e}");
        }
        Ok(AuthResponse {
            user: PublicUser::from(&user),
            tokens,
        })
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn login(&self, email: &str, password: &str) -> ServiceResult<AuthResponse> {
        info!("User login attempt");
        let Some(user) = self.user_repo.find_by_email(&normalize_email(email)).await? else {
            warn!("Login failed: unknown email");
            return Err(ServiceError::Unauthorized(BAD_CREDENTIALS.to_string()));
        };
        let valid = PasswordUtilsImpl::verify_password(password, &user.password_hash).unwrap_or_else(|e| {
            error!(user_id = %user.id, "Stored password hash unreadable: {e}");
            false
        });
        if !valid {
            warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(ServiceError::Unauthorized(BAD_CREDENTIALS.to_string()));
        }
        let tokens = self.issue_pair(&user)?;
        info!(user_id = %user.id, "User logged in successfully");
        Ok(AuthResponse {
            user: PublicUser::from(&user),
            tokens,
        })
    }

    #[instrument(skip_all)]
    async fn refresh_token(&self, refresh_token: &str) -> ServiceResult<TokenPair> {
        let claims = self
            .jwt_utils
            .validate_refresh_token(refresh_token)
            .map_err(|e| ServiceError::Unauthorized(format!("Invalid refresh token: {}", e)))?;
        // Re-read the user so role changes show up in the new access token.
        let user = self
            .user_repo
            .find_by_id(claims.user_id())
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("Account no longer exists.".to_string()))?;
        self.issue_pair(&user)
    }

    #[instrument(skip(self))]
    async fn send_verification(&self, user_id: &str) -> ServiceResult<()> {
        let user = self.load_user(user_id).await?;
        if user.email_verified {
            return Err(ServiceError::InvalidInput("Your email is already verified.".to_string()));
        }
        self.mail_verification(&user).await
    }

    #[instrument(skip_all)]
    async fn verify_email(&self, token: &str) -> ServiceResult<PublicUser> {
        let grant = self
            .tokens
            .redeem(TokenPurpose::EmailVerification, token)
            .await
            .map_err(token_error)?;
        let user = self.load_user(&grant.user_id).await?;
        if user.email != grant.email {
            warn!(user_id = %user.id, "Verification token issued for a previous email");
            return Err(ServiceError::InvalidInput(BAD_LINK.to_string()));
        }
        let changes = UserChanges {
            email_verified: Some(true),
            ..Default::default()
        };
        let user = self.user_repo.update(&user.id, changes).await?;
        info!(user_id = %user.id, "Email verified");
        Ok(PublicUser::from(&user))
    }

    #[instrument(skip(self), fields(email = %email))]
    async fn request_password_reset(&self, email: &str) -> ServiceResult<()> {
        let Some(user) = self.user_repo.find_by_email(&normalize_email(email)).await? else {
            info!("Password reset requested for unknown email");
            return Ok(());
        };
        let token = self
            .tokens
            .issue(TokenPurpose::PasswordReset, &user.id, &user.email)
            .await
            .map_err(token_error)?;
        let url = format!("{}/reset-password?token={}", self.public_base_url, token);
        self.mailer
            .send(EmailMessage::password_reset(&user.email, &user.name, &url))
            .await
            .map_err(|e| ServiceError::InternalError(format!("Email error: {}", e)))?;
        info!(user_id = %user.id, "Password reset email sent");
        Ok(())
    }

    #[instrument(skip_all)]
    async fn reset_password(&self, token: &str, new_password: &str) -> ServiceResult<()> {
        if !PasswordUtilsImpl::is_long_enough(new_password) {
            return Err(ServiceError::InvalidInput(SHORT_PASSWORD.to_string()));
        }
        let grant = self
            .tokens
            .redeem(TokenPurpose::PasswordReset, token)
            .await
            .map_err(token_error)?;
        let user = self.load_user(&grant.user_id).await?;
        let password_hash = PasswordUtilsImpl::hash_password(new_password)
            .map_err(|e| ServiceError::InternalError(format!("Password hash error: {}", e)))?;
        let changes = UserChanges {
            password_hash: Some(password_hash),
            ..Default::default()
        };
        self.user_repo.update(&user.id, changes).await?;
        info!(user_id = %grant.user_id, "Password reset");
        Ok(())
    }

    #[instrument(skip(self, config), fields(email = %config.email))]
    async fn bootstrap_admin(&self, config: &AdminUserConfig) -> ServiceResult<bool> {
        if self.user_repo.find_by_email(&normalize_email(&config.email)).await?.is_some() {
            info!("Admin user already exists, skipping creation.");
            return Ok(false);
        }
        let admin = self
            .create_user(&config.name, &config.email, &config.password, Role::Admin)
            .await?;
        let changes = UserChanges {
            email_verified: Some(true),
            ..Default::default()
        };
        self.user_repo.update(&admin.id, changes).await?;
        info!("First admin user created.");
        Ok(true)
    }
}
