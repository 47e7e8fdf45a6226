use std::sync::Arc;

use crate::repository::chat_repo::ChatRepository;
use crate::repository::listing_repo::ListingRepository;
use crate::repository::memory::{
    InMemoryChatRepository, InMemoryListingRepository, InMemoryQuestionRepository, InMemoryReviewRepository,
    InMemoryServiceRequestRepository, InMemoryUserRepository,
};
use crate::repository::question_repo::QuestionRepository;
use crate::repository::request_repo::ServiceRequestRepository;
use crate::repository::review_repo::ReviewRepository;
use crate::repository::user_repo::UserRepository;
use crate::service::admin_service::{AdminService, AdminServiceImpl};
use crate::service::auth_service::{AuthService, AuthServiceImpl};
use crate::service::chat_service::{ChatService, ChatServiceImpl};
use crate::service::listing_service::{ListingService, ListingServiceImpl};
use crate::service::question_service::{QuestionService, QuestionServiceImpl};
use crate::service::request_service::{ServiceRequestService, ServiceRequestServiceImpl};
use crate::service::review_service::{ReviewService, ReviewServiceImpl};
use crate::service::user_service::{UserService, UserServiceImpl};
use crate::util::email::{LogMailer, Mailer};
use crate::util::image_store::{ImageStore, InMemoryImageStore};
use crate::util::jwt::JwtTokenUtils;
use crate::util::one_time_token::OneTimeTokens;
use crate::util::realtime::RealtimeHub;
use crate::util::token_store::{InMemoryTokenStore, TokenStore};

/// The external collaborators, whichever backend each one runs on.
#[derive(Clone)]
pub struct Backends {
    pub users: Arc<dyn UserRepository>,
    pub listings: Arc<dyn ListingRepository>,
    pub chats: Arc<dyn ChatRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
    pub requests: Arc<dyn ServiceRequestRepository>,
    pub questions: Arc<dyn QuestionRepository>,
    pub images: Arc<dyn ImageStore>,
    pub token_store: Arc<dyn TokenStore>,
    pub mailer: Arc<dyn Mailer>,
}

impl Backends {
    pub fn in_memory() -> Self {
        Self::in_memory_with(Arc::new(InMemoryImageStore::default()), Arc::new(LogMailer::default()))
    }

    /// In-memory repositories around a caller-held image store and mailer,
    /// so tests can look at what was uploaded or sent.
    pub fn in_memory_with(images: Arc<dyn ImageStore>, mailer: Arc<dyn Mailer>) -> Self {
        Backends {
            users: Arc::new(InMemoryUserRepository::default()),
            listings: Arc::new(InMemoryListingRepository::default()),
            chats: Arc::new(InMemoryChatRepository::default()),
            reviews: Arc::new(InMemoryReviewRepository::default()),
            requests: Arc::new(InMemoryServiceRequestRepository::default()),
            questions: Arc::new(InMemoryQuestionRepository::default()),
            images,
            token_store: Arc::new(InMemoryTokenStore::default()),
            mailer,
        }
    }
}

/// Shared by every handler. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    pub listing_service: Arc<dyn ListingService>,
    pub chat_service: Arc<dyn ChatService>,
    pub review_service: Arc<dyn ReviewService>,
    pub request_service: Arc<dyn ServiceRequestService>,
    pub question_service: Arc<dyn QuestionService>,
    pub admin_service: Arc<dyn AdminService>,
    pub jwt_utils: Arc<dyn JwtTokenUtils>,
    pub hub: RealtimeHub,
}

impl AppState {
    pub fn new(backends: Backends, jwt_utils: Arc<dyn JwtTokenUtils>, public_base_url: &str) -> Self {
        let hub = RealtimeHub::new();
        let Backends {
            users,
            listings,
            chats,
            reviews,
            requests,
            questions,
            images,
            token_store,
            mailer,
        } = backends;

        AppState {
            auth_service: Arc::new(AuthServiceImpl::new(
                users.clone(),
                jwt_utils.clone(),
                OneTimeTokens::new(token_store),
                mailer,
                public_base_url,
            )),
            user_service: Arc::new(UserServiceImpl::new(
                users.clone(),
                listings.clone(),
                reviews.clone(),
                images.clone(),
            )),
            listing_service: Arc::new(ListingServiceImpl::new(listings.clone(), users.clone(), images)),
            chat_service: Arc::new(ChatServiceImpl::new(chats, users.clone(), reviews.clone(), hub.clone())),
            review_service: Arc::new(ReviewServiceImpl::new(reviews, users.clone())),
            request_service: Arc::new(ServiceRequestServiceImpl::new(requests, users.clone())),
            question_service: Arc::new(QuestionServiceImpl::new(questions, listings.clone(), users.clone())),
            admin_service: Arc::new(AdminServiceImpl::new(listings, users)),
            jwt_utils,
            hub,
        }
    }
}
