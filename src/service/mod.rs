pub mod admin_service;
pub mod auth_service;
pub mod chat_service;
pub mod listing_service;
pub mod question_service;
pub mod request_service;
pub mod review_service;
pub mod user_service;
