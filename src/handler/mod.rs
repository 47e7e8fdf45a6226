pub mod admin_handler;
pub mod auth_handler;
pub mod chat_handler;
pub mod listing_handler;
pub mod page_handler;
pub mod profile_handler;
pub mod question_handler;
pub mod request_handler;
