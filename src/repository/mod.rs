pub mod chat_repo;
pub mod listing_repo;
pub mod memory;
pub mod mongo;
pub mod question_repo;
pub mod repository_error;
pub mod request_repo;
pub mod review_repo;
pub mod user_repo;
