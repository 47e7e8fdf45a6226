pub mod admin_dto;
pub mod auth_dto;
pub mod chat_dto;
pub mod listing_dto;
pub mod profile_dto;
pub mod question_dto;
pub mod request_dto;
pub mod review_dto;
