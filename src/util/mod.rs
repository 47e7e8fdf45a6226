pub mod email;
pub mod error;
pub mod html;
pub mod image_store;
pub mod image_url;
pub mod jwt;
pub mod logger;
pub mod one_time_token;
pub mod password;
pub mod realtime;
pub mod token_store;
