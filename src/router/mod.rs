use axum::{routing::get, Router};

use crate::app::state::AppState;
use crate::handler::page_handler::not_found_page;

pub mod admin_router;
pub mod auth_router;
pub mod chat_router;
pub mod listing_router;
pub mod page_router;
pub mod profile_router;
pub mod request_router;

/// Body limit for routes taking an image upload; the rest keep axum's 2 MB default.
pub const UPLOAD_BODY_LIMIT: usize = crate::util::image_store::MAX_IMAGE_BYTES + 1024 * 1024;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(page_router::page_router())
        .merge(auth_router::auth_router(state.clone()))
        .merge(listing_router::listing_router(state.clone()))
        .merge(profile_router::profile_router(state.clone()))
        .merge(chat_router::chat_router(state.clone()))
        .merge(request_router::request_router(state.clone()))
        .merge(admin_router::admin_router(state.clone()))
        .route("/health", get(|| async { "OK" }))
        .fallback(not_found_page)
        .with_state(state)
}
