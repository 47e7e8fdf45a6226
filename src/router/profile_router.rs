use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::app::state::AppState;
use crate::handler::profile_handler::{
    get_profile_handler, list_reviews_handler, me_handler, review_status_handler, submit_review_handler,
    update_profile_handler, upload_photo_handler,
};
use crate::middlewares::auth_middleware::require_auth;
use crate::router::UPLOAD_BODY_LIMIT;

pub fn profile_router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/api/users/{id}", get(get_profile_handler))
        .route("/api/users/{id}/reviews", get(list_reviews_handler));

    let protected = Router::new()
        .route("/api/users/{id}/reviews", post(submit_review_handler))
        .route("/api/users/{id}/review-status", get(review_status_handler))
        .route("/api/me", get(me_handler))
        .route("/api/me/profile", put(update_profile_handler))
        .route(
            "/api/me/photo",
            post(upload_photo_handler).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    public.merge(protected)
}
