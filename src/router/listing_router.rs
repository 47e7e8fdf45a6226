use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::app::state::AppState;
use crate::handler::listing_handler::{
    create_listing_handler, delete_listing_handler, featured_listings_handler, get_listing_handler,
    list_listings_handler, my_listings_handler, update_listing_handler,
};
use crate::handler::question_handler::{answer_question_handler, ask_question_handler, list_questions_handler};
use crate::middlewares::auth_middleware::require_auth;
use crate::router::UPLOAD_BODY_LIMIT;

pub fn listing_router(state: AppState) -> Router<AppState> {
    // Public browsing
    let public = Router::new()
        .route("/api/services", get(list_listings_handler))
        .route("/api/services/featured", get(featured_listings_handler))
        .route("/api/services/{id}", get(get_listing_handler))
        .route("/api/services/{id}/questions", get(list_questions_handler));

    // Logged-in providers and askers
    let protected = Router::new()
        .route(
            "/api/services",
            post(create_listing_handler).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/api/services/mine", get(my_listings_handler))
        .route(
            "/api/services/{id}",
            put(update_listing_handler).delete(delete_listing_handler),
        )
        .route("/api/services/{id}/questions", post(ask_question_handler))
        .route("/api/questions/{id}/answer", post(answer_question_handler))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    public.merge(protected)
}
