use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::app::state::AppState;
use crate::handler::request_handler::{create_request_handler, list_requests_handler};
use crate::middlewares::auth_middleware::require_auth;

pub fn request_router(state: AppState) -> Router<AppState> {
    let public = Router::new().route("/api/requests", get(list_requests_handler));

    let protected = Router::new()
        .route("/api/requests", post(create_request_handler))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    public.merge(protected)
}
