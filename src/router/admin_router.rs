use axum::{
    middleware,
    routing::{get, put},
    Router,
};

use crate::app::state::AppState;
use crate::handler::admin_handler::{overview_handler, set_featured_handler, set_plan_handler};
use crate::middlewares::auth_middleware::admin_auth;

pub fn admin_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/admin/overview", get(overview_handler))
        .route("/api/admin/services/{id}/featured", put(set_featured_handler))
        .route("/api/admin/users/{id}/plan", put(set_plan_handler))
        .route_layer(middleware::from_fn_with_state(state, admin_auth))
}
