use axum::{middleware, routing::post, Router};

use crate::app::state::AppState;
use crate::handler::auth_handler::{
    login_handler, logout_handler, refresh_token_handler, request_password_reset_handler, resend_verification_handler,
    reset_password_handler, signup_handler, verify_email_handler,
};
use crate::middlewares::auth_middleware::require_auth;

pub fn auth_router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/api/auth/signup", post(signup_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/refresh", post(refresh_token_handler))
        .route("/api/auth/logout", post(logout_handler))
        .route("/api/auth/verify-email", post(verify_email_handler))
        .route("/api/auth/password-reset/request", post(request_password_reset_handler))
        .route("/api/auth/password-reset/confirm", post(reset_password_handler));

    let protected = Router::new()
        .route("/api/auth/resend-verification", post(resend_verification_handler))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    public.merge(protected)
}
