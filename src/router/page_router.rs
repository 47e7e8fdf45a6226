use axum::{
    routing::{get, post},
    Router,
};

use crate::app::state::AppState;
use crate::handler::page_handler::{
    admin_page, browse_page, chat_page, dashboard_page, forgot_password_page, forgot_password_submit, home_page,
    inbox_page, login_page, login_submit, logout_submit, profile_page, requests_page, reset_password_page,
    reset_password_submit, script, service_page, signup_page, signup_submit, stylesheet, upgrade_page,
    verify_email_page,
};

/// Server-rendered pages. Access rules live in the handlers, which redirect
/// or render a message instead of answering with JSON.
pub fn page_router() -> Router<AppState> {
    Router::new()
        .route("/", get(home_page))
        .route("/browse", get(browse_page))
        .route("/service", get(service_page))
        .route("/profile", get(profile_page))
        .route("/dashboard", get(dashboard_page))
        .route("/chat", get(chat_page))
        .route("/inbox", get(inbox_page))
        .route("/requests", get(requests_page))
        .route("/upgrade", get(upgrade_page))
        .route("/admin", get(admin_page))
        .route("/login", get(login_page).post(login_submit))
        .route("/signup", get(signup_page).post(signup_submit))
        .route("/logout", post(logout_submit))
        .route("/forgot-password", get(forgot_password_page).post(forgot_password_submit))
        .route("/reset-password", get(reset_password_page).post(reset_password_submit))
        .route("/verify-email", get(verify_email_page))
        .route("/static/style.css", get(stylesheet))
        .route("/static/app.js", get(script))
}
