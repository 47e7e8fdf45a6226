use axum::{
    extract::{Extension, Json, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use validator::Validate;

use crate::app::state::AppState;
use crate::dto::auth_dto::{
    AuthResponse, EmailRequest, LoginRequest, MessageResponse, RefreshTokenRequest, ResetPasswordRequest,
    SignupRequest, VerifyEmailRequest,
};
use crate::middlewares::auth_middleware::{clear_session_cookie, session_cookie};
use crate::util::error::HandlerError;
use crate::util::jwt::Claims;

/// JSON body plus the session cookie the pages rely on.
pub(crate) fn with_session(status: StatusCode, auth: AuthResponse) -> Response {
    let cookie = session_cookie(&auth.tokens.access_token, auth.tokens.expires_in);
    let mut response = (status, Json(auth)).into_response();
    if let Some(cookie) = cookie {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    response
}

// Signup
pub async fn signup_handler(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate()?;
    let res = state
        .auth_service
        .signup(&payload.name, &payload.email, &payload.password)
        .await?;
    Ok(with_session(StatusCode::CREATED, res))
}

// Login
pub async fn login_handler(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate()?;
    let res = state.auth_service.login(&payload.email, &payload.password).await?;
    Ok(with_session(StatusCode::OK, res))
}

// Refresh Token
pub async fn refresh_token_handler(
    State(state): State<AppState>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate()?;
    let res = state.auth_service.refresh_token(&payload.refresh_token).await?;
    Ok(Json(res))
}

// Logout: tokens are stateless, only the cookie goes.
pub async fn logout_handler() -> impl IntoResponse {
    (
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(MessageResponse::new("Logged out")),
    )
}

pub async fn resend_verification_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, HandlerError> {
    state.auth_service.send_verification(claims.user_id()).await?;
    Ok(Json(MessageResponse::new("Verification email sent")))
}

pub async fn verify_email_handler(
    State(state): State<AppState>,
    Json(payload): Json<VerifyEmailRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate()?;
    let user = state.auth_service.verify_email(&payload.token).await?;
    Ok(Json(user))
}

// Request Password Reset
pub async fn request_password_reset_handler(
    State(state): State<AppState>,
    Json(payload): Json<EmailRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate()?;
    state.auth_service.request_password_reset(&payload.email).await?;
    Ok(Json(MessageResponse::new(
        "If that email is registered, a reset link is on its way.",
    )))
}

// Reset Password
pub async fn reset_password_handler(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate()?;
    state
        .auth_service
        .reset_password(&payload.token, &payload.new_password)
        .await?;
    Ok(Json(MessageResponse::new("Password reset successful")))
}
