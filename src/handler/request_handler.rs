use axum::{
    extract::{Extension, Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use validator::Validate;

use crate::app::state::AppState;
use crate::dto::request_dto::CreateServiceRequest;
use crate::util::error::HandlerError;
use crate::util::jwt::Claims;

pub async fn list_requests_handler(State(state): State<AppState>) -> Result<impl IntoResponse, HandlerError> {
    let board = state.request_service.board(Utc::now()).await?;
    Ok(Json(board))
}

pub async fn create_request_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateServiceRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate()?;
    let request = state.request_service.create_request(claims.user_id(), payload).await?;
    Ok((StatusCode::CREATED, Json(request)))
}
