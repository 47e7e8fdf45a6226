use axum::{
    extract::{Extension, Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::app::state::AppState;
use crate::dto::question_dto::{AnswerQuestionRequest, AskQuestionRequest};
use crate::util::error::HandlerError;
use crate::util::jwt::Claims;

pub async fn list_questions_handler(
    State(state): State<AppState>,
    Path(service_id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let questions = state.question_service.list_for_service(&service_id).await?;
    Ok(Json(questions))
}

pub async fn ask_question_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(service_id): Path<String>,
    Json(payload): Json<AskQuestionRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate()?;
    let question = state
        .question_service
        .ask(claims.user_id(), &service_id, &payload.question)
        .await?;
    Ok((StatusCode::CREATED, Json(question)))
}

pub async fn answer_question_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(question_id): Path<String>,
    Json(payload): Json<AnswerQuestionRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate()?;
    let question = state
        .question_service
        .answer(&claims, &question_id, &payload.answer)
        .await?;
    Ok(Json(question))
}
