use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
};
use validator::Validate;

use crate::app::state::AppState;
use crate::dto::admin_dto::{SetFeaturedRequest, SetPlanRequest};
use crate::dto::auth_dto::MessageResponse;
use crate::model::user::Plan;
use crate::util::error::HandlerError;

pub async fn overview_handler(State(state): State<AppState>) -> Result<impl IntoResponse, HandlerError> {
    let overview = state.admin_service.overview().await?;
    Ok(Json(overview))
}

pub async fn set_featured_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<SetFeaturedRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    state.admin_service.set_featured(&id, payload.is_featured).await?;
    Ok(Json(MessageResponse::new(if payload.is_featured {
        "Service featured"
    } else {
        "Service no longer featured"
    })))
}

pub async fn set_plan_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<SetPlanRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate()?;
    let plan = Plan::parse(payload.plan.trim())
        .ok_or_else(|| HandlerError::bad_request(format!("Unknown plan '{}'.", payload.plan)))?;
    let user = state.admin_service.set_plan(&id, plan).await?;
    Ok(Json(user))
}
