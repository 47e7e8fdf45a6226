use axum::{
    extract::{Extension, Json, Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::error;
use validator::Validate;

use crate::app::state::AppState;
use crate::dto::profile_dto::UpdateProfileRequest;
use crate::dto::review_dto::{ReviewStatus, ReviewView, SubmitReviewRequest};
use crate::handler::listing_handler::read_image_field;
use crate::model::user::PublicUser;
use crate::util::error::HandlerError;
use crate::util::jwt::Claims;

pub async fn get_profile_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let profile = state.user_service.get_profile(&id).await?;
    Ok(Json(profile))
}

/// The caller's own account. Stores `spark` on first load when the plan is missing.
pub async fn me_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, HandlerError> {
    let user = state.user_service.ensure_plan(claims.user_id()).await?;
    Ok(Json(PublicUser::from(&user)))
}

pub async fn update_profile_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate()?;
    let user = state.user_service.update_profile(claims.user_id(), payload).await?;
    Ok(Json(user))
}

// Multipart with a single `photo` file field
pub async fn upload_photo_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HandlerError> {
    let mut photo = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error!("Error getting next field: {}", e);
        HandlerError::bad_request(format!("Failed to read form: {}", e))
    })? {
        if field.name() == Some("photo") {
            photo = read_image_field(field).await?;
        }
    }
    let Some(photo) = photo else {
        return Err(HandlerError::bad_request("Please select an image file."));
    };
    let user = state.user_service.upload_profile_photo(claims.user_id(), photo).await?;
    Ok(Json(user))
}

pub async fn list_reviews_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let reviews = state.review_service.list_for(&id).await?;
    Ok(Json(reviews))
}

pub async fn submit_review_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(payload): Json<SubmitReviewRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate()?;
    let review = state
        .review_service
        .submit_review(claims.user_id(), &id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(ReviewView::from(&review))))
}

pub async fn review_status_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let already_reviewed = state.review_service.has_reviewed(claims.user_id(), &id).await?;
    Ok(Json(ReviewStatus { already_reviewed }))
}
