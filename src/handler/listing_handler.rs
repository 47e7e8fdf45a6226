use axum::{
    extract::{Extension, Json, Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{debug, error};
use validator::Validate;

use crate::app::state::AppState;
use crate::dto::auth_dto::MessageResponse;
use crate::dto::listing_dto::{ListingResponse, NewListing, SearchQuery, UpdateListingRequest};
use crate::service::listing_service::FEATURED_LIMIT;
use crate::util::error::HandlerError;
use crate::util::image_store::{ImageUpload, MAX_IMAGE_BYTES};
use crate::util::jwt::Claims;

/// Read one file field. Browsers send an empty part when no file was chosen,
/// which comes back as `None`.
pub(crate) async fn read_image_field(
    field: axum::extract::multipart::Field<'_>,
) -> Result<Option<ImageUpload>, HandlerError> {
    let file_name = field.file_name().map(|s| s.to_string()).unwrap_or_default();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = field.bytes().await.map_err(|e| {
        error!("Failed to read file data: {}", e);
        HandlerError::bad_request("Could not read the uploaded file.")
    })?;
    if bytes.is_empty() && file_name.is_empty() {
        return Ok(None);
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(HandlerError::bad_request("That image is too large (10 MB max)."));
    }
    Ok(Some(ImageUpload {
        file_name,
        content_type,
        bytes,
    }))
}

pub(crate) fn parse_price(raw: &str) -> Result<Option<i64>, HandlerError> {
    let cleaned: String = raw.chars().filter(|c| !matches!(c, ',' | ' ' | '_')).collect();
    if cleaned.is_empty() {
        return Ok(None);
    }
    cleaned
        .parse::<i64>()
        .map(Some)
        .map_err(|_| HandlerError::bad_request("Please enter the price as a whole number."))
}

async fn read_listing_form(mut multipart: Multipart) -> Result<NewListing, HandlerError> {
    let mut form = NewListing::default();
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error!("Error getting next field: {}", e);
        HandlerError::bad_request(format!("Failed to read form: {}", e))
    })? {
        let name = field.name().map(|s| s.to_string()).unwrap_or_default();
        debug!("Processing field: {}", name);
        match name.as_str() {
            "image" => form.image = read_image_field(field).await?,
            "title" | "description" | "price" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| HandlerError::bad_request(format!("Failed to read {}: {}", name, e)))?;
                match name.as_str() {
                    "title" => form.title = text,
                    "description" => form.description = text,
                    _ => form.price = parse_price(&text)?,
                }
            }
            _ => debug!("Ignoring unknown field: {}", name),
        }
    }
    Ok(form)
}

// Create (multipart: title, description, price, image)
pub async fn create_listing_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HandlerError> {
    let form = read_listing_form(multipart).await?;
    if form.image.is_none() {
        return Err(HandlerError::bad_request(crate::service::listing_service::NO_IMAGE));
    }
    form.validate()?;
    let listing = state.listing_service.create_listing(claims.user_id(), form).await?;
    Ok((StatusCode::CREATED, Json(ListingResponse::from(&listing))))
}

pub async fn update_listing_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateListingRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate()?;
    let listing = state
        .listing_service
        .update_listing(&claims, &id, payload.into_changes())
        .await?;
    Ok(Json(ListingResponse::from(&listing)))
}

pub async fn delete_listing_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    state.listing_service.delete_listing(&claims, &id).await?;
    Ok(Json(MessageResponse::new("Service deleted")))
}

pub async fn get_listing_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let listing = state.listing_service.get_listing(&id).await?;
    Ok(Json(ListingResponse::from(&listing)))
}

// Browse, optionally filtered with ?q=
pub async fn list_listings_handler(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let listings = match query.q.as_deref() {
        Some(q) => state.listing_service.search(q).await?,
        None => state.listing_service.list_all().await?,
    };
    Ok(Json(listings.iter().map(ListingResponse::from).collect::<Vec<_>>()))
}

pub async fn featured_listings_handler(State(state): State<AppState>) -> Result<impl IntoResponse, HandlerError> {
    let listings = state.listing_service.featured(FEATURED_LIMIT).await?;
    Ok(Json(listings.iter().map(ListingResponse::from).collect::<Vec<_>>()))
}

pub async fn my_listings_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, HandlerError> {
    let listings = state.listing_service.list_by_provider(claims.user_id()).await?;
    Ok(Json(listings.iter().map(ListingResponse::from).collect::<Vec<_>>()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_parsing() {
        assert_eq!(parse_price("").unwrap(), None);
        assert_eq!(parse_price("15,000").unwrap(), Some(15000));
        assert_eq!(parse_price(" 2 500 ").unwrap(), Some(2500));
        assert!(parse_price("cheap").is_err());
    }
}
