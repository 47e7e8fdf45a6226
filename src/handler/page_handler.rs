use axum::{
    extract::{Form, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};
use validator::Validate;

use crate::app::state::AppState;
use crate::dto::auth_dto::{AuthResponse, EmailRequest, LoginRequest, ResetPasswordRequest, SignupRequest};
use crate::dto::chat_dto::OpenChatQuery;
use crate::dto::listing_dto::{IdQuery, SearchQuery};
use crate::middlewares::auth_middleware::{clear_session_cookie, current_claims, session_cookie};
use crate::service::listing_service::FEATURED_LIMIT;
use crate::util::error::{HandlerError, ServiceError};
use crate::view::auth::FormState;
use crate::view::layout::{message_page, Viewer};
use crate::view::{admin, auth, browse, chat, dashboard, home, inbox, profile, requests, service, upgrade};

const STYLESHEET: &str = include_str!("../../static/style.css");
const SCRIPT: &str = include_str!("../../static/app.js");

#[derive(Debug, Default, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

fn html(status: StatusCode, body: String) -> Response {
    (status, Html(body)).into_response()
}

fn status_of(err: &ServiceError) -> StatusCode {
    HandlerError::from(err.clone()).error.status()
}

fn error_page(title: &str, viewer: Option<&Viewer>, err: &ServiceError) -> Response {
    html(status_of(err), message_page(title, viewer, err.user_message()))
}

fn viewer_of(state: &AppState, headers: &HeaderMap) -> Option<Viewer> {
    current_claims(state, headers).map(|claims| Viewer::from(&claims))
}

/// Log the user in by cookie and send them on.
fn session_redirect(auth: &AuthResponse, to: &str) -> Response {
    let mut response = Redirect::to(to).into_response();
    if let Some(cookie) = session_cookie(&auth.tokens.access_token, auth.tokens.expires_in) {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    response
}

pub async fn stylesheet() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLESHEET)
}

pub async fn script() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/javascript; charset=utf-8")], SCRIPT)
}

pub async fn home_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let viewer = viewer_of(&state, &headers);
    let featured = match state.listing_service.featured(FEATURED_LIMIT).await {
        Ok(featured) => featured,
        Err(e) => {
            warn!("Could not load featured services: {}", e);
            Vec::new()
        }
    };
    html(
        StatusCode::OK,
        home::render(&home::HomeView {
            viewer: viewer.as_ref(),
            featured: &featured,
        }),
    )
}

pub async fn browse_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
) -> Response {
    let viewer = viewer_of(&state, &headers);
    let q = query.q.unwrap_or_default();
    let listings = if q.trim().is_empty() {
        state.listing_service.list_all().await
    } else {
        state.listing_service.search(&q).await
    };
    match listings {
        Ok(listings) => html(
            StatusCode::OK,
            browse::render(&browse::BrowseView {
                viewer: viewer.as_ref(),
                query: &q,
                listings: &listings,
            }),
        ),
        Err(e) => error_page("Browse Services", viewer.as_ref(), &e),
    }
}

pub async fn service_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<IdQuery>,
) -> Response {
    let viewer = viewer_of(&state, &headers);
    let Some(id) = query.id.filter(|id| !id.is_empty()) else {
        return html(
            StatusCode::NOT_FOUND,
            message_page("Service", viewer.as_ref(), "No service ID provided."),
        );
    };
    let listing = match state.listing_service.get_listing(&id).await {
        Ok(listing) => listing,
        Err(e) => return error_page("Service", viewer.as_ref(), &e),
    };
    let loaded = tokio::try_join!(
        state.review_service.list_for(&listing.provider_id),
        state.question_service.list_for_service(&listing.id),
    );
    match loaded {
        Ok((reviews, questions)) => html(
            StatusCode::OK,
            service::render(&service::ServicePageView {
                viewer: viewer.as_ref(),
                listing: &listing,
                provider_reviews: &reviews,
                questions: &questions,
            }),
        ),
        Err(e) => error_page("Service", viewer.as_ref(), &e),
    }
}

pub async fn profile_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<IdQuery>,
) -> Response {
    let viewer = viewer_of(&state, &headers);
    let Some(id) = query.id.filter(|id| !id.is_empty()) else {
        return html(
            StatusCode::NOT_FOUND,
            message_page("Profile", viewer.as_ref(), "No user ID provided."),
        );
    };
    match state.user_service.get_profile(&id).await {
        Ok(view) => html(
            StatusCode::OK,
            profile::render(&profile::ProfilePageView {
                viewer: viewer.as_ref(),
                profile: &view,
            }),
        ),
        Err(e) => error_page("Profile", viewer.as_ref(), &e),
    }
}

pub async fn dashboard_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(viewer) = viewer_of(&state, &headers) else {
        return Redirect::to("/login").into_response();
    };
    let user = match state.user_service.ensure_plan(&viewer.user_id).await {
        Ok(user) => user,
        Err(e) => return error_page("Dashboard", Some(&viewer), &e),
    };
    match state.listing_service.list_by_provider(&user.id).await {
        Ok(listings) => html(
            StatusCode::OK,
            dashboard::render(&dashboard::DashboardView {
                viewer: &viewer,
                user: &user,
                listings: &listings,
            }),
        ),
        Err(e) => error_page("Dashboard", Some(&viewer), &e),
    }
}

pub async fn chat_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<OpenChatQuery>,
) -> Response {
    let Some(viewer) = viewer_of(&state, &headers) else {
        return Redirect::to("/login").into_response();
    };
    match state
        .chat_service
        .open_chat(&viewer.user_id, query.recipient_id.as_deref(), query.chat_id.as_deref())
        .await
    {
        Ok(view) => html(StatusCode::OK, chat::render(&viewer, &view)),
        Err(e) => html(status_of(&e), chat::error(&viewer, e.user_message())),
    }
}

pub async fn inbox_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(viewer) = viewer_of(&state, &headers) else {
        return Redirect::to("/login").into_response();
    };
    match state.chat_service.conversations(&viewer.user_id).await {
        Ok(conversations) => html(StatusCode::OK, inbox::render(&viewer, &conversations)),
        Err(e) => error_page("Inbox", Some(&viewer), &e),
    }
}

pub async fn requests_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let viewer = viewer_of(&state, &headers);
    match state.request_service.board(Utc::now()).await {
        Ok(board) => html(StatusCode::OK, requests::render(viewer.as_ref(), &board)),
        Err(e) => error_page("Service Requests", viewer.as_ref(), &e),
    }
}

pub async fn upgrade_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let viewer = viewer_of(&state, &headers);
    let current = match &viewer {
        Some(v) => state
            .user_service
            .get_user(&v.user_id)
            .await
            .ok()
            .map(|user| user.effective_plan()),
        None => None,
    };
    html(StatusCode::OK, upgrade::render(viewer.as_ref(), current))
}

pub async fn admin_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(viewer) = viewer_of(&state, &headers) else {
        return html(StatusCode::UNAUTHORIZED, admin::anonymous());
    };
    if !viewer.is_admin {
        warn!(user_id = %viewer.user_id, "Admin page refused");
        return html(StatusCode::FORBIDDEN, admin::denied(&viewer));
    }
    match state.admin_service.overview().await {
        Ok(overview) => html(StatusCode::OK, admin::render(&viewer, &overview)),
        Err(e) => error_page("Admin", Some(&viewer), &e),
    }
}

pub async fn login_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if current_claims(&state, &headers).is_some() {
        return Redirect::to("/dashboard").into_response();
    }
    html(StatusCode::OK, auth::login(&FormState::default()))
}

pub async fn login_submit(State(state): State<AppState>, Form(form): Form<LoginRequest>) -> Response {
    let result = match form.validate() {
        Ok(()) => state.auth_service.login(&form.email, &form.password).await,
        Err(e) => Err(ServiceError::Unauthorized(HandlerError::from(e).message)),
    };
    match result {
        Ok(auth) => session_redirect(&auth, "/dashboard"),
        Err(e) => html(
            status_of(&e),
            auth::login(&FormState {
                email: &form.email,
                error: Some(e.user_message()),
                ..FormState::default()
            }),
        ),
    }
}

pub async fn signup_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if current_claims(&state, &headers).is_some() {
        return Redirect::to("/dashboard").into_response();
    }
    html(StatusCode::OK, auth::signup(&FormState::default()))
}

pub async fn signup_submit(State(state): State<AppState>, Form(form): Form<SignupRequest>) -> Response {
    let result = match form.validate() {
        Ok(()) => state.auth_service.signup(&form.name, &form.email, &form.password).await,
        Err(e) => Err(ServiceError::InvalidInput(HandlerError::from(e).message)),
    };
    match result {
        Ok(auth) => {
            info!(user_id = %auth.user.id, "Signed up from the web form");
            session_redirect(&auth, "/dashboard")
        }
        Err(e) => html(
            status_of(&e),
            auth::signup(&FormState {
                name: &form.name,
                email: &form.email,
                error: Some(e.user_message()),
                notice: None,
            }),
        ),
    }
}

pub async fn logout_submit() -> Response {
    let mut response = Redirect::to("/").into_response();
    response.headers_mut().insert(header::SET_COOKIE, clear_session_cookie());
    response
}

pub async fn forgot_password_page() -> Response {
    html(StatusCode::OK, auth::forgot_password(&FormState::default()))
}

pub async fn forgot_password_submit(State(state): State<AppState>, Form(form): Form<EmailRequest>) -> Response {
    let result = match form.validate() {
        Ok(()) => state.auth_service.request_password_reset(&form.email).await,
        Err(e) => Err(ServiceError::InvalidInput(HandlerError::from(e).message)),
    };
    let page = match &result {
        Ok(()) => auth::forgot_password(&FormState {
            notice: Some("If that email is registered, a reset link is on its way."),
            ..FormState::default()
        }),
        Err(e) => auth::forgot_password(&FormState {
            email: &form.email,
            error: Some(e.user_message()),
            ..FormState::default()
        }),
    };
    html(result.as_ref().err().map(status_of).unwrap_or(StatusCode::OK), page)
}

pub async fn reset_password_page(Query(query): Query<TokenQuery>) -> Response {
    let token = query.token.unwrap_or_default();
    if token.is_empty() {
        return html(
            StatusCode::BAD_REQUEST,
            auth::forgot_password(&FormState {
                error: Some("This reset link is missing its token. Please request a new one."),
                ..FormState::default()
            }),
        );
    }
    html(StatusCode::OK, auth::reset_password(&token, &FormState::default()))
}

pub async fn reset_password_submit(
    State(state): State<AppState>,
    Form(form): Form<ResetPasswordRequest>,
) -> Response {
    let result = match form.validate() {
        Ok(()) => state.auth_service.reset_password(&form.token, &form.new_password).await,
        Err(e) => Err(ServiceError::InvalidInput(HandlerError::from(e).message)),
    };
    match result {
        Ok(()) => html(
            StatusCode::OK,
            auth::login(&FormState {
                notice: Some("Your password has been updated. Please log in."),
                ..FormState::default()
            }),
        ),
        Err(e) => html(
            status_of(&e),
            auth::reset_password(
                &form.token,
                &FormState {
                    error: Some(e.user_message()),
                    ..FormState::default()
                },
            ),
        ),
    }
}

pub async fn verify_email_page(State(state): State<AppState>, Query(query): Query<TokenQuery>) -> Response {
    let token = query.token.unwrap_or_default();
    match state.auth_service.verify_email(&token).await {
        Ok(user) => {
            info!(user_id = %user.id, "Email verified from link");
            html(StatusCode::OK, auth::verify_email_result(true, "Your email address has been verified."))
        }
        Err(e) => html(status_of(&e), auth::verify_email_result(false, e.user_message())),
    }
}

pub async fn not_found_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let viewer = viewer_of(&state, &headers);
    html(
        StatusCode::NOT_FOUND,
        message_page("Not Found", viewer.as_ref(), "That page does not exist."),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::listing_service::SERVICE_NOT_FOUND;

    #[test]
    fn service_errors_map_to_statuses() {
        assert_eq!(
            status_of(&ServiceError::NotFound(SERVICE_NOT_FOUND.into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(&ServiceError::Forbidden("no".into())),
            StatusCode::FORBIDDEN
        );
    }
}
