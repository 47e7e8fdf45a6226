use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::app::state::AppState;
use crate::util::error::HandlerError;
use crate::util::jwt::Claims;
use crate::view::admin::ACCESS_DENIED_MESSAGE;

/// Name of the cookie the pages read the access token from.
pub const SESSION_COOKIE: &str = "access_token";

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// Bearer header first, then the session cookie.
pub fn token_from_headers(state: &AppState, headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        return state.jwt_utils.extract_token_from_header(auth_header).ok();
    }
    cookie_value(headers, SESSION_COOKIE)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Claims of the caller, if they sent a valid access token.
pub fn current_claims(state: &AppState, headers: &HeaderMap) -> Option<Claims> {
    let token = token_from_headers(state, headers)?;
    match state.jwt_utils.validate_access_token(&token) {
        Ok(claims) => Some(claims),
        Err(e) => {
            debug!("Ignoring invalid access token: {}", e);
            None
        }
    }
}

pub fn session_cookie(token: &str, max_age_secs: i64) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, max_age_secs
    ))
    .ok()
}

pub fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_static("access_token=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0")
}

/// Rejects requests without a valid access token and hands the claims to the handler.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    let Some(claims) = current_claims(&state, req.headers()) else {
        return Err(HandlerError::unauthorized("Please log in to continue."));
    };
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

pub async fn admin_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    let Some(claims) = current_claims(&state, req.headers()) else {
        return Err(HandlerError::unauthorized(
            "Please log in as an administrator to view this page.",
        ));
    };
    if !claims.is_admin() {
        warn!(user_id = %claims.user_id(), "Admin route refused");
        return Err(HandlerError::forbidden(ACCESS_DENIED_MESSAGE));
    }
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_named_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; access_token=abc.def; x=1"));
        assert_eq!(cookie_value(&headers, SESSION_COOKIE), Some("abc.def"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn session_cookie_attributes() {
        let cookie = session_cookie("tok", 3600).unwrap();
        let text = cookie.to_str().unwrap();
        assert!(text.starts_with("access_token=tok;"));
        assert!(text.contains("HttpOnly"));
        assert!(text.contains("Max-Age=3600"));
    }
}
