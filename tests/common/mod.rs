#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt; // for .oneshot()

use kabale_market::app::app::App;
use kabale_market::app::state::{AppState, Backends};
use kabale_market::config::{AppConfig, JwtConfig};
use kabale_market::model::user::{Role, UserChanges};
use kabale_market::util::email::LogMailer;
use kabale_market::util::image_store::InMemoryImageStore;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub backends: Backends,
    pub images: Arc<InMemoryImageStore>,
    pub mailer: Arc<LogMailer>,
}

pub struct TestUser {
    pub id: String,
    pub token: String,
}

pub fn test_app() -> TestApp {
    let images = Arc::new(InMemoryImageStore::default());
    let mailer = Arc::new(LogMailer::default());
    let backends = Backends::in_memory_with(images.clone(), mailer.clone());
    let app = App::with_backends(AppConfig::in_memory(), backends.clone(), JwtConfig::default());
    TestApp {
        router: app.router(),
        state: app.state.clone(),
        backends,
        images,
        mailer,
    }
}

pub async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn json(&self, method: &str, uri: &str, token: Option<&str>, body: Value) -> Response {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap()).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// Page request carrying the session cookie a browser would send.
    pub async fn page(&self, uri: &str, token: Option<&str>) -> Response {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("access_token={}", token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// Bodyless POST from page script, authenticated by the session cookie.
    pub async fn page_post(&self, uri: &str, token: &str) -> Response {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::COOKIE, format!("access_token={}", token))
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn form(&self, uri: &str, body: &str) -> Response {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn signup(&self, name: &str, email: &str) -> TestUser {
        let response = self
            .json(
                "POST",
                "/api/auth/signup",
                None,
                json!({ "name": name, "email": email, "password": "secret123" }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        TestUser {
            id: body["user"]["id"].as_str().unwrap().to_string(),
            token: body["tokens"]["access_token"].as_str().unwrap().to_string(),
        }
    }

    /// Promote a signed-up user to admin and log in again for fresh claims.
    pub async fn admin(&self, email: &str) -> TestUser {
        let user = self.signup("Site Admin", email).await;
        let changes = UserChanges {
            role: Some(Role::Admin),
            ..Default::default()
        };
        self.backends.users.update(&user.id, changes).await.unwrap();
        let response = self
            .json("POST", "/api/auth/login", None, json!({ "email": email, "password": "secret123" }))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        TestUser {
            id: user.id,
            token: body["tokens"]["access_token"].as_str().unwrap().to_string(),
        }
    }
}

pub const BOUNDARY: &str = "kabaleboundary";

/// Multipart body with text fields and an optional image part.
pub fn multipart_body(fields: &[(&str, &str)], image: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((field, file_name, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_request(uri: &str, token: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}
