mod common;

use axum::http::{header, StatusCode};
use serde_json::json;

use common::{body_json, body_text, test_app};
use kabale_market::config::AdminUserConfig;

fn token_from_link(body: &str, path: &str) -> String {
    let marker = format!("{}?token=", path);
    let start = body.find(&marker).expect("link in mail") + marker.len();
    body[start..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect()
}

#[tokio::test]
async fn signup_rejects_short_password() {
    let app = test_app();
    let response = app
        .json(
            "POST",
            "/api/auth/signup",
            None,
            json!({ "name": "Amina", "email": "amina@example.com", "password": "123" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Password must be at least 6 characters.");
}

#[tokio::test]
async fn signup_twice_with_same_email_conflicts() {
    let app = test_app();
    app.signup("Amina", "amina@example.com").await;
    let response = app
        .json(
            "POST",
            "/api/auth/signup",
            None,
            json!({ "name": "Other", "email": "Amina@Example.com", "password": "secret123" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["message"], "This email is already registered.");
}

#[tokio::test]
async fn new_account_starts_on_spark_and_gets_verification_mail() {
    let app = test_app();
    let user = app.signup("Amina Nabirye", "amina@example.com").await;

    let me = body_json(app.get("/api/me", Some(&user.token)).await).await;
    assert_eq!(me["plan"], "spark");
    assert_eq!(me["role"], "user");
    assert_eq!(me["emailVerified"], false);

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "amina@example.com");

    let token = token_from_link(&sent[0].text_body, "/verify-email");
    let response = app.page(&format!("/verify-email?token={}", token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Your email address has been verified."));

    let me = body_json(app.get("/api/me", Some(&user.token)).await).await;
    assert_eq!(me["emailVerified"], true);
}

#[tokio::test]
async fn login_failures_share_one_message() {
    let app = test_app();
    app.signup("Amina", "amina@example.com").await;

    for body in [
        json!({ "email": "amina@example.com", "password": "wrong-password" }),
        json!({ "email": "nobody@example.com", "password": "secret123" }),
    ] {
        let response = app.json("POST", "/api/auth/login", None, body).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await["message"],
            "Invalid email or password. Please try again."
        );
    }
}

#[tokio::test]
async fn password_reset_round_trip() {
    let app = test_app();
    app.signup("Amina", "amina@example.com").await;

    let response = app
        .json(
            "POST",
            "/api/auth/password-reset/request",
            None,
            json!({ "email": "amina@example.com" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let mail = app.mailer.sent().pop().expect("reset mail");
    let token = token_from_link(&mail.text_body, "/reset-password");

    let response = app
        .json(
            "POST",
            "/api/auth/password-reset/confirm",
            None,
            json!({ "token": token, "new_password": "brand-new-pass" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // The token only works once.
    let response = app
        .json(
            "POST",
            "/api/auth/password-reset/confirm",
            None,
            json!({ "token": token, "new_password": "another-pass" }),
        )
        .await;
    assert!(response.status().is_client_error());

    let response = app
        .json(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "amina@example.com", "password": "brand-new-pass" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn reset_request_for_unknown_email_is_not_disclosed() {
    let app = test_app();
    let response = app
        .json(
            "POST",
            "/api/auth/password-reset/request",
            None,
            json!({ "email": "ghost@example.com" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.mailer.sent().is_empty());
}

#[tokio::test]
async fn login_form_sets_cookie_and_redirects() {
    let app = test_app();
    app.signup("Amina", "amina@example.com").await;

    let response = app
        .form("/login", "email=amina%40example.com&password=secret123")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/dashboard");
    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("access_token="));

    let response = app.form("/login", "email=amina%40example.com&password=nope").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(body_text(response)
        .await
        .contains("Invalid email or password. Please try again."));
}

#[tokio::test]
async fn logged_in_visitors_skip_login_and_signup() {
    let app = test_app();
    let user = app.signup("Amina", "amina@example.com").await;
    for path in ["/login", "/signup"] {
        let response = app.page(path, Some(&user.token)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/dashboard");
    }
    let response = app.page("/login", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn refresh_issues_a_new_pair_and_rejects_access_tokens() {
    let app = test_app();
    let response = app
        .json(
            "POST",
            "/api/auth/signup",
            None,
            json!({ "name": "Amina", "email": "amina@example.com", "password": "secret123" }),
        )
        .await;
    let body = body_json(response).await;
    let refresh = body["tokens"]["refresh_token"].as_str().unwrap().to_string();
    let access = body["tokens"]["access_token"].as_str().unwrap().to_string();

    let response = app
        .json("POST", "/api/auth/refresh", None, json!({ "refresh_token": refresh }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let pair = body_json(response).await;
    assert_eq!(pair["token_type"], "Bearer");
    let me = app.get("/api/me", pair["access_token"].as_str()).await;
    assert_eq!(me.status(), StatusCode::OK);

    let response = app
        .json("POST", "/api/auth/refresh", None, json!({ "refresh_token": access }))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_clears_the_session_cookie() {
    let app = test_app();
    let response = app.json("POST", "/api/auth/logout", None, json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn admin_bootstrap_runs_once() {
    let app = test_app();
    let config = AdminUserConfig {
        name: "Site Admin".into(),
        email: "Admin@Example.com".into(),
        password: "admin-secret".into(),
    };
    assert!(app.state.auth_service.bootstrap_admin(&config).await.unwrap());
    assert!(!app.state.auth_service.bootstrap_admin(&config).await.unwrap());

    let response = app
        .json(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "admin@example.com", "password": "admin-secret" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["user"]["role"], "admin");
    assert_eq!(body["user"]["emailVerified"], true);
}
