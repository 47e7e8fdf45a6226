mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{body_json, body_text, multipart_body, multipart_request, test_app};

const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0, 1, 2, 3];

#[tokio::test]
async fn listing_without_image_is_rejected_before_any_write() {
    let app = test_app();
    let user = app.signup("Grace Tailor", "grace@example.com").await;

    let body = multipart_body(&[("title", "Tailoring"), ("description", "Dresses and suits")], None);
    let response = app.send(multipart_request("/api/services", &user.token, body)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Please select an image file.");
    assert_eq!(app.images.upload_count(), 0);
    let all = body_json(app.get("/api/services", None).await).await;
    assert_eq!(all.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn spark_plan_allows_one_listing_until_upgraded() {
    let app = test_app();
    let user = app.signup("Grace Tailor", "grace@example.com").await;
    let admin = app.admin("admin@example.com").await;

    let first = multipart_body(
        &[("title", "Tailoring"), ("description", "Dresses"), ("price", "15,000")],
        Some(("image", "dress.png", PNG)),
    );
    let response = app.send(multipart_request("/api/services", &user.token, first)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["priceLabel"], "UGX 15,000");
    assert_eq!(created["providerName"], "Grace Tailor");

    let second = multipart_body(
        &[("title", "Alterations"), ("description", "Quick fixes")],
        Some(("image", "fix.png", PNG)),
    );
    let response = app
        .send(multipart_request("/api/services", &user.token, second.clone()))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        body_json(response).await["message"],
        "Your current plan allows 1 listing. Upgrade to add more."
    );
    assert_eq!(app.images.upload_count(), 1);

    let response = app
        .json(
            "PUT",
            &format!("/api/admin/users/{}/plan", user.id),
            Some(&admin.token),
            json!({ "plan": "pro" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.send(multipart_request("/api/services", &user.token, second)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["priceLabel"], "Contact for Quote");
}

#[tokio::test]
async fn only_owner_or_admin_may_delete() {
    let app = test_app();
    let owner = app.signup("Grace", "grace@example.com").await;
    let stranger = app.signup("Mallory", "mallory@example.com").await;

    let body = multipart_body(
        &[("title", "Tailoring"), ("description", "Dresses")],
        Some(("image", "dress.png", PNG)),
    );
    let created = body_json(app.send(multipart_request("/api/services", &owner.token, body)).await).await;
    let id = created["id"].as_str().unwrap().to_string();

    let response = app
        .json("DELETE", &format!("/api/services/{}", id), Some(&stranger.token), json!({}))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .json("DELETE", &format!("/api/services/{}", id), Some(&owner.token), json!({}))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.get(&format!("/api/services/{}", id), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "Service not found.");
}

#[tokio::test]
async fn browse_search_and_featured_pages() {
    let app = test_app();
    let admin = app.admin("admin@example.com").await;
    let grace = app.signup("Grace Tailor", "grace@example.com").await;

    let body = multipart_body(
        &[("title", "Tailoring <Express>"), ("description", "Dresses"), ("price", "1234567")],
        Some(("image", "dress.png", PNG)),
    );
    let created = body_json(app.send(multipart_request("/api/services", &grace.token, body)).await).await;
    let id = created["id"].as_str().unwrap().to_string();

    let html = body_text(app.page("/browse", None).await).await;
    assert!(html.contains("UGX 1,234,567"));
    assert!(html.contains("Tailoring &lt;Express&gt;"));
    assert!(!html.contains("<Express>"));

    let html = body_text(app.page("/browse?q=plumbing", None).await).await;
    assert!(html.contains("No services match your search."));
    let html = body_text(app.page("/browse?q=GRACE", None).await).await;
    assert!(html.contains("Tailoring &lt;Express&gt;"));

    let html = body_text(app.page("/", None).await).await;
    assert!(html.contains("No featured services available right now."));

    let response = app
        .json(
            "PUT",
            &format!("/api/admin/services/{}/featured", id),
            Some(&admin.token),
            json!({ "isFeatured": true }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(app.page("/", None).await).await;
    assert!(html.contains("By Grace Tailor"));
    assert!(html.contains("#fde2e4"));
}

#[tokio::test]
async fn service_page_depends_on_viewer() {
    let app = test_app();
    let grace = app.signup("Grace", "grace@example.com").await;
    let buyer = app.signup("Buyer", "buyer@example.com").await;
    let body = multipart_body(
        &[("title", "Tailoring"), ("description", "Line one\nLine two")],
        Some(("image", "dress.png", PNG)),
    );
    let created = body_json(app.send(multipart_request("/api/services", &grace.token, body)).await).await;
    let uri = format!("/service?id={}", created["id"].as_str().unwrap());

    let html = body_text(app.page(&uri, None).await).await;
    assert!(html.contains("Login to Contact"));
    assert!(html.contains("Line one<br>Line two"));
    assert!(html.contains("No reviews yet for this provider."));

    let html = body_text(app.page(&uri, Some(&buyer.token)).await).await;
    assert!(html.contains(&format!("/chat?recipientId={}", grace.id)));

    let response = app.page("/service?id=missing", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
