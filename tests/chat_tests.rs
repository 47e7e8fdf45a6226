mod common;

use axum::http::{header, StatusCode};
use serde_json::json;

use common::{body_json, body_text, test_app};
use kabale_market::model::chat::chat_id_for;

#[test]
fn chat_id_is_symmetric() {
    assert_eq!(chat_id_for("alice", "bob"), chat_id_for("bob", "alice"));
    assert_eq!(chat_id_for("alice", "bob"), "alice_bob");
}

#[tokio::test]
async fn both_sides_open_the_same_conversation() {
    let app = test_app();
    let alice = app.signup("Alice", "alice@example.com").await;
    let bob = app.signup("Bob Okello", "bob@example.com").await;

    let from_alice = body_json(
        app.get(&format!("/api/chats/open?recipientId={}", bob.id), Some(&alice.token))
            .await,
    )
    .await;
    let from_bob = body_json(
        app.get(&format!("/api/chats/open?recipientId={}", alice.id), Some(&bob.token))
            .await,
    )
    .await;
    assert_eq!(from_alice["chatId"], from_bob["chatId"]);
    assert_eq!(from_alice["recipientName"], "Bob Okello");
    assert_eq!(from_alice["chatId"], chat_id_for(&alice.id, &bob.id));
}

#[tokio::test]
async fn open_chat_rejects_bad_input() {
    let app = test_app();
    let alice = app.signup("Alice", "alice@example.com").await;
    let bob = app.signup("Bob", "bob@example.com").await;

    let response = app.get("/api/chats/open", Some(&alice.token)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Missing recipient ID in URL.");

    let response = app
        .get(&format!("/api/chats/open?recipientId={}", alice.id), Some(&alice.token))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .get(
            &format!("/api/chats/open?recipientId={}&chatId=someone_else", bob.id),
            Some(&alice.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let html = body_text(app.page("/chat", Some(&alice.token)).await).await;
    assert!(html.contains("Missing recipient ID in URL."));
}

#[tokio::test]
async fn messages_update_inbox_preview_and_unread_state() {
    let app = test_app();
    let alice = app.signup("Alice", "alice@example.com").await;
    let bob = app.signup("Bob", "bob@example.com").await;
    let chat_id = chat_id_for(&alice.id, &bob.id);

    app.get(&format!("/api/chats/open?recipientId={}", bob.id), Some(&alice.token))
        .await;

    let inbox = body_json(app.get("/api/inbox", Some(&alice.token)).await).await;
    assert_eq!(inbox[0]["preview"], "No messages yet");
    assert_eq!(inbox[0]["unread"], false);

    let response = app
        .json(
            "POST",
            &format!("/api/chats/{}/messages", chat_id),
            Some(&alice.token),
            json!({ "text": "  Hello Bob  " }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let sent = body_json(response).await;
    assert_eq!(sent["text"], "Hello Bob");
    assert_eq!(sent["sent"], true);

    let response = app
        .json(
            "POST",
            &format!("/api/chats/{}/messages", chat_id),
            Some(&alice.token),
            json!({ "text": "   " }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let alice_inbox = body_json(app.get("/api/inbox", Some(&alice.token)).await).await;
    assert_eq!(alice_inbox[0]["preview"], "You: Hello Bob");
    assert_eq!(alice_inbox[0]["unread"], false);

    let bob_inbox = body_json(app.get("/api/inbox", Some(&bob.token)).await).await;
    assert_eq!(bob_inbox[0]["preview"], "Hello Bob");
    assert_eq!(bob_inbox[0]["unread"], true);
    assert_eq!(bob_inbox[0]["recipientName"], "Alice");

    let html = body_text(app.page("/inbox", Some(&bob.token)).await).await;
    assert!(html.contains("conversation-item unread"));

    // Opening the conversation marks it read.
    let messages = body_json(
        app.get(&format!("/api/chats/open?recipientId={}", alice.id), Some(&bob.token))
            .await,
    )
    .await;
    assert_eq!(messages["messages"][0]["sent"], false);
    let bob_inbox = body_json(app.get("/api/inbox", Some(&bob.token)).await).await;
    assert_eq!(bob_inbox[0]["unread"], false);
}

#[tokio::test]
async fn live_message_in_an_open_chat_is_marked_read() {
    let app = test_app();
    let alice = app.signup("Alice", "alice@example.com").await;
    let bob = app.signup("Bob", "bob@example.com").await;
    let chat_id = chat_id_for(&alice.id, &bob.id);

    let html = body_text(app.page(&format!("/chat?recipientId={}", bob.id), Some(&alice.token)).await).await;
    let read_url = format!("/api/chats/{}/read", chat_id);
    assert!(html.contains(&format!(r#"data-read-url="{}""#, read_url)));

    let response = app
        .json(
            "POST",
            &format!("/api/chats/{}/messages", chat_id),
            Some(&bob.token),
            json!({ "text": "Are you free tomorrow?" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let inbox = body_json(app.get("/api/inbox", Some(&alice.token)).await).await;
    assert_eq!(inbox[0]["unread"], true);

    // What the chat page script does when the message arrives over SSE.
    let response = app.page_post(&read_url, &alice.token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let inbox = body_json(app.get("/api/inbox", Some(&alice.token)).await).await;
    assert_eq!(inbox[0]["unread"], false);
    assert_eq!(inbox[0]["preview"], "Are you free tomorrow?");
}

#[tokio::test]
async fn outsiders_cannot_post_into_a_conversation() {
    let app = test_app();
    let alice = app.signup("Alice", "alice@example.com").await;
    let bob = app.signup("Bob", "bob@example.com").await;
    let eve = app.signup("Eve", "eve@example.com").await;
    app.get(&format!("/api/chats/open?recipientId={}", bob.id), Some(&alice.token))
        .await;

    let response = app
        .json(
            "POST",
            &format!("/api/chats/{}/messages", chat_id_for(&alice.id, &bob.id)),
            Some(&eve.token),
            json!({ "text": "hi" }),
        )
        .await;
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn event_stream_releases_its_subscription_when_dropped() {
    let app = test_app();
    let alice = app.signup("Alice", "alice@example.com").await;
    let bob = app.signup("Bob", "bob@example.com").await;
    let chat_id = chat_id_for(&alice.id, &bob.id);
    app.get(&format!("/api/chats/open?recipientId={}", bob.id), Some(&alice.token))
        .await;

    let response = app
        .get(&format!("/api/chats/{}/events", chat_id), Some(&alice.token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));
    assert_eq!(app.state.hub.open_topics(), 1);

    drop(response);
    assert_eq!(app.state.hub.open_topics(), 0);
}

#[tokio::test]
async fn subscribers_see_new_messages() {
    let app = test_app();
    let alice = app.signup("Alice", "alice@example.com").await;
    let bob = app.signup("Bob", "bob@example.com").await;
    let chat_id = chat_id_for(&alice.id, &bob.id);
    app.get(&format!("/api/chats/open?recipientId={}", bob.id), Some(&alice.token))
        .await;

    let mut chat = app.state.chat_service.subscribe_chat(&bob.id, &chat_id).await.unwrap();
    let mut inbox = app.state.chat_service.subscribe_inbox(&bob.id);
    app.state
        .chat_service
        .send_message(&alice.id, &chat_id, "ping")
        .await
        .unwrap();

    let event = serde_json::to_value(chat.recv().await.unwrap()).unwrap();
    assert_eq!(event["type"], "message");
    assert_eq!(event["message"]["text"], "ping");
    let event = serde_json::to_value(inbox.recv().await.unwrap()).unwrap();
    assert_eq!(event["type"], "chat_updated");
    assert_eq!(event["last_message"], "ping");
}
