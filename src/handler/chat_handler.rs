use axum::{
    extract::{Extension, Json, Path, Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use validator::Validate;

use crate::app::state::AppState;
use crate::dto::auth_dto::MessageResponse;
use crate::dto::chat_dto::{MessageView, OpenChatQuery, SendMessageRequest};
use crate::util::error::HandlerError;
use crate::util::jwt::Claims;
use crate::util::realtime::Subscription;

const HEARTBEAT: Duration = Duration::from_secs(15);

/// Turn a hub subscription into SSE frames. The subscription lives inside the
/// stream, so it is released as soon as the client goes away.
fn event_stream(mut subscription: Subscription) -> impl Stream<Item = Result<Event, Infallible>> {
    async_stream::stream! {
        loop {
            match subscription.recv().await {
                Ok(event) => match Event::default().event(event.name()).json_data(&event) {
                    Ok(frame) => yield Ok(frame),
                    Err(e) => warn!("Failed to serialise realtime event: {}", e),
                },
                Err(RecvError::Lagged(skipped)) => {
                    warn!(topic = ?subscription.topic(), skipped, "SSE client lagged");
                    yield Ok(Event::default().event("lagged").data(skipped.to_string()));
                }
                Err(RecvError::Closed) => break,
            }
        }
    }
}

fn sse(subscription: Subscription) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    Sse::new(event_stream(subscription)).keep_alive(KeepAlive::new().interval(HEARTBEAT).text("heartbeat"))
}

// GET /api/chats/open?recipientId=...&chatId=...
pub async fn open_chat_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<OpenChatQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let view = state
        .chat_service
        .open_chat(claims.user_id(), query.recipient_id.as_deref(), query.chat_id.as_deref())
        .await?;
    Ok(Json(view))
}

pub async fn list_messages_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(chat_id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let messages = state.chat_service.messages(claims.user_id(), &chat_id).await?;
    Ok(Json(messages))
}

pub async fn send_message_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(chat_id): Path<String>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate()?;
    let message = state
        .chat_service
        .send_message(claims.user_id(), &chat_id, &payload.text)
        .await?;
    Ok((StatusCode::CREATED, Json(MessageView::for_viewer(&message, claims.user_id()))))
}

pub async fn mark_read_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(chat_id): Path<String>,
) -> impl IntoResponse {
    state.chat_service.mark_read(claims.user_id(), &chat_id).await;
    Json(MessageResponse::new("ok"))
}

pub async fn inbox_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, HandlerError> {
    let conversations = state.chat_service.conversations(claims.user_id()).await?;
    Ok(Json(conversations))
}

/// `GET /api/chats/{id}/events`: new messages of one conversation.
pub async fn chat_events_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(chat_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, HandlerError> {
    let subscription = state.chat_service.subscribe_chat(claims.user_id(), &chat_id).await?;
    info!(chat_id = %chat_id, user_id = %claims.user_id(), "Chat SSE client connected");
    Ok(sse(subscription))
}

/// `GET /api/inbox/events`: summary changes of the caller's conversations.
pub async fn inbox_events_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscription = state.chat_service.subscribe_inbox(claims.user_id());
    info!(user_id = %claims.user_id(), "Inbox SSE client connected");
    sse(subscription)
}
