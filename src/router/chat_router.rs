use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::app::state::AppState;
use crate::handler::chat_handler::{
    chat_events_handler, inbox_events_handler, inbox_handler, list_messages_handler, mark_read_handler,
    open_chat_handler, send_message_handler,
};
use crate::middlewares::auth_middleware::require_auth;

// Every chat route needs a logged-in participant.
pub fn chat_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/chats/open", get(open_chat_handler))
        .route(
            "/api/chats/{id}/messages",
            get(list_messages_handler).post(send_message_handler),
        )
        .route("/api/chats/{id}/read", post(mark_read_handler))
        .route("/api/chats/{id}/events", get(chat_events_handler))
        .route("/api/inbox", get(inbox_handler))
        .route("/api/inbox/events", get(inbox_events_handler))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}
