use crate::dto::chat_dto::{ChatView, MessageView};
use crate::util::html::{encode_query, escape};
use crate::view::layout::{page, Viewer};

fn message_bubble(message: &MessageView) -> String {
    let class = if message.sent { "message sent" } else { "message received" };
    format!(
        r#"<div class="{class}" data-message-id="{id}">{text}</div>"#,
        id = escape(&message.id),
        text = escape(&message.text),
    )
}

fn review_section(chat: &ChatView) -> String {
    if chat.already_reviewed {
        return r#"<button type="button" class="btn btn-secondary" disabled>You Have Already Reviewed</button>"#
            .to_string();
    }
    let stars = (1..=5)
        .rev()
        .map(|n| format!(r#"<option value="{n}">{}</option>"#, "★".repeat(n)))
        .collect::<String>();
    format!(
        r#"<details class="review-modal">
<summary class="btn btn-secondary">Leave a Review</summary>
<form method="post" action="/api/users/{id}/reviews" data-json>
<p>How was your experience with <strong>{name}</strong>?</p>
<select name="rating" data-number required><option value="">Select a rating</option>{stars}</select>
<textarea name="text" placeholder="Share a few words (optional)"></textarea>
<button type="submit" class="btn btn-primary">Submit Review</button>
</form>
</details>"#,
        id = escape(&chat.recipient_id),
        name = escape(&chat.recipient_name),
    )
}

pub fn render(viewer: &Viewer, chat: &ChatView) -> String {
    let messages = chat.messages.iter().map(message_bubble).collect::<Vec<_>>().join("\n");
    let body = format!(
        r#"<div class="chat-header">
<h1 id="chat-recipient-name"><a href="/profile?id={profile_id}">{name}</a></h1>
{review}
</div>
<div id="chat-messages" class="chat-messages" data-chat-events="/api/chats/{chat_id}/events" data-read-url="/api/chats/{chat_id}/read" data-viewer="{viewer_id}">
{messages}
</div>
<form id="message-form" method="post" action="/api/chats/{chat_id}/messages" data-json data-stay class="message-form">
<input type="text" name="text" placeholder="Type a message..." autocomplete="off" required>
<button type="submit" class="btn btn-primary">Send</button>
</form>"#,
        profile_id = encode_query(&chat.recipient_id),
        name = escape(&chat.recipient_name),
        review = review_section(chat),
        chat_id = escape(&chat.chat_id),
        viewer_id = escape(&viewer.user_id),
    );
    page(&format!("Chat with {}", chat.recipient_name), Some(viewer), &body)
}

/// Chat page when the conversation could not be opened.
pub fn error(viewer: &Viewer, message: &str) -> String {
    let body = format!(
        r#"<div class="chat-header"><h1 id="chat-recipient-name">Error</h1></div>
<div id="chat-messages" class="chat-messages">
<p class="text-center text-error-color p-8">{}</p>
</div>"#,
        escape(message)
    );
    page("Chat", Some(viewer), &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn viewer() -> Viewer {
        Viewer {
            user_id: "a".into(),
            name: "Alice".into(),
            is_admin: false,
        }
    }

    fn chat(already_reviewed: bool) -> ChatView {
        ChatView {
            chat_id: "a_b".into(),
            recipient_id: "b".into(),
            recipient_name: "Bob".into(),
            messages: vec![
                MessageView {
                    id: "m1".into(),
                    sender_id: "a".into(),
                    text: "hi <there>".into(),
                    timestamp: Utc::now(),
                    sent: true,
                },
                MessageView {
                    id: "m2".into(),
                    sender_id: "b".into(),
                    text: "hello".into(),
                    timestamp: Utc::now(),
                    sent: false,
                },
            ],
            already_reviewed,
        }
    }

    #[test]
    fn messages_are_marked_by_direction() {
        let html = render(&viewer(), &chat(false));
        assert!(html.contains(r#"<div class="message sent" data-message-id="m1">hi &lt;there&gt;</div>"#));
        assert!(html.contains(r#"class="message received""#));
        assert!(html.contains("Leave a Review"));
    }

    #[test]
    fn live_messages_know_where_to_mark_read() {
        let html = render(&viewer(), &chat(false));
        let id = chat(false).chat_id;
        assert!(html.contains(&format!(r#"data-read-url="/api/chats/{id}/read""#)));
        assert!(html.contains(&format!(r#"data-chat-events="/api/chats/{id}/events""#)));
    }

    #[test]
    fn review_button_disabled_once_reviewed() {
        let html = render(&viewer(), &chat(true));
        assert!(html.contains("You Have Already Reviewed"));
        assert!(!html.contains("Leave a Review"));
    }

    #[test]
    fn error_page_shows_reason() {
        let html = error(&viewer(), "Missing recipient ID in URL.");
        assert!(html.contains("Missing recipient ID in URL."));
    }
}
