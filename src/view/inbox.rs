use crate::dto::chat_dto::ConversationSummary;
use crate::util::html::{encode_query, escape};
use crate::view::layout::{page, Viewer};

fn conversation_item(summary: &ConversationSummary) -> String {
    let href = match &summary.recipient_id {
        Some(recipient) => format!(
            "/chat?chatId={}&recipientId={}",
            encode_query(&summary.chat_id),
            encode_query(recipient)
        ),
        None => format!("/chat?chatId={}", encode_query(&summary.chat_id)),
    };
    let (class, dot) = if summary.unread {
        ("conversation-item unread", r#"<span class="unread-dot"></span>"#)
    } else {
        ("conversation-item", "")
    };
    format!(
        r#"<a href="{href}" class="{class}">
<div class="conversation-head"><span class="font-bold">{name}</span>{dot}</div>
<p class="last-message">{preview}</p>
</a>"#,
        href = escape(&href),
        name = escape(&summary.recipient_name),
        preview = escape(&summary.preview),
    )
}

pub fn render(viewer: &Viewer, conversations: &[ConversationSummary]) -> String {
    let list = if conversations.is_empty() {
        r#"<p class="text-center text-light p-8">You have no conversations yet.</p>"#.to_string()
    } else {
        conversations.iter().map(conversation_item).collect::<Vec<_>>().join("\n")
    };
    let body = format!(
        r#"<h1>Inbox</h1>
<div id="conversation-list" data-inbox-events="/api/inbox/events">
{list}
</div>"#
    );
    page("Inbox", Some(viewer), &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unread_conversation_is_marked() {
        let viewer = Viewer {
            user_id: "a".into(),
            name: "A".into(),
            is_admin: false,
        };
        let summaries = vec![ConversationSummary {
            chat_id: "a_b".into(),
            recipient_id: Some("b".into()),
            recipient_name: "Bob".into(),
            preview: "hello".into(),
            unread: true,
            last_updated: None,
        }];
        let html = render(&viewer, &summaries);
        assert!(html.contains(r#"class="conversation-item unread""#));
        assert!(html.contains("/chat?chatId=a_b&amp;recipientId=b"));
    }

    #[test]
    fn empty_inbox() {
        let viewer = Viewer {
            user_id: "a".into(),
            name: "A".into(),
            is_admin: false,
        };
        assert!(render(&viewer, &[]).contains("You have no conversations yet."));
    }
}
