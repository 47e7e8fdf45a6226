use crate::dto::request_dto::RequestBoard;
use crate::model::service_request::ServiceRequest;
use crate::util::html::{escape, escape_multiline};
use crate::view::layout::{page, Viewer};

fn request_item(request: &ServiceRequest) -> String {
    format!(
        r#"<div class="request-card">
<h3>{title}</h3>
<p>{description}</p>
<p class="text-light">Posted by {requester} on {date}</p>
</div>"#,
        title = escape(&request.title),
        description = escape_multiline(&request.description),
        requester = escape(&request.requester_name),
        date = request.created_at.format("%d/%m/%Y"),
    )
}

pub fn render(viewer: Option<&Viewer>, board: &RequestBoard) -> String {
    let form = if viewer.is_some() {
        r#"<form id="request-form" method="post" action="/api/requests" data-json class="card">
<div class="form-group"><input type="text" name="title" placeholder="What service do you need?" required></div>
<div class="form-group"><textarea name="description" placeholder="Describe what you are looking for..." required></textarea></div>
<div class="form-group"><label for="ttl">Keep open for (days, optional)</label>
<input type="number" id="ttl" name="ttlDays" min="1" max="30" data-number></div>
<button type="submit" class="btn btn-primary">Post Request</button>
</form>"#
    } else {
        r#"<p class="text-center">You must be <a href="/login" class="font-bold">logged in</a> to post a request.</p>"#
    };
    let list = match board.empty_message() {
        Some(message) => format!(r#"<p class="text-light text-center p-8">{message}</p>"#),
        None => board.recent.iter().map(request_item).collect::<Vec<_>>().join("\n"),
    };
    let body = format!(
        r#"<h1>Service Requests</h1>
<p>Can't find what you need? Post a request and let providers reach out.</p>
{form}
<section>
<h2>Recent Requests</h2>
<div id="requests-list">
{list}
</div>
</section>"#
    );
    page("Service Requests", viewer, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn shows_poster_and_date() {
        let board = RequestBoard {
            total: 1,
            recent: vec![ServiceRequest {
                id: "r1".into(),
                title: "Need a plumber".into(),
                description: "Leaking tap".into(),
                requester_id: "u1".into(),
                requester_name: "Peter".into(),
                created_at: Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap(),
                expires_at: None,
            }],
        };
        let html = render(None, &board);
        assert!(html.contains("Posted by Peter on 05/03/2024"));
        assert!(html.contains("logged in</a> to post a request."));
    }

    #[test]
    fn empty_board_messages() {
        let empty = RequestBoard { total: 0, recent: vec![] };
        assert!(render(None, &empty).contains("Be the first to request a service!"));
        let stale = RequestBoard { total: 3, recent: vec![] };
        assert!(render(None, &stale).contains("There are no recent service requests."));
    }
}
