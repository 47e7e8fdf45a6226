use crate::dto::review_dto::ReviewView;
use crate::model::listing::ServiceListing;
use crate::model::question::Question;
use crate::util::html::{encode_query, escape, escape_multiline, format_price};
use crate::util::image_url::{transformed_url, ImageKind};
use crate::view::layout::{page, Viewer};

pub struct ServicePageView<'a> {
    pub viewer: Option<&'a Viewer>,
    pub listing: &'a ServiceListing,
    pub provider_reviews: &'a [ReviewView],
    pub questions: &'a [Question],
}

pub(crate) fn review_item(review: &ReviewView) -> String {
    let text = if review.text.trim().is_empty() {
        String::new()
    } else {
        format!("<p>{}</p>", escape_multiline(&review.text))
    };
    format!(
        r#"<div class="review">
<p><strong>{name}</strong> <span class="stars">{stars}</span></p>
{text}
<p class="text-light">{date}</p>
</div>"#,
        name = escape(&review.reviewer_name),
        stars = review.stars,
        date = review.timestamp.format("%d/%m/%Y"),
    )
}

fn question_item(question: &Question, can_answer: bool) -> String {
    let answer = match &question.answer {
        Some(answer) => format!(r#"<p class="answer"><strong>A:</strong> {}</p>"#, escape_multiline(answer)),
        None if can_answer => format!(
            r#"<form method="post" action="/api/questions/{id}/answer" class="answer-form" data-json>
<textarea name="answer" required placeholder="Write an answer"></textarea>
<button type="submit" class="btn btn-secondary">Answer</button>
</form>"#,
            id = escape(&question.id)
        ),
        None => r#"<p class="text-light">Not answered yet.</p>"#.to_string(),
    };
    format!(
        r#"<div class="question">
<p><strong>Q:</strong> {text} <span class="text-light">by {asker}</span></p>
{answer}
</div>"#,
        text = escape_multiline(&question.question),
        asker = escape(&question.asker_name),
    )
}

pub fn render(view: &ServicePageView<'_>) -> String {
    let listing = view.listing;
    let is_owner = view.viewer.is_some_and(|v| v.is(&listing.provider_id));
    let can_answer = is_owner || view.viewer.is_some_and(|v| v.is_admin);

    let contact = match view.viewer {
        Some(_) if is_owner => {
            r#"<a href="/dashboard" class="btn btn-secondary">Manage in Dashboard</a>"#.to_string()
        }
        Some(_) => format!(
            r#"<a href="/chat?recipientId={}" class="btn btn-primary">Contact Provider</a>"#,
            encode_query(&listing.provider_id)
        ),
        None => r#"<a href="/login" class="btn btn-primary">Login to Contact</a>"#.to_string(),
    };

    let reviews = if view.provider_reviews.is_empty() {
        r#"<p class="text-light">No reviews yet for this provider.</p>"#.to_string()
    } else {
        view.provider_reviews.iter().map(review_item).collect::<Vec<_>>().join("\n")
    };

    let mut questions = view
        .questions
        .iter()
        .map(|q| question_item(q, can_answer))
        .collect::<Vec<_>>()
        .join("\n");
    if questions.is_empty() {
        questions = r#"<p class="text-light">No questions yet.</p>"#.to_string();
    }
    let ask = match view.viewer {
        Some(_) if !is_owner => format!(
            r#"<form method="post" action="/api/services/{id}/questions" class="ask-form" data-json>
<textarea name="question" required placeholder="Ask the provider a question"></textarea>
<button type="submit" class="btn btn-primary">Ask</button>
</form>"#,
            id = escape(&listing.id)
        ),
        Some(_) => String::new(),
        None => r#"<p><a href="/login">Log in</a> to ask a question.</p>"#.to_string(),
    };

    let body = format!(
        r#"<article id="service-detail" class="service-detail">
<img src="{img}" alt="{title}" class="detail-image">
<div class="detail-body">
<h1>{title}</h1>
<p class="card-price">{price}</p>
<p>Offered by <a href="/profile?id={provider_id}">{provider}</a></p>
<div class="description">{description}</div>
{contact}
</div>
</article>
<section>
<h2>Questions &amp; Answers</h2>
{questions}
{ask}
</section>
<section>
<h2>Provider Reviews</h2>
{reviews}
</section>"#,
        img = escape(&transformed_url(&listing.image_url, ImageKind::Full)),
        title = escape(&listing.title),
        price = escape(&format_price(listing.price)),
        provider_id = encode_query(&listing.provider_id),
        provider = escape(&listing.provider_name),
        description = escape_multiline(&listing.description),
    );
    page(&listing.title, view.viewer, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn listing() -> ServiceListing {
        ServiceListing {
            id: "s1".into(),
            title: "Tailoring <fast>".into(),
            description: "Line one\nLine two".into(),
            price: None,
            image_url: String::new(),
            provider_id: "owner".into(),
            provider_name: "Grace".into(),
            is_featured: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn anonymous_visitor_is_asked_to_log_in() {
        let listing = listing();
        let html = render(&ServicePageView {
            viewer: None,
            listing: &listing,
            provider_reviews: &[],
            questions: &[],
        });
        assert!(html.contains("Login to Contact"));
        assert!(html.contains("Contact for Quote"));
        assert!(html.contains("No reviews yet for this provider."));
        assert!(html.contains("Line one<br>Line two"));
        assert!(html.contains("Tailoring &lt;fast&gt;"));
    }

    #[test]
    fn other_user_can_contact_provider() {
        let listing = listing();
        let viewer = Viewer {
            user_id: "buyer".into(),
            name: "Buyer".into(),
            is_admin: false,
        };
        let html = render(&ServicePageView {
            viewer: Some(&viewer),
            listing: &listing,
            provider_reviews: &[],
            questions: &[],
        });
        assert!(html.contains("/chat?recipientId=owner"));
        assert!(html.contains("Contact Provider"));
    }
}
