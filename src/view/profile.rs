use crate::dto::profile_dto::ProfileView;
use crate::dto::review_dto::ReviewView;
use crate::util::html::{encode_query, escape, escape_multiline};
use crate::util::image_url::{transformed_url, ImageKind};
use crate::view::browse::service_card;
use crate::view::layout::{page, Viewer};

pub struct ProfilePageView<'a> {
    pub viewer: Option<&'a Viewer>,
    pub profile: &'a ProfileView,
}

fn review_quote(review: &ReviewView) -> String {
    let reviewer = if review.reviewer_name.trim().is_empty() {
        "Anonymous"
    } else {
        review.reviewer_name.as_str()
    };
    format!(
        r#"<div class="review">
<p class="stars">{stars}</p>
<p class="italic text-light">"{text}"</p>
<p class="text-right text-light">- {reviewer}</p>
</div>"#,
        stars = review.stars,
        text = escape_multiline(&review.text),
        reviewer = escape(reviewer),
    )
}

pub fn render(view: &ProfilePageView<'_>) -> String {
    let user = &view.profile.user;
    let is_owner = view.viewer.is_some_and(|v| v.is(&user.id));

    let bio = if user.bio.trim().is_empty() {
        "This user has not set a bio yet.".to_string()
    } else {
        escape_multiline(&user.bio)
    };
    let actions = match view.viewer {
        Some(_) if is_owner => r#"<a href="/dashboard" class="btn btn-secondary">Edit My Profile</a>"#.to_string(),
        Some(_) => format!(
            r#"<a href="/chat?recipientId={}" class="btn btn-primary">Message</a>"#,
            encode_query(&user.id)
        ),
        None => r#"<a href="/login" class="btn btn-secondary">Login to Message</a>"#.to_string(),
    };
    let whatsapp = match user.whatsapp.as_deref().map(str::trim) {
        Some(number) if !number.is_empty() => {
            format!(r#"<p class="text-light">WhatsApp: {}</p>"#, escape(number))
        }
        _ => String::new(),
    };

    let services = if view.profile.listings.is_empty() {
        r#"<p class="text-light">This provider has not listed any services yet.</p>"#.to_string()
    } else {
        format!(
            r#"<div class="services-grid">{}</div>"#,
            view.profile.listings.iter().map(service_card).collect::<String>()
        )
    };
    let reviews = if view.profile.reviews.is_empty() {
        r#"<p class="text-light">This provider has not received any reviews yet.</p>"#.to_string()
    } else {
        view.profile.reviews.iter().map(review_quote).collect::<Vec<_>>().join("\n")
    };

    let body = format!(
        r#"<section class="text-center profile-header">
<img src="{photo}" alt="{name}" class="avatar">
<h1>{name}</h1>
<p class="text-light">{bio}</p>
{whatsapp}
<div class="actions">{actions}</div>
</section>
<section>
<h2 class="text-center">Services Offered</h2>
{services}
</section>
<section>
<h2 class="text-center">Reviews</h2>
{reviews}
</section>"#,
        photo = escape(&transformed_url(&user.profile_photo_url, ImageKind::Profile)),
        name = escape(&user.name),
    );
    page(&user.name, view.viewer, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::user::{Plan, PublicUser, Role};
    use chrono::Utc;

    fn profile(bio: &str) -> ProfileView {
        ProfileView {
            user: PublicUser {
                id: "u1".into(),
                name: "Grace <Tailor>".into(),
                email: "grace@example.com".into(),
                role: Role::User,
                plan: Plan::Spark,
                bio: bio.into(),
                profile_photo_url: String::new(),
                whatsapp: Some("+256700000000".into()),
                email_verified: true,
                created_at: Utc::now(),
            },
            listings: vec![],
            reviews: vec![],
        }
    }

    #[test]
    fn actions_depend_on_viewer() {
        let profile = profile("");
        let anonymous = render(&ProfilePageView { viewer: None, profile: &profile });
        assert!(anonymous.contains("Login to Message"));
        assert!(anonymous.contains("This user has not set a bio yet."));
        assert!(anonymous.contains("Grace &lt;Tailor&gt;"));
        assert!(anonymous.contains("WhatsApp: +256700000000"));

        let owner = Viewer { user_id: "u1".into(), name: "Grace".into(), is_admin: false };
        let html = render(&ProfilePageView { viewer: Some(&owner), profile: &profile });
        assert!(html.contains("Edit My Profile"));

        let other = Viewer { user_id: "u2".into(), name: "Peter".into(), is_admin: false };
        let html = render(&ProfilePageView { viewer: Some(&other), profile: &profile });
        assert!(html.contains(r#"href="/chat?recipientId=u1""#));
    }

    #[test]
    fn bio_keeps_line_breaks_after_escaping() {
        let profile = profile("Line one\n<b>Line two</b>");
        let html = render(&ProfilePageView { viewer: None, profile: &profile });
        assert!(html.contains("Line one<br>&lt;b&gt;Line two&lt;/b&gt;"));
        assert!(html.contains("This provider has not received any reviews yet."));
    }
}
