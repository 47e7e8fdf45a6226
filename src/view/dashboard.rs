use crate::model::listing::ServiceListing;
use crate::model::user::User;
use crate::util::html::{encode_query, escape, format_price};
use crate::view::layout::{page, Viewer};

pub struct DashboardView<'a> {
    pub viewer: &'a Viewer,
    pub user: &'a User,
    /// Newest first.
    pub listings: &'a [ServiceListing],
}

fn listing_row(listing: &ServiceListing) -> String {
    format!(
        r#"<div class="dashboard-row">
<a href="/service?id={query_id}" class="truncate">{title}</a>
<span class="text-light">{price}</span>
<button type="button" class="link text-error-color" data-delete="/api/services/{id}">Delete</button>
</div>"#,
        query_id = encode_query(&listing.id),
        id = escape(&listing.id),
        title = escape(&listing.title),
        price = escape(&format_price(listing.price)),
    )
}

pub fn render(view: &DashboardView<'_>) -> String {
    let user = view.user;
    let services = if view.listings.is_empty() {
        r#"<p class="text-light">You have not listed any services yet.</p>"#.to_string()
    } else {
        view.listings.iter().map(listing_row).collect::<Vec<_>>().join("\n")
    };
    let verify = if user.email_verified {
        String::new()
    } else {
        r#"<form method="post" action="/api/auth/resend-verification" data-json class="notice">
<p>Your email address is not verified yet.</p>
<button type="submit" class="btn btn-secondary">Resend verification email</button>
</form>"#
            .to_string()
    };

    let body = format!(
        r#"<div class="text-center">
<h1>Welcome, {first_name}!</h1>
</div>
{verify}
<div class="responsive-grid">
<div>
<div class="card">
<h2>Add a New Service</h2>
<form id="add-service-form" method="post" action="/api/services" enctype="multipart/form-data" data-multipart>
<div class="form-group"><input type="text" name="title" placeholder="Service Title" required></div>
<div class="form-group"><textarea name="description" placeholder="Detailed service description..." required></textarea></div>
<div class="form-group"><input type="text" name="price" inputmode="numeric" placeholder="Price in UGX (leave empty for Contact for Quote)"></div>
<div class="form-group">
<label for="service-image-file">Service Image</label>
<input type="file" id="service-image-file" name="image" accept="image/*" required>
</div>
<button type="submit" class="btn btn-primary w-full">Add Service</button>
</form>
</div>
<div class="card">
<h2>My Services</h2>
<div id="user-services-list">
{services}
</div>
</div>
</div>
<div>
<div class="card">
<h2>My Profile</h2>
<form id="update-profile-form" method="post" action="/api/me/profile" data-json data-method="PUT">
<div class="form-group"><input type="text" name="name" value="{name}" required></div>
<div class="form-group"><textarea name="bio" placeholder="A short bio...">{bio}</textarea></div>
<div class="form-group"><input type="text" name="whatsapp" value="{whatsapp}" placeholder="WhatsApp number"></div>
<button type="submit" class="btn btn-secondary w-full">Update Profile</button>
</form>
<form method="post" action="/api/me/photo" enctype="multipart/form-data" data-multipart>
<div class="form-group"><label for="profile-photo">Profile Photo</label>
<input type="file" id="profile-photo" name="photo" accept="image/*" required></div>
<button type="submit" class="btn btn-secondary w-full">Upload Photo</button>
</form>
</div>
<div class="card">
<h2>Account</h2>
<p>Current Plan: <span class="plan-name">{plan}</span></p>
<a href="/upgrade" class="btn btn-accent w-full">Upgrade Plan</a>
<a href="/profile?id={profile_id}" class="btn btn-secondary w-full">View Public Profile</a>
<form method="post" action="/logout"><button type="submit" class="btn btn-secondary w-full">Logout</button></form>
</div>
</div>
</div>"#,
        first_name = escape(user.first_name()),
        name = escape(&user.name),
        bio = escape(&user.bio),
        whatsapp = escape(user.whatsapp.as_deref().unwrap_or_default()),
        plan = user.effective_plan().display_name(),
        profile_id = encode_query(&user.id),
    );
    page("Dashboard", Some(view.viewer), &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::user::Role;
    use chrono::Utc;

    fn user() -> User {
        User {
            id: "u1".into(),
            name: "Amina Nabirye".into(),
            email: "amina@example.com".into(),
            password_hash: String::new(),
            role: Role::User,
            plan: None,
            bio: "<i>hi</i>".into(),
            profile_photo_url: String::new(),
            whatsapp: None,
            email_verified: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn greets_by_first_name_and_shows_spark() {
        let user = user();
        let viewer = Viewer {
            user_id: user.id.clone(),
            name: user.name.clone(),
            is_admin: false,
        };
        let html = render(&DashboardView {
            viewer: &viewer,
            user: &user,
            listings: &[],
        });
        assert!(html.contains("Welcome, Amina!"));
        assert!(html.contains("Spark"));
        assert!(html.contains("You have not listed any services yet."));
        assert!(html.contains("&lt;i&gt;hi&lt;/i&gt;"));
    }
}
