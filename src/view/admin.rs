use crate::dto::admin_dto::AdminOverview;
use crate::model::user::Plan;
use crate::util::html::{encode_query, escape};
use crate::view::layout::{message_page, page, Viewer};

pub const ACCESS_DENIED_MESSAGE: &str = "Access Denied. You must be an administrator to view this page.";

fn fallback<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.trim().is_empty() {
        default
    } else {
        value
    }
}

pub fn anonymous() -> String {
    page(
        "Admin",
        None,
        r#"<p class="text-center p-8">Please <a href="/login">log in</a> as an administrator to view this page.</p>"#,
    )
}

pub fn denied(viewer: &Viewer) -> String {
    message_page("Admin", Some(viewer), ACCESS_DENIED_MESSAGE)
}

pub fn render(viewer: &Viewer, overview: &AdminOverview) -> String {
    let service_rows = overview
        .listings
        .iter()
        .map(|listing| {
            format!(
                r#"<tr>
<td><a href="/service?id={query_id}">{title}</a></td>
<td>{provider}</td>
<td><input type="checkbox" data-toggle-featured="/api/admin/services/{id}/featured"{checked}></td>
</tr>"#,
                query_id = encode_query(&listing.id),
                id = escape(&listing.id),
                title = escape(fallback(&listing.title, "No Title")),
                provider = escape(fallback(&listing.provider_name, "Unknown")),
                checked = if listing.is_featured { " checked" } else { "" },
            )
        })
        .collect::<String>();

    let user_rows = overview
        .users
        .iter()
        .map(|user| {
            let options = Plan::ALL
                .iter()
                .map(|plan| {
                    format!(
                        r#"<option value="{value}"{selected}>{label}</option>"#,
                        value = plan.as_str(),
                        selected = if *plan == user.plan { " selected" } else { "" },
                        label = plan.display_name(),
                    )
                })
                .collect::<String>();
            format!(
                r#"<tr>
<td><a href="/profile?id={query_id}">{name}</a></td>
<td>{email}</td>
<td><select data-set-plan="/api/admin/users/{id}/plan">{options}</select></td>
</tr>"#,
                query_id = encode_query(&user.id),
                id = escape(&user.id),
                name = escape(fallback(&user.name, "No Name")),
                email = escape(fallback(&user.email, "No Email")),
            )
        })
        .collect::<String>();

    let body = format!(
        r#"<h1>Admin Panel</h1>
<section>
<h2>Manage Services ({listing_count})</h2>
<table class="admin-table">
<thead><tr><th>Title</th><th>Provider</th><th>Featured</th></tr></thead>
<tbody>{service_rows}</tbody>
</table>
</section>
<section>
<h2>Manage Users ({user_count})</h2>
<table class="admin-table">
<thead><tr><th>Name</th><th>Email</th><th>Plan</th></tr></thead>
<tbody>{user_rows}</tbody>
</table>
</section>"#,
        listing_count = overview.listing_count,
        user_count = overview.user_count,
    );
    page("Admin", Some(viewer), &body)
}
