use crate::model::listing::ServiceListing;
use crate::util::html::{encode_query, escape, format_price};
use crate::util::image_url::{transformed_url, ImageKind};
use crate::view::layout::{page, Viewer};

pub struct BrowseView<'a> {
    pub viewer: Option<&'a Viewer>,
    pub query: &'a str,
    pub listings: &'a [ServiceListing],
}

/// Grid card shared by browse and profile pages.
pub fn service_card(listing: &ServiceListing) -> String {
    format!(
        r#"<a href="/service?id={id}" class="service-card">
<img src="{img}" alt="{title}" class="card-image">
<div class="card-content">
<h3>{title}</h3>
<p class="text-light">{provider}</p>
<p class="card-price">{price}</p>
</div>
</a>"#,
        id = encode_query(&listing.id),
        img = escape(&transformed_url(&listing.image_url, ImageKind::Thumbnail)),
        title = escape(&listing.title),
        provider = escape(&listing.provider_name),
        price = escape(&format_price(listing.price)),
    )
}

pub fn render(view: &BrowseView<'_>) -> String {
    let results = if view.listings.is_empty() {
        let message = if view.query.trim().is_empty() {
            "No services have been posted yet."
        } else {
            "No services match your search."
        };
        format!(r#"<p class="text-center">{message}</p>"#)
    } else {
        view.listings.iter().map(service_card).collect::<Vec<_>>().join("\n")
    };
    let body = format!(
        r#"<h1>Browse Services</h1>
<form method="get" action="/browse" class="search-form">
<input type="search" name="q" value="{query}" placeholder="Search services, descriptions or providers">
<button type="submit" class="btn btn-primary">Search</button>
</form>
<div id="services-grid" class="services-grid">
{results}
</div>"#,
        query = escape(view.query),
    );
    page("Browse Services", view.viewer, &body)
}
