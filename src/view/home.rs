use crate::model::listing::ServiceListing;
use crate::util::html::{encode_query, escape, format_price};
use crate::util::image_url::{transformed_url, ImageKind};
use crate::view::layout::{page, Viewer};

pub const FEATURED_BG_COLORS: [&str; 6] = ["#fde2e4", "#cdeffd", "#d4f8e8", "#fff5ba", "#e0c3fc", "#ffc6ff"];
pub const FEATURED_FONT_STYLES: [&str; 6] = ["normal", "italic", "normal", "italic", "normal", "italic"];
const FEATURED_TEXT_COLOR: &str = "#333";

pub struct HomeView<'a> {
    pub viewer: Option<&'a Viewer>,
    /// Already limited and ordered.
    pub featured: &'a [ServiceListing],
}

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

fn featured_card(index: usize, listing: &ServiceListing) -> String {
    let bg = FEATURED_BG_COLORS[index % FEATURED_BG_COLORS.len()];
    let font_style = FEATURED_FONT_STYLES[index % FEATURED_FONT_STYLES.len()];
    format!(
        r#"<a href="/service?id={id}" class="featured-service-card">
<img src="{img}" alt="{alt}" class="featured-image">
<div class="featured-body" style="background-color: {bg}; color: {fg}; font-style: {font_style};">
<h3>{title}</h3>
<p>By {provider}</p>
<p class="card-price">{price}</p>
<span class="featured-link">View Service</span>
</div>
</a>"#,
        id = encode_query(&listing.id),
        img = escape(&transformed_url(&listing.image_url, ImageKind::Full)),
        alt = escape(or_default(&listing.title, "Service")),
        fg = FEATURED_TEXT_COLOR,
        title = escape(or_default(&listing.title, "No Title")),
        provider = escape(or_default(&listing.provider_name, "Unknown")),
        price = escape(&format_price(listing.price)),
    )
}

pub fn render(view: &HomeView<'_>) -> String {
    let featured = if view.featured.is_empty() {
        r#"<p class="text-center">No featured services available right now.</p>"#.to_string()
    } else {
        view.featured
            .iter()
            .enumerate()
            .map(|(i, listing)| featured_card(i, listing))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let body = format!(
        r#"<section class="hero text-center">
<h1>Find trusted local services in Kabale</h1>
<p>Plumbers, tutors, tailors, mechanics and more, all in one place.</p>
<a href="/browse" class="btn btn-primary">Browse Services</a>
<a href="/requests" class="btn btn-secondary">Request a Service</a>
</section>
<section>
<h2 class="text-center">Featured Services</h2>
<div id="featured-services" class="featured-grid">
{featured}
</div>
</section>"#
    );
    page("Home", view.viewer, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn listing(i: usize, price: Option<i64>) -> ServiceListing {
        ServiceListing {
            id: format!("s{i}"),
            title: format!("Service {i}"),
            description: "desc".into(),
            price,
            image_url: String::new(),
            provider_id: "p".into(),
            provider_name: "Provider".into(),
            is_featured: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn cards_cycle_colors_and_alternate_italics() {
        let listings: Vec<_> = (0..3).map(|i| listing(i, Some(15000))).collect();
        let html = render(&HomeView {
            viewer: None,
            featured: &listings,
        });
        assert!(html.contains("background-color: #fde2e4; color: #333; font-style: normal;"));
        assert!(html.contains("background-color: #cdeffd; color: #333; font-style: italic;"));
        assert!(html.contains("UGX 15,000"));
    }

    #[test]
    fn empty_state() {
        let html = render(&HomeView {
            viewer: None,
            featured: &[],
        });
        assert!(html.contains("No featured services available right now."));
    }
}
