use crate::model::user::Plan;
use crate::util::html::escape;
use crate::view::layout::{page, Viewer};

pub struct PlanOffer {
    pub plan: Plan,
    pub price: &'static str,
    pub per_month: bool,
    pub features: &'static [&'static str],
}

pub const PLAN_CATALOGUE: [PlanOffer; 3] = [
    PlanOffer {
        plan: Plan::Spark,
        price: "Free",
        per_month: false,
        features: &["List 1 service", "1 photo per service", "Standard search placement"],
    },
    PlanOffer {
        plan: Plan::Pro,
        price: "UGX 15,000",
        per_month: true,
        features: &[
            "List up to 10 services",
            "Up to 5 photos per service",
            "Higher search placement",
            "Profile portfolio link",
        ],
    },
    PlanOffer {
        plan: Plan::Premium,
        price: "UGX 40,000",
        per_month: true,
        features: &[
            "Unlimited service listings",
            "Up to 10 photos per service",
            "Top placement & \"Featured\" tag",
            "Verified Badge on profile",
            "Advanced analytics",
        ],
    },
];

pub fn upgrade_instructions(plan: Plan) -> String {
    format!(
        "To upgrade to the {} plan, please contact us on WhatsApp for manual activation. This will take a few minutes.",
        plan.display_name()
    )
}

fn offer_card(offer: &PlanOffer, current: Option<Plan>) -> String {
    let features = offer
        .features
        .iter()
        .map(|f| format!("<li>{}</li>", escape(f)))
        .collect::<String>();
    let per_month = if offer.per_month { r#"<span class="per-month">/month</span>"# } else { "" };
    let action = if current == Some(offer.plan) {
        r#"<button type="button" class="btn btn-secondary w-full" disabled>Your Current Plan</button>"#.to_string()
    } else {
        format!(
            r#"<details class="upgrade-note"><summary class="btn btn-primary w-full">Upgrade to {name}</summary><p>{note}</p></details>"#,
            name = offer.plan.display_name(),
            note = escape(&upgrade_instructions(offer.plan)),
        )
    };
    format!(
        r#"<div class="plan-card">
<h3>{name}</h3>
<p class="plan-price">{price}{per_month}</p>
<ul>{features}</ul>
{action}
</div>"#,
        name = offer.plan.display_name(),
        price = escape(offer.price),
    )
}

/// `current` is the viewer's plan, `None` for anonymous visitors.
pub fn render(viewer: Option<&Viewer>, current: Option<Plan>) -> String {
    let cards = PLAN_CATALOGUE
        .iter()
        .map(|offer| offer_card(offer, current))
        .collect::<Vec<_>>()
        .join("\n");
    let body = format!(
        r#"<h1 class="text-center">Choose Your Plan</h1>
<p class="text-center">Reach more customers by listing more services.</p>
<div id="pricing-plans" class="pricing-grid">
{cards}
</div>"#
    );
    page("Plans", viewer, &body)
}
