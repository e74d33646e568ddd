use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Responder};
use handlebars::Handlebars;
use log::{error, warn};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::analysis::display_slots;
use crate::analysis::overall::MomMetric;
use crate::core::aggregate::KeyedAmount;
use crate::web::charts::{self, or_notice};
use crate::web::models::{MomPageQuery, NameQuery};
use crate::web::server::AppState;

/// Similar startups and investors are always shown in this many slots
const SIMILAR_SLOTS: usize = 4;

const PARTIALS: [(&str, &str); 2] = [
    ("header", include_str!("../templates/header.hbs")),
    ("footer", include_str!("../templates/footer.hbs")),
];

const TEMPLATES: [(&str, &str); 5] = [
    ("index", include_str!("../templates/index.hbs")),
    ("overall", include_str!("../templates/overall.hbs")),
    ("startup", include_str!("../templates/startup.hbs")),
    ("investor", include_str!("../templates/investor.hbs")),
    ("404", include_str!("../templates/404.hbs")),
];

// Shared handlebars instance
lazy_static::lazy_static! {
    static ref HBS: Arc<Handlebars<'static>> = {
        let mut hbs = Handlebars::new();
        for (name, source) in PARTIALS {
            if let Err(e) = hbs.register_partial(name, source) {
                error!("Error registering Handlebars partial {}: {}", name, e);
            }
        }
        for (name, source) in TEMPLATES {
            if let Err(e) = hbs.register_template_string(name, source) {
                error!("Error registering Handlebars template {}: {}", name, e);
            }
        }
        Arc::new(hbs)
    };
}

/// One of the fixed similar-entity slots; blank slots have no link
#[derive(Serialize)]
struct Slot {
    name: String,
    href: Option<String>,
}

fn slots(page: &str, names: &[String]) -> Vec<Slot> {
    display_slots(names, SIMILAR_SLOTS)
        .into_iter()
        .map(|name| {
            let href = if name.is_empty() {
                None
            } else {
                page_link(page, &name)
            };
            Slot { name, href }
        })
        .collect()
}

fn page_link(page: &str, name: &str) -> Option<String> {
    match serde_urlencoded::to_string([("name", name)]) {
        Ok(query) => Some(format!("{}?{}", page, query)),
        Err(e) => {
            warn!("Cannot build link for '{}': {}", name, e);
            None
        }
    }
}

fn crores(amount: f64) -> String {
    format!("₹ {:.2} Cr", amount)
}

/// Layout fields every page needs, merged with the page's own
fn page_context(data: &AppState, active: &str, page: Value) -> Value {
    let nav: Vec<Value> = data
        .components()
        .iter()
        .map(|component| {
            json!({
                "href": format!("/{}", component.id()),
                "label": component.kind().to_string(),
                "active": component.id() == active,
            })
        })
        .collect();

    let mut context = json!({
        "title": data.config.web.title,
        "nav": nav,
        "version": env!("CARGO_PKG_VERSION"),
    });
    if let (Some(base), Value::Object(extra)) = (context.as_object_mut(), page) {
        base.extend(extra);
    }
    context
}

fn render(template: &str, context: &Value, status: StatusCode) -> HttpResponse {
    match HBS.render(template, context) {
        Ok(body) => HttpResponse::build(status).content_type("text/html").body(body),
        Err(e) => {
            error!("Template rendering error: {}", e);
            HttpResponse::InternalServerError().body(format!("Template error: {}", e))
        }
    }
}

/// Serve the landing page
pub async fn index(data: web::Data<AppState>) -> impl Responder {
    let views: Vec<Value> = data
        .components()
        .iter()
        .map(|component| {
            json!({
                "href": format!("/{}", component.id()),
                "label": component.kind().to_string(),
                "info": component.get_info(),
            })
        })
        .collect();

    let context = page_context(
        &data,
        "index",
        json!({
            "page_title": "Home",
            "summary": data.dataset.summary(),
            "views": views,
        }),
    );
    render("index", &context, StatusCode::OK)
}

/// Serve the overall analysis page
pub async fn overall(data: web::Data<AppState>, query: web::Query<MomPageQuery>) -> impl Responder {
    let overall = &data.overall;
    let metric = query.mom.unwrap_or_default();
    let summary = overall.summary();

    let mom = overall.mom(metric);
    let (mom_title, mom_axis) = match metric {
        MomMetric::Amount => ("Total Funding Month over Month", "Amount (Cr)"),
        MomMetric::Count => ("Funded Startups Month over Month", "Rounds"),
    };
    let labels: Vec<String> = mom.iter().map(|p| p.label.clone()).collect();
    let values: Vec<f64> = mom.iter().map(|p| p.value).collect();

    let leaders = overall.most_funded_startups_yoy();
    let leader_bars: Vec<KeyedAmount> = leaders
        .iter()
        .map(|l| KeyedAmount {
            key: format!("{} {}", l.year, l.startup),
            amount: l.amount,
        })
        .collect();

    let leader_rows: Vec<Value> = leaders
        .iter()
        .map(|l| {
            json!({
                "year": l.year,
                "startup": l.startup,
                "amount": l.amount,
                "href": page_link("/startup", &l.startup),
            })
        })
        .collect();

    let charts = json!({
        "mom": or_notice(charts::line(mom_title, "Month", mom_axis, &labels, &values)),
        "sectors": or_notice(charts::pie("Most Funded Sectors", &overall.most_funded_sectors())),
        "types": or_notice(charts::horizontal_bar(
            "Most Funded Round Types",
            "Amount (Cr)",
            "Round",
            &overall.most_funded_types(),
        )),
        "cities": or_notice(charts::pie("Most Funded Cities", &overall.most_funded_cities())),
        "yoy": or_notice(charts::vertical_bar(
            "Most Funded Startup per Year",
            "Year",
            "Amount (Cr)",
            &leader_bars,
        )),
        "investors": or_notice(charts::horizontal_bar(
            "Top Investors",
            "Amount (Cr)",
            "Investor",
            &overall.top_investors(),
        )),
        "heatmap": or_notice(charts::heatmap(
            "Funding by Year and Month",
            &overall.funding_year_month(),
        )),
    });

    let context = page_context(
        &data,
        "overall",
        json!({
            "page_title": "Overall Analysis",
            "total_invested": format!("₹ {:.0} Cr", summary.total_invested),
            "max_amount_infused": crores(summary.max_amount_infused),
            "avg_ticket_size": crores(summary.avg_ticket_size),
            "total_funded_startups": summary.total_funded_startups,
            "mom_is_count": metric == MomMetric::Count,
            "leaders": leader_rows,
            "charts": charts,
        }),
    );
    render("overall", &context, StatusCode::OK)
}

/// Serve the startup page; details when `?name=` picks a startup
pub async fn startup(data: web::Data<AppState>, query: web::Query<NameQuery>) -> impl Responder {
    let selected = query.selected();
    let mut page = json!({
        "page_title": "Startup",
        "startups": data.startup.list_of_startups(),
        "selected": selected,
    });

    let status = match selected.map(|name| data.startup.profile(name)) {
        None => StatusCode::OK,
        Some(Ok(profile)) => {
            let round_bars: Vec<KeyedAmount> = profile
                .rounds
                .iter()
                .rev()
                .map(|r| KeyedAmount {
                    key: format!("{} {}", r.date, r.round),
                    amount: r.amount,
                })
                .collect();
            page["funding"] = json!(crores(profile.funding));
            page["similar"] = json!(slots("/startup", &profile.similar_startups));
            page["rounds_chart"] = json!(or_notice(charts::vertical_bar(
                "Funding Rounds",
                "Round",
                "Amount (Cr)",
                &round_bars,
            )));
            page["profile"] = json!(profile);
            StatusCode::OK
        }
        Some(Err(e)) => {
            page["missing"] = json!(e.to_string());
            StatusCode::NOT_FOUND
        }
    };

    render("startup", &page_context(&data, "startup", page), status)
}

/// Serve the investor page; details when `?name=` picks an investor
pub async fn investor(data: web::Data<AppState>, query: web::Query<NameQuery>) -> impl Responder {
    let selected = query.selected();
    let mut page = json!({
        "page_title": "Investor",
        "investors": data.investor.investor_list(),
        "selected": selected,
    });

    let profile = selected.map(|name| data.investor.profile(name, &mut rand::thread_rng()));
    let status = match profile {
        None => StatusCode::OK,
        Some(Ok(profile)) => {
            let years: Vec<String> = profile.yoy.iter().map(|y| y.year.to_string()).collect();
            let amounts: Vec<f64> = profile.yoy.iter().map(|y| y.amount).collect();
            page["charts"] = json!({
                "biggest": or_notice(charts::vertical_bar(
                    "Biggest Investments",
                    "Startup",
                    "Amount (Cr)",
                    &profile.biggest_investments,
                )),
                "sectors": or_notice(charts::pie("Sectors Invested In", &profile.sectors)),
                "subsectors": or_notice(charts::pie("Subsectors Invested In", &profile.subsectors)),
                "cities": or_notice(charts::pie("Cities Invested In", &profile.cities)),
                "rounds": or_notice(charts::pie("Rounds Invested In", &profile.rounds)),
                "yoy": or_notice(charts::line(
                    "Year over Year Investment",
                    "Year",
                    "Amount (Cr)",
                    &years,
                    &amounts,
                )),
            });
            page["similar"] = json!(slots("/investor", &profile.similar_investors));
            page["profile"] = json!(profile);
            StatusCode::OK
        }
        Some(Err(e)) => {
            page["missing"] = json!(e.to_string());
            StatusCode::NOT_FOUND
        }
    };

    render("investor", &page_context(&data, "investor", page), status)
}

/// 404 Not Found handler
pub async fn not_found(data: web::Data<AppState>) -> impl Responder {
    let context = page_context(&data, "", json!({ "page_title": "Page Not Found" }));
    render("404", &context, StatusCode::NOT_FOUND)
}
