use actix_web::{web, Responder};

use crate::web::models::{GenericResponse, MomQuery};
use crate::web::server::AppState;

/// Get the four headline metrics
pub async fn get_summary(data: web::Data<AppState>) -> impl Responder {
    GenericResponse::ok("Overall summary", data.overall.summary())
}

/// Get a month-over-month series, funding amount unless `?metric=count`
pub async fn get_mom(data: web::Data<AppState>, query: web::Query<MomQuery>) -> impl Responder {
    let metric = query.metric.unwrap_or_default();
    GenericResponse::ok("Month-over-month series", data.overall.mom(metric))
}

pub async fn get_sectors(data: web::Data<AppState>) -> impl Responder {
    GenericResponse::ok("Most funded sectors", data.overall.most_funded_sectors())
}

pub async fn get_types(data: web::Data<AppState>) -> impl Responder {
    GenericResponse::ok("Most funded round types", data.overall.most_funded_types())
}

pub async fn get_cities(data: web::Data<AppState>) -> impl Responder {
    GenericResponse::ok("Most funded cities", data.overall.most_funded_cities())
}

pub async fn get_investors(data: web::Data<AppState>) -> impl Responder {
    GenericResponse::ok("Top investors", data.overall.top_investors())
}

/// Get the most funded startup of each year
pub async fn get_yoy(data: web::Data<AppState>) -> impl Responder {
    GenericResponse::ok("Most funded startup per year", data.overall.most_funded_startups_yoy())
}

/// Get the year x month funding pivot
pub async fn get_heatmap(data: web::Data<AppState>) -> impl Responder {
    GenericResponse::ok("Funding by year and month", data.overall.funding_year_month())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::server::{configure, tests::test_state};
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::Value;

    async fn get_json(uri: &str) -> Value {
        let app = test::init_service(App::new().app_data(test_state()).configure(configure)).await;
        let req = test::TestRequest::get().uri(uri).to_request();
        test::call_and_read_body_json(&app, req).await
    }

    // Test the summary endpoint
    #[actix_web::test]
    async fn test_summary() {
        let body = get_json("/api/overall/summary").await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["total_invested"], 14353.0);
        assert_eq!(body["data"]["total_funded_startups"], 9);
    }

    // Test the MoM metric switch
    #[actix_web::test]
    async fn test_mom_metric() {
        let amount = get_json("/api/overall/mom").await;
        assert_eq!(amount["data"][0]["label"], "05-2017");
        assert_eq!(amount["data"][0]["value"], 9000.0);

        let count = get_json("/api/overall/mom?metric=count").await;
        assert_eq!(count["data"][5]["value"], 3.0);
    }

    // Test an unknown metric is rejected
    #[actix_web::test]
    async fn test_mom_bad_metric() {
        let app = test::init_service(App::new().app_data(test_state()).configure(configure)).await;
        let req = test::TestRequest::get().uri("/api/overall/mom?metric=bogus").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    // Test the ranking endpoints
    #[actix_web::test]
    async fn test_rankings() {
        let sectors = get_json("/api/overall/sectors").await;
        assert_eq!(sectors["data"][0]["key"], "FinTech");

        let cities = get_json("/api/overall/cities").await;
        assert_eq!(cities["data"][0]["key"], "Noida");

        let types = get_json("/api/overall/types").await;
        assert_eq!(types["data"][0]["key"], "Private Equity Round");

        let investors = get_json("/api/overall/investors").await;
        assert_eq!(investors["data"][0]["key"], "SoftBank Group");
    }

    // Test yearly leaders and the pivot
    #[actix_web::test]
    async fn test_yoy_and_heatmap() {
        let yoy = get_json("/api/overall/yoy").await;
        assert_eq!(yoy["data"][3]["startup"], "BYJU'S");

        let heatmap = get_json("/api/overall/heatmap").await;
        assert_eq!(heatmap["data"]["years"], serde_json::json!([2017, 2018, 2019, 2020]));
        assert_eq!(heatmap["data"]["months"].as_array().unwrap().len(), 12);
    }
}
