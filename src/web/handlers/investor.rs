use actix_web::{web, Responder};
use log::debug;

use crate::web::models::{ErrorResponse, GenericResponse};
use crate::web::server::AppState;

/// Get every investor name, sorted
pub async fn list_investors(data: web::Data<AppState>) -> impl Responder {
    GenericResponse::ok("Investors", data.investor.investor_list())
}

/// Get one investor's profile; similar investors are sampled per request
pub async fn get_investor(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let name = path.into_inner();
    let profile = data.investor.profile(&name, &mut rand::thread_rng());

    match profile {
        Ok(profile) => GenericResponse::ok("Investor profile", profile),
        Err(e) => {
            debug!("Investor lookup failed: {}", e);
            ErrorResponse::from_error(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::server::{configure, tests::test_state};
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::Value;

    // Test the investor list
    #[actix_web::test]
    async fn test_list_investors() {
        let app = test::init_service(App::new().app_data(test_state()).configure(configure)).await;
        let req = test::TestRequest::get().uri("/api/investors").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["data"].as_array().unwrap().len(), 9);
        assert_eq!(body["data"][0], "Blume Ventures");
    }

    // Test an investor profile with a percent-encoded name
    #[actix_web::test]
    async fn test_get_investor() {
        let app = test::init_service(App::new().app_data(test_state()).configure(configure)).await;
        let req = test::TestRequest::get()
            .uri("/api/investors/Sequoia%20Capital%20India")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["name"], "Sequoia Capital India");
        assert_eq!(body["data"]["deals"], 3);
        assert_eq!(body["data"]["recent_investments"][0]["startup"], "Mamaearth");
        assert_eq!(body["data"]["biggest_investments"][0]["key"], "Zomato");
    }

    // Test an investor with no rounds is a 404
    #[actix_web::test]
    async fn test_unknown_investor() {
        let app = test::init_service(App::new().app_data(test_state()).configure(configure)).await;
        let req = test::TestRequest::get().uri("/api/investors/Nobody").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
