use actix_web::{web, HttpResponse, Responder};

use crate::web::models::{ComponentInfoResponse, GenericResponse, SystemStatusResponse};
use crate::web::server::AppState;

/// Get the service status and what was loaded
pub async fn get_system_status(data: web::Data<AppState>) -> impl Responder {
    let summary = data.dataset.summary();

    let response = SystemStatusResponse {
        status: "Running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        dataset_source: summary.source,
        funding_events: summary.rows,
        first_date: summary.first_date,
        last_date: summary.last_date,
        uptime_seconds: data.started_at.elapsed().as_secs(),
    };

    HttpResponse::Ok().json(response)
}

/// Get information about all analysis components
pub async fn get_components(data: web::Data<AppState>) -> impl Responder {
    let components: Vec<ComponentInfoResponse> = data
        .components()
        .into_iter()
        .map(|component| ComponentInfoResponse {
            id: component.id().to_string(),
            component_type: component.kind().to_string(),
            info: component.get_info(),
        })
        .collect();

    GenericResponse::ok("Analysis components", components)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::server::{configure, tests::test_state};
    use actix_web::{test, App};
    use serde_json::Value;

    // Test the status endpoint reports the loaded dataset
    #[actix_web::test]
    async fn test_system_status() {
        let app = test::init_service(App::new().app_data(test_state()).configure(configure)).await;
        let req = test::TestRequest::get().uri("/api/system/status").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "Running");
        assert_eq!(body["funding_events"], 10);
        assert_eq!(body["first_date"], "2017-05-18");
        assert_eq!(body["last_date"], "2020-01-13");
    }

    // Test the components endpoint lists all three analyses
    #[actix_web::test]
    async fn test_components() {
        let app = test::init_service(App::new().app_data(test_state()).configure(configure)).await;
        let req = test::TestRequest::get().uri("/api/system/components").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["success"], true);
        let components = body["data"].as_array().unwrap();
        assert_eq!(components.len(), 3);
        assert_eq!(components[0]["id"], "overall");
        assert_eq!(components[0]["component_type"], "Overall Analysis");
        assert_eq!(components[2]["info"]["similar_limit"], 4);
    }
}
