use actix_web::{web, Responder};
use log::debug;

use crate::web::models::{ErrorResponse, GenericResponse};
use crate::web::server::AppState;

/// Get every startup name, sorted
pub async fn list_startups(data: web::Data<AppState>) -> impl Responder {
    GenericResponse::ok("Startups", data.startup.list_of_startups())
}

/// Get one startup's profile
pub async fn get_startup(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let name = path.into_inner();

    match data.startup.profile(&name) {
        Ok(profile) => GenericResponse::ok("Startup profile", profile),
        Err(e) => {
            debug!("Startup lookup failed: {}", e);
            ErrorResponse::from_error(&e)
        }
    }
}
