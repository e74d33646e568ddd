use actix_web::HttpResponse;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analysis::overall::MomMetric;
use crate::core::error::DashboardError;

/// System status response
#[derive(Serialize)]
pub struct SystemStatusResponse {
    pub status: String,
    pub version: String,
    pub dataset_source: Option<String>,
    pub funding_events: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub uptime_seconds: u64,
}

/// Component info response
#[derive(Serialize)]
pub struct ComponentInfoResponse {
    pub id: String,
    pub component_type: String,
    pub info: serde_json::Value,
}

/// `?name=` on the startup and investor pages
#[derive(Debug, Default, Deserialize)]
pub struct NameQuery {
    pub name: Option<String>,
}

impl NameQuery {
    /// The selected name, if a non-blank one was given
    pub fn selected(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// `?mom=` on the overall page
#[derive(Debug, Default, Deserialize)]
pub struct MomPageQuery {
    pub mom: Option<MomMetric>,
}

/// `?metric=` on the MoM endpoint
#[derive(Debug, Default, Deserialize)]
pub struct MomQuery {
    pub metric: Option<MomMetric>,
}

/// Generic response
#[derive(Serialize)]
pub struct GenericResponse {
    pub success: bool,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

impl GenericResponse {
    pub fn ok<T: Serialize>(message: &str, data: T) -> HttpResponse {
        match serde_json::to_value(data) {
            Ok(value) => HttpResponse::Ok().json(GenericResponse {
                success: true,
                message: message.to_string(),
                data: Some(value),
            }),
            Err(e) => ErrorResponse::from_error(&DashboardError::RenderError(e.to_string())),
        }
    }
}

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_code: String,
}

impl ErrorResponse {
    /// JSON body and status code for a failed request
    pub fn from_error(err: &DashboardError) -> HttpResponse {
        let body = ErrorResponse {
            success: false,
            error: err.to_string(),
            error_code: err.error_code().to_string(),
        };
        match err {
            DashboardError::NotFound(_) => HttpResponse::NotFound().json(body),
            _ => HttpResponse::InternalServerError().json(body),
        }
    }
}
