// src/api/handlers/mod.rs
mod health;
mod jobs;
mod results;
pub mod ws;

use actix_web::HttpResponse;
use serde_json::json;

use crate::errors::DashboardError;

pub use health::health_check;
pub use jobs::{dispatch_action, get_table_html, get_table_json};
pub use results::get_result_chart;
pub use ws::{ws_handler, WsBroker};

/// Maps a dashboard error onto an HTTP response.
pub(crate) fn error_response(err: &DashboardError) -> HttpResponse {
    let body = json!({ "error": err.to_string() });
    match err {
        DashboardError::UnknownJob(_) => HttpResponse::NotFound().json(body),
        DashboardError::ActionUnavailable { .. } | DashboardError::NoResult(_) => {
            HttpResponse::Conflict().json(body)
        }
        DashboardError::Request(_) | DashboardError::Upstream { .. } => {
            HttpResponse::BadGateway().json(body)
        }
        _ => HttpResponse::InternalServerError().json(body),
    }
}
