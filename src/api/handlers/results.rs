// src/api/handlers/results.rs
use actix_web::{web, HttpResponse, Result};
use serde_json::json;

use super::error_response;
use crate::api::AppState;
use crate::errors::DashboardError;

/// GET /result/{job_id}/chart - Load a job's result into the scatter chart
pub async fn get_result_chart(
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> Result<HttpResponse> {
    let job_id = path.into_inner();

    let lookup = {
        let table = state.table.read().await;
        table
            .row(job_id)
            .ok_or(DashboardError::UnknownJob(job_id))
            .and_then(|row| row.result_path.clone().ok_or(DashboardError::NoResult(job_id)))
    };
    let url = match lookup {
        Ok(url) => url,
        Err(e) => return Ok(error_response(&e)),
    };

    match state.charts.view_result(&url).await {
        Some(chart) => Ok(HttpResponse::Ok().json(chart)),
        None => Ok(HttpResponse::Conflict().json(json!({
            "error": "Chart was replaced by a newer request"
        }))),
    }
}
