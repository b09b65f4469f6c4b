// src/api/handlers/jobs.rs
use actix_web::{web, HttpResponse, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error_response;
use crate::api::AppState;
use crate::table::{Column, JobRow, JobTable, SortOrder};

#[derive(Serialize)]
pub struct TableResponse {
    pub sequence: Option<u64>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub sort: SortOrder,
    pub page: usize,
    pub page_count: usize,
    pub columns: &'static [Column],
    pub rows: Vec<JobRow>,
}

/// GET /job_list/table - Rendered table fragment
pub async fn get_table_html(state: web::Data<AppState>) -> Result<HttpResponse> {
    let html = state.table.read().await.render_html();
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html))
}

/// GET /job_list/.json - Row view-models of the latest snapshot
pub async fn get_table_json(state: web::Data<AppState>) -> Result<HttpResponse> {
    let table = state.table.read().await;
    Ok(HttpResponse::Ok().json(TableResponse {
        sequence: table.sequence(),
        fetched_at: table.fetched_at(),
        sort: table.sort_order(),
        page: table.page(),
        page_count: table.page_count(),
        columns: JobTable::columns(),
        rows: table.rows().to_vec(),
    }))
}

/// GET /job_list/{job_id}/action/{control} - Resolve a row action
pub async fn dispatch_action(
    state: web::Data<AppState>,
    path: web::Path<(u64, String)>,
) -> Result<HttpResponse> {
    let (job_id, control) = path.into_inner();
    let table = state.table.read().await;

    match table.dispatch(job_id, &control) {
        Ok(command) => Ok(HttpResponse::Ok().json(command)),
        Err(e) => {
            log::debug!("Row action '{}' on job {} rejected: {}", control, job_id, e);
            Ok(error_response(&e))
        }
    }
}
