// src/api/handlers/health.rs
use actix_web::{web, HttpResponse, Result};
use serde_json::json;

use crate::api::AppState;

pub async fn health_check(state: web::Data<AppState>) -> Result<HttpResponse> {
    let table = state.table.read().await;
    Ok(HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": "jobwatch",
        "version": env!("CARGO_PKG_VERSION"),
        "viewers": state.presence.viewers(),
        "last_poll": table.fetched_at().map(|t| t.to_rfc3339()),
    })))
}
