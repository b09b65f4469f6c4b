// src/api/routes.rs
use actix_web::web;
use super::handlers;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/v1/health", web::get().to(handlers::health_check))
        .route("/ws", web::get().to(handlers::ws_handler))
        .service(
            web::scope("/job_list")
                .route("/table", web::get().to(handlers::get_table_html))
                .route("/.json", web::get().to(handlers::get_table_json))
                .route("/{job_id}/action/{control}", web::get().to(handlers::dispatch_action))
        )
        .service(
            web::scope("/result")
                .route("/{job_id}/chart", web::get().to(handlers::get_result_chart))
        );
}
