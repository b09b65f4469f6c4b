use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use jobwatch::api::handlers::WsBroker;
use jobwatch::api::{configure_routes, AppState};
use jobwatch::{banner, config};
use std::sync::Arc;
use tokio::sync::watch;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    banner::print_banner();

    if let Err(e) = dotenvy::dotenv() {
        eprintln!("⚠️  Warning: Could not load .env file: {}", e);
    }

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let app_config = match config::AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load configuration: {}", e);
            return Err(std::io::Error::other(e.to_string()));
        }
    };
    let bind = app_config.bind.clone();
    log::info!("Watching job service at {}", app_config.upstream);

    let state = AppState::new(app_config).map_err(|e| std::io::Error::other(e.to_string()))?;
    let broker = WsBroker::new(state.presence.clone());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller = state
        .poller()
        .with_listener(Arc::new(broker.clone()))
        .spawn(shutdown_rx);

    log::info!("📊 Dashboard available at http://{}", bind);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(broker.clone()))
            .wrap(Cors::permissive())
            .wrap(middleware::Logger::default())
            .configure(configure_routes)
    })
    .bind(bind)?
    .run()
    .await;

    let _ = shutdown_tx.send(true);
    if let Err(e) = poller.await {
        log::warn!("Job poller ended abnormally: {}", e);
    }

    server
}
