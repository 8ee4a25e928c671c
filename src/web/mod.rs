mod handlers;
mod state;

use actix_web::{web, App, HttpServer};
use tracing::info;
use tracing_actix_web::TracingLogger;

use crate::config::AppConfig;
pub use state::AppState;

/// Register the JSON API routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/scenarios", web::post().to(handlers::create_scenario))
        .route("/api/scenarios/{id}", web::get().to(handlers::get_scenario))
        .route("/api/scenarios/{id}", web::patch().to(handlers::patch_scenario))
        .route(
            "/api/scenarios/{id}/feasibility",
            web::get().to(handlers::scenario_feasibility),
        )
        .route(
            "/api/scenarios/{id}/sensitivity",
            web::get().to(handlers::scenario_sensitivity),
        )
        .route("/api/compute", web::post().to(handlers::compute))
        .route("/api/sensitivity", web::post().to(handlers::sensitivity))
        .route("/api/exchange-rate", web::get().to(handlers::get_exchange_rate))
        .route("/api/exchange-rate", web::put().to(handlers::put_exchange_rate));
}

pub async fn start_server(config: AppConfig) -> std::io::Result<()> {
    let state = AppState::new(&config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;
    let data = web::Data::new(state);
    let host = config.server.host.clone();
    let port = config.server.port;

    info!("Starting feasibility API on http://{host}:{port}");

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(data.clone())
            .configure(configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
