mod config;
mod inference;
mod report;
mod routes;
mod state;
mod store;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use config::AppConfig;
use inference::client::HttpClassifier;
use report::gemini::GeminiReportGenerator;
use routes::configure_routes;
use state::AppState;
use std::env;
use std::io;
use std::path::Path;
use std::sync::Arc;
use store::ReviewStore;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Ok(current_dir) = env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    } else {
        log::error!("Failed to get the current working directory.");
    }

    let config = AppConfig::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        io::Error::other(e.to_string())
    })?;

    let classifier = HttpClassifier::new(&config.inference).map_err(|e| {
        log::error!("Failed to build inference client: {}", e);
        io::Error::other(e.to_string())
    })?;
    log::info!(
        "Inference service at {} with {} labels",
        config.inference.url,
        config.inference.labels.len()
    );

    let frontend_dir = if Path::new(&config.frontend_dir).is_dir() {
        Some(config.frontend_dir.clone())
    } else {
        log::warn!("Frontend directory {} not found, serving API only", config.frontend_dir);
        None
    };

    let server_messages = config.locale.server.clone();
    let state = AppState {
        store: ReviewStore::with_capacity(config.max_stored_reviews),
        classifier: Arc::new(classifier),
        reports: Arc::new(GeminiReportGenerator::new(&config.report)),
        locale: Arc::new(config.locale),
        max_upload_bytes: config.max_upload_bytes,
    };

    log::info!("Starting server on {}", config.bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(web::Data::new(state.clone()))
            .configure(|cfg| configure_routes(cfg, &server_messages, frontend_dir.clone()))
    })
    .bind(&config.bind_address)?
    .run()
    .await
}
