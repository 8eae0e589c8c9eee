mod api;
mod config;
mod database;
mod middleware;
mod models;
mod services;
mod utils;
mod views;

use actix_web::{middleware::Compress, middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;

use crate::database::{JsonFileStore, UserStore};
use crate::services::session_service::SessionStore;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = config::Config::from_env();

    log::info!("🚀 Starting User Portal...");

    // The user table must exist and parse before we accept traffic
    let store = match JsonFileStore::load(config.users_file.clone()).await {
        Ok(store) => store,
        Err(e) => {
            log::error!("❌ Cannot start: {}", e);
            std::process::exit(1);
        }
    };

    log::info!("📂 Users file: {}", store.path().display());

    let store: Arc<dyn UserStore> = Arc::new(store);
    let users = web::Data::from(store);
    let sessions = web::Data::new(SessionStore::new());
    let bind = (config.host.clone(), config.port);
    let config = web::Data::new(config);

    log::info!("🌐 Server running at http://{}:{}", bind.0, bind.1);

    let store_for_shutdown = users.clone();

    HttpServer::new(move || {
        App::new()
            .app_data(users.clone())
            .app_data(sessions.clone())
            .app_data(config.clone())
            .wrap(middleware::SecurityHeaders)
            .wrap(Compress::default())
            .wrap(Logger::default())
            .configure(api::configure)
    })
    .bind(bind)?
    .run()
    .await?;

    // Flush last-access times that only lived in memory
    if let Err(e) = store_for_shutdown.persist().await {
        log::warn!("⚠️  Failed to persist users on shutdown: {}", e);
    }

    Ok(())
}
