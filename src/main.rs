mod api;
mod config;
mod database;
mod jobs;
mod middleware;
mod models;
mod repository;
mod services;
mod state;
mod utils;

use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use config::{AppConfig, StorageBackend};
use dotenv::dotenv;
use repository::{memory, TokenBlacklist, UserStore};
use state::AppState;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| {
        log::error!("❌ Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    log::info!("🚀 Starting KTR Kart auth service...");
    log::info!("🗄️  Storage backend: {}", config.storage);

    let (users, blacklist): (Arc<dyn UserStore>, Arc<dyn TokenBlacklist>) = match config.storage {
        StorageBackend::Mongo => {
            let uri = config.mongo_uri.as_deref().unwrap_or_default();
            let db = database::MongoDB::new(uri, config.mongo_database.as_deref())
                .await
                .map_err(|e| {
                    log::error!("❌ DB connection error: {}", e);
                    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
                })?;
            log::info!("✅ MongoDB connected successfully");
            let db = Arc::new(db);
            (db.clone() as Arc<dyn UserStore>, db as Arc<dyn TokenBlacklist>)
        }
        StorageBackend::Memory => {
            log::warn!("⚠️  In-memory storage: users and revocations are lost on restart");
            (
                Arc::new(memory::MemoryUserStore::new()) as Arc<dyn UserStore>,
                Arc::new(memory::MemoryBlacklist::new()) as Arc<dyn TokenBlacklist>,
            )
        }
    };

    jobs::blacklist_sweeper::start_blacklist_sweeper(blacklist.clone(), config.blacklist_sweep_secs);

    let state = web::Data::new(AppState::new(&config, users, blacklist));
    let cors_origins = config.cors_origins.clone();
    let bind = (config.host.clone(), config.port);

    log::info!("🌐 Server starting on {}:{}", bind.0, bind.1);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", bind.0, bind.1);

    HttpServer::new(move || {
        let cors = cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(middleware::SecurityHeaders)
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", api::swagger::ApiDoc::openapi()),
            )
            .configure(api::configure)
    })
    .bind(bind)?
    .run()
    .await
}
