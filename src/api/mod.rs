pub mod auth;
pub mod health;
pub mod swagger;

use crate::{middleware::AuthMiddleware, utils::AppError};
use actix_web::{web, HttpResponse};

/// All routes, shared by `main` and the handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default()
        .limit(16 * 1024)
        .error_handler(|err, _req| {
            log::warn!("❌ Rejected payload: {}", err);
            AppError::InvalidPayload.into()
        });

    cfg.app_data(json_config)
        .route("/", web::get().to(root))
        .route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/api/auth")
                .route("/register", web::post().to(auth::register))
                .route("/login", web::post().to(auth::login))
                .route("/logout", web::post().to(auth::logout))
                .service(
                    web::resource("/profile")
                        .wrap(AuthMiddleware)
                        .route(web::get().to(auth::profile)),
                ),
        );
}

async fn root() -> HttpResponse {
    HttpResponse::Ok().content_type("text/plain; charset=utf-8").body("API is running")
}
