use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "KTR Kart Auth API",
        version = "1.0.0",
        description = "Authentication service for the KTR Kart hostel marketplace.\n\n**Sessions:** login returns a JWT in the body and in the http-only `token` cookie. Send it back as the cookie or as `Authorization: Bearer <token>`. Tokens live 24 hours unless revoked by logout."
    ),
    paths(
        crate::api::auth::register,
        crate::api::auth::login,
        crate::api::auth::profile,
        crate::api::auth::logout,
        crate::api::health::health_check,
    ),
    components(
        schemas(
            crate::services::auth_service::RegisterRequest,
            crate::services::auth_service::LoginRequest,
            crate::services::auth_service::AuthResponse,
            crate::services::auth_service::ProfileResponse,
            crate::services::auth_service::MessageResponse,
            crate::models::PublicUser,
            crate::api::health::HealthResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Registration, login, logout and the current user's profile."),
        (name = "Health", description = "Liveness check."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT from /api/auth/login"))
                        .build(),
                ),
            );
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("token"))),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_auth_route() {
        let doc = ApiDoc::openapi();
        for path in ["/api/auth/register", "/api/auth/login", "/api/auth/profile", "/api/auth/logout", "/health"] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(components.security_schemes.contains_key("cookie_auth"));
    }
}
