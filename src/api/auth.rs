use crate::{
    middleware::auth::{extract_token, TOKEN_COOKIE},
    models::PublicUser,
    services::auth_service::{self, AuthResponse, LoginRequest, MessageResponse, ProfileResponse, RegisterRequest},
    state::AppState,
    utils::AppError,
};
use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie},
    web, HttpRequest, HttpResponse,
};

// ==================== COOKIES ====================

// Same lifetime as the token itself
fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE, token)
        .path("/")
        .http_only(true)
        .secure(state.cookie_secure)
        .max_age(CookieDuration::seconds(state.jwt.ttl().num_seconds()))
        .finish()
}

// Empty value, expired, same path and flags so the browser drops it
fn removal_cookie(state: &AppState) -> Cookie<'static> {
    let mut cookie = Cookie::build(TOKEN_COOKIE, "")
        .path("/")
        .http_only(true)
        .secure(state.cookie_secure)
        .finish();
    cookie.make_removal();
    cookie
}

// ==================== HANDLERS ====================

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = AuthResponse),
        (status = 400, description = "Validation failed or user already exists"),
        (status = 500, description = "Server error")
    )
)]
pub async fn register(
    state: web::Data<AppState>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("📝 POST /auth/register");

    match auth_service::register(&state, &request).await {
        Ok(response) => Ok(HttpResponse::Created().json(response)),
        Err(e) => {
            log::warn!("❌ Registration failed: {}", e);
            Err(e)
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful; also sets the http-only `token` cookie", body = AuthResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Invalid email or password")
    )
)]
pub async fn login(
    state: web::Data<AppState>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("🔐 POST /auth/login");

    match auth_service::login(&state, &request).await {
        Ok(response) => {
            log::info!("✅ Login successful: {}", response.user.id);
            // 🍪 Browsers ride the cookie, API clients read the token from the body
            Ok(HttpResponse::Ok()
                .cookie(session_cookie(&state, response.token.clone()))
                .json(response))
        }
        Err(e) => {
            log::warn!("❌ Login failed: {}", e);
            Err(e)
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/auth/profile",
    tag = "Auth",
    responses(
        (status = 200, description = "Current user", body = ProfileResponse),
        (status = 401, description = "Missing, revoked, invalid or expired token")
    ),
    security(
        ("bearer_auth" = []),
        ("cookie_auth" = [])
    )
)]
pub async fn profile(user: Option<web::ReqData<PublicUser>>) -> Result<HttpResponse, AppError> {
    log::info!("👤 GET /auth/profile");

    // Only reachable without a user if the route lost its AuthMiddleware
    let user = user.ok_or(AppError::Unauthorized(AppError::UNAUTHORIZED))?;

    Ok(HttpResponse::Ok().json(ProfileResponse {
        user: user.into_inner(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Token revoked and cookie cleared", body = MessageResponse),
        (status = 500, description = "Server error")
    )
)]
pub async fn logout(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, AppError> {
    log::info!("🚪 POST /auth/logout");

    // Cookie first, then Authorization header
    let token = extract_token(&req);
    auth_service::logout(&state, token.as_deref()).await?;

    // Cleared even when there was nothing to revoke

    Ok(HttpResponse::Ok()
        .cookie(removal_cookie(&state))
        .json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }))
}
