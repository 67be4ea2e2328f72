use crate::{
    models::{NewUser, PublicUser, User},
    state::AppState,
    utils::{
        validation::{Validator, NAME_MIN_LEN, PASSWORD_MIN_LEN},
        AppError,
    },
};
use serde::{Deserialize, Serialize};

// ==================== REQUEST / RESPONSE ====================
//
// Fields are optional so a missing field shows up as a field error instead
// of a payload error.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub hostel: Option<String>,
    pub phone: Option<String>,
    pub room: Option<String>,
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ProfileResponse {
    pub user: PublicUser,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<NewUser, AppError> {
        Validator::new()
            .not_empty("name", self.name.as_deref(), "Name is required")
            .min_len("name", self.name.as_deref(), NAME_MIN_LEN, "Name must be at least 3 characters long")
            .email("email", self.email.as_deref(), "Valid email is required")
            .secret_min_len("password", self.password.as_deref(), PASSWORD_MIN_LEN, "Password must be at least 6 characters")
            .not_empty("hostel", self.hostel.as_deref(), "Hostel is required")
            .phone("phone", self.phone.as_deref(), "Phone must be a valid 10-digit number")
            .not_empty("room", self.room.as_deref(), "Room number is required")
            .finish()
            .map_err(AppError::Validation)?;

        Ok(NewUser {
            name: self.name.clone().unwrap_or_default(),
            email: self.email.clone().unwrap_or_default(),
            password: self.password.clone().unwrap_or_default(),
            hostel: self.hostel.clone().unwrap_or_default(),
            phone: self.phone.clone().unwrap_or_default(),
            room: self.room.clone().unwrap_or_default(),
        })
    }
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(&str, &str), AppError> {
        Validator::new()
            .email("email", self.email.as_deref(), "Valid email is required")
            .secret_not_empty("password", self.password.as_deref(), "Password is required")
            .finish()
            .map_err(AppError::Validation)?;

        Ok((
            self.email.as_deref().unwrap_or_default(),
            self.password.as_deref().unwrap_or_default(),
        ))
    }
}

// ==================== SERVICE ====================

fn issue_for(state: &AppState, user: &User) -> Result<AuthResponse, AppError> {
    let token = state.jwt.issue(&user.id.to_hex()).map_err(AppError::Internal)?;
    Ok(AuthResponse {
        token,
        user: user.to_public(),
    })
}

// User registration
pub async fn register(state: &AppState, request: &RegisterRequest) -> Result<AuthResponse, AppError> {
    // 1. Field validation, all errors at once
    let new_user = request.validate()?;

    // 2. Check if user already exists
    if state.users.find_by_email(&new_user.email).await?.is_some() {
        return Err(AppError::UserExists);
    }

    // 3. Hash password and store; the unique index catches a racing duplicate
    let user = User::from_new(new_user, state.bcrypt_cost).await?;
    state.users.insert(&user).await?;

    log::info!("✅ User registered: {}", user.id.to_hex());

    // 4. Generate JWT token
    issue_for(state, &user)
}

// User login
pub async fn login(state: &AppState, request: &LoginRequest) -> Result<AuthResponse, AppError> {
    let (email, password) = request.validate()?;

    // Find user with the hidden password field.
    // Unknown email and wrong password must be indistinguishable
    let user = state
        .users
        .find_by_email_with_password(email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    // Verify password
    let hash = user.password.as_ref().ok_or(AppError::InvalidCredentials)?;
    if !hash.verify(password).await? {
        return Err(AppError::InvalidCredentials);
    }

    issue_for(state, &user)
}

/// Resolves a request token to the user it was issued for.
pub async fn authenticate(state: &AppState, token: Option<&str>) -> Result<PublicUser, AppError> {
    let token = token
        .filter(|t| !t.is_empty())
        .ok_or(AppError::Unauthorized(AppError::NO_TOKEN))?;

    // Revocation first: a logged-out token is reported as such even while its signature is fine
    if state.blacklist.is_revoked(token).await? {
        return Err(AppError::Unauthorized(AppError::BLACKLISTED));
    }

    let claims = state.jwt.verify(token).map_err(|e| {
        log::debug!("🔒 Token rejected: {}", e);
        AppError::Unauthorized(AppError::INVALID_TOKEN)
    })?;

    // 🔍 The token may outlive its user
    let user = state
        .users
        .find_by_id(&claims.sub)
        .await?
        .ok_or(AppError::Unauthorized(AppError::USER_NOT_FOUND))?;

    Ok(user.to_public())
}

/// Revokes the token if it could still authenticate. Anything that fails
/// verification is already useless, so it is not stored.
pub async fn logout(state: &AppState, token: Option<&str>) -> Result<(), AppError> {
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        return Ok(());
    };

    match state.jwt.verify(token) {
        Ok(claims) => {
            state.blacklist.revoke(token, claims.expires_at()).await?;
            log::info!("🚪 Token revoked for user {}", claims.sub);
        }
        Err(e) => log::debug!("🚪 Logout with unusable token: {}", e),
    }
    Ok(())
}
