// Storage seams. MongoDB implements these in `database`, `memory` keeps
// everything in-process for local runs and handler tests.
pub mod memory;

use crate::models::User;
use crate::utils::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Lookup by email with the password excluded.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Lookup by email including the password hash, for login only.
    async fn find_by_email_with_password(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Lookup by hex ObjectId with the password excluded. Malformed ids are `None`.
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;

    /// Inserts a new user. A duplicate email yields `AppError::UserExists`.
    async fn insert(&self, user: &User) -> Result<(), AppError>;
}

#[async_trait]
pub trait TokenBlacklist: Send + Sync {
    /// Revokes `token` until `expires_at`. Revoking twice is not an error.
    async fn revoke(&self, token: &str, expires_at: DateTime<Utc>) -> Result<(), AppError>;

    async fn is_revoked(&self, token: &str) -> Result<bool, AppError>;

    /// Drops entries whose tokens have expired; returns how many went.
    async fn purge_expired(&self) -> Result<u64, AppError>;
}
