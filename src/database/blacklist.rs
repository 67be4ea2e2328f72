use super::{is_duplicate_key, MongoDB};
use crate::models::BlacklistEntry;
use crate::repository::TokenBlacklist;
use crate::utils::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::{doc, DateTime as BsonDateTime};

// The TTL index on `expiresAt` removes entries within a minute of expiry;
// lookups also filter on it so a not-yet-reaped entry never counts.
#[async_trait]
impl TokenBlacklist for MongoDB {
    async fn revoke(&self, token: &str, expires_at: DateTime<Utc>) -> Result<(), AppError> {
        match self.blacklist().insert_one(BlacklistEntry::new(token, expires_at)).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn is_revoked(&self, token: &str) -> Result<bool, AppError> {
        let entry = self
            .blacklist()
            .find_one(doc! { "token": token, "expiresAt": { "$gt": BsonDateTime::now() } })
            .await?;
        Ok(entry.is_some())
    }

    async fn purge_expired(&self) -> Result<u64, AppError> {
        let result = self
            .blacklist()
            .delete_many(doc! { "expiresAt": { "$lte": BsonDateTime::now() } })
            .await?;
        Ok(result.deleted_count)
    }
}
