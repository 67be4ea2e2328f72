use mongodb::bson::DateTime as BsonDateTime;
use serde::{Deserialize, Serialize};

pub const BLACKLIST_COLLECTION: &str = "blacklists";

/// A revoked token, kept only until the token would have expired anyway.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BlacklistEntry {
    pub token: String,
    #[serde(rename = "expiresAt")]
    pub expires_at: BsonDateTime,
    #[serde(rename = "createdAt")]
    pub created_at: BsonDateTime,
}

impl BlacklistEntry {
    pub fn new(token: &str, expires_at: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            token: token.to_string(),
            expires_at: BsonDateTime::from_millis(expires_at.timestamp_millis()),
            created_at: BsonDateTime::now(),
        }
    }
}
