use crate::utils::AppError;
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const USERS_COLLECTION: &str = "users";

/// A bcrypt hash. Only `PasswordHash::hash` produces one from a plaintext,
/// so a `User` can never carry a raw password into the store.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hashes on the blocking pool; bcrypt is deliberately slow.
    pub async fn hash(plain: &str, cost: u32) -> Result<Self, AppError> {
        let plain = plain.to_string();
        let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(plain, cost))
            .await
            .map_err(|e| AppError::Internal(format!("hash task failed: {}", e)))??;
        Ok(Self(hashed))
    }

    /// One-way comparison; the stored hash is never decrypted.
    pub async fn verify(&self, candidate: &str) -> Result<bool, AppError> {
        let candidate = candidate.to_string();
        let hashed = self.0.clone();
        let matched = tokio::task::spawn_blocking(move || bcrypt::verify(candidate, &hashed))
            .await
            .map_err(|e| AppError::Internal(format!("verify task failed: {}", e)))??;
        Ok(matched)
    }

    #[cfg(test)]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(***)")
    }
}

// User document as stored in MongoDB
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    /// Absent unless the query explicitly asked for it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<PasswordHash>,
    pub hostel: String,
    pub phone: String,
    pub room: String,
    #[serde(rename = "createdAt")]
    pub created_at: BsonDateTime,
    #[serde(rename = "updatedAt")]
    pub updated_at: BsonDateTime,
}

/// Validated registration input, password still in plaintext.
#[derive(Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub hostel: String,
    pub phone: String,
    pub room: String,
}

impl User {
    /// Turns a registration into a storable user, hashing the password once.
    pub async fn from_new(new_user: NewUser, bcrypt_cost: u32) -> Result<Self, AppError> {
        let password = PasswordHash::hash(&new_user.password, bcrypt_cost).await?;
        let now = BsonDateTime::now();

        Ok(Self {
            id: ObjectId::new(),
            name: new_user.name,
            email: new_user.email,
            password: Some(password),
            hostel: new_user.hostel,
            phone: new_user.phone,
            room: new_user.room,
            created_at: now,
            updated_at: now,
        })
    }

    /// Copy with the password stripped, as default queries return it.
    pub fn without_password(&self) -> Self {
        Self {
            password: None,
            ..self.clone()
        }
    }

    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id.to_hex(),
            name: self.name.clone(),
            email: self.email.clone(),
            hostel: self.hostel.clone(),
            phone: self.phone.clone(),
            room: self.room.clone(),
        }
    }
}

/// What clients get to see of a user.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, utoipa::ToSchema)]
pub struct PublicUser {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub hostel: String,
    pub phone: String,
    pub room: String,
}
