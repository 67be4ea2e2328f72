use super::{is_duplicate_key, MongoDB};
use crate::models::User;
use crate::repository::UserStore;
use crate::utils::AppError;
use async_trait::async_trait;
use mongodb::bson::{doc, oid::ObjectId};

#[async_trait]
impl UserStore for MongoDB {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users()
            .find_one(doc! { "email": email })
            .projection(doc! { "password": 0 })
            .await?)
    }

    async fn find_by_email_with_password(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.users().find_one(doc! { "email": email }).await?)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        Ok(self
            .users()
            .find_one(doc! { "_id": oid })
            .projection(doc! { "password": 0 })
            .await?)
    }

    async fn insert(&self, user: &User) -> Result<(), AppError> {
        match self.users().insert_one(user).await {
            Ok(_) => Ok(()),
            // Lost the check-then-insert race to a concurrent registration
            Err(e) if is_duplicate_key(&e) => Err(AppError::UserExists),
            Err(e) => Err(e.into()),
        }
    }
}
