use super::{TokenBlacklist, UserStore};
use crate::models::User;
use crate::utils::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard, RwLock};

fn poisoned<T>(_: T) -> AppError {
    AppError::Internal("in-memory store lock poisoned".to_string())
}

#[derive(Default)]
struct UserTable {
    by_id: HashMap<ObjectId, User>,
    id_by_email: HashMap<String, ObjectId>,
}

/// In-process user table; the email map plays the unique index.
#[derive(Default)]
pub struct MemoryUserStore {
    table: RwLock<UserTable>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lookup_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let table = self.table.read().map_err(poisoned)?;
        Ok(table
            .id_by_email
            .get(email)
            .and_then(|id| table.by_id.get(id))
            .cloned())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.lookup_email(email)?.map(|u| u.without_password()))
    }

    async fn find_by_email_with_password(&self, email: &str) -> Result<Option<User>, AppError> {
        self.lookup_email(email)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        let table = self.table.read().map_err(poisoned)?;
        Ok(table.by_id.get(&oid).map(User::without_password))
    }

    async fn insert(&self, user: &User) -> Result<(), AppError> {
        let mut table = self.table.write().map_err(poisoned)?;
        if table.id_by_email.contains_key(&user.email) {
            return Err(AppError::UserExists);
        }
        table.id_by_email.insert(user.email.clone(), user.id);
        table.by_id.insert(user.id, user.clone());
        Ok(())
    }
}

#[derive(Default)]
struct RevocationIndex {
    expiry_by_token: HashMap<String, i64>,
    /// (expiry seconds, token), ordered so the oldest expiry is first.
    by_expiry: BTreeSet<(i64, String)>,
}

impl RevocationIndex {
    // `exp <= now` is gone: the token stops verifying in that same second
    fn evict_until(&mut self, now: i64) -> u64 {
        let mut evicted = 0;
        while let Some((exp, _)) = self.by_expiry.first() {
            if *exp > now {
                break;
            }
            if let Some((_, token)) = self.by_expiry.pop_first() {
                self.expiry_by_token.remove(&token);
                evicted += 1;
            }
        }
        evicted
    }
}

/// Revocation set indexed by expiry; entries disappear once their token
/// could no longer authenticate.
#[derive(Default)]
pub struct MemoryBlacklist {
    index: Mutex<RevocationIndex>,
}

impl MemoryBlacklist {
    pub fn new() -> Self {
        Self::default()
    }

    fn index(&self) -> Result<MutexGuard<'_, RevocationIndex>, AppError> {
        self.index.lock().map_err(poisoned)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.index().map(|i| i.expiry_by_token.len()).unwrap_or(0)
    }
}

#[async_trait]
impl TokenBlacklist for MemoryBlacklist {
    async fn revoke(&self, token: &str, expires_at: DateTime<Utc>) -> Result<(), AppError> {
        let exp = expires_at.timestamp();
        let mut index = self.index()?;
        index.evict_until(Utc::now().timestamp());

        if let Some(previous) = index.expiry_by_token.insert(token.to_string(), exp) {
            index.by_expiry.remove(&(previous, token.to_string()));
        }
        index.by_expiry.insert((exp, token.to_string()));
        Ok(())
    }

    async fn is_revoked(&self, token: &str) -> Result<bool, AppError> {
        let mut index = self.index()?;
        index.evict_until(Utc::now().timestamp());
        Ok(index.expiry_by_token.contains_key(token))
    }

    async fn purge_expired(&self) -> Result<u64, AppError> {
        Ok(self.index()?.evict_until(Utc::now().timestamp()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;
    use chrono::Duration;

    async fn user(email: &str) -> User {
        User::from_new(
            NewUser {
                name: "Ann".to_string(),
                email: email.to_string(),
                password: "secret1".to_string(),
                hostel: "Paari".to_string(),
                phone: "9876543210".to_string(),
                room: "101".to_string(),
            },
            4,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn default_lookups_hide_password() {
        let store = MemoryUserStore::new();
        let ann = user("ann@x.com").await;
        store.insert(&ann).await.unwrap();

        let by_email = store.find_by_email("ann@x.com").await.unwrap().unwrap();
        assert!(by_email.password.is_none());

        let by_id = store.find_by_id(&ann.id.to_hex()).await.unwrap().unwrap();
        assert!(by_id.password.is_none());

        let with_pw = store.find_by_email_with_password("ann@x.com").await.unwrap().unwrap();
        assert!(with_pw.password.is_some());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryUserStore::new();
        store.insert(&user("ann@x.com").await).await.unwrap();

        let err = store.insert(&user("ann@x.com").await).await.unwrap_err();
        assert!(matches!(err, AppError::UserExists));
        assert_eq!(store.table.read().unwrap().by_id.len(), 1);
    }

    #[tokio::test]
    async fn malformed_id_is_not_found() {
        let store = MemoryUserStore::new();
        assert!(store.find_by_id("not-an-object-id").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn revoked_until_expiry() {
        let blacklist = MemoryBlacklist::new();
        blacklist.revoke("live", Utc::now() + Duration::hours(1)).await.unwrap();
        blacklist.revoke("dead", Utc::now() - Duration::seconds(1)).await.unwrap();

        assert!(blacklist.is_revoked("live").await.unwrap());
        assert!(!blacklist.is_revoked("dead").await.unwrap());
        assert!(!blacklist.is_revoked("never").await.unwrap());
        assert_eq!(blacklist.len(), 1);
    }

    #[tokio::test]
    async fn revoking_twice_keeps_one_entry() {
        let blacklist = MemoryBlacklist::new();
        let exp = Utc::now() + Duration::hours(1);
        blacklist.revoke("tok", exp).await.unwrap();
        blacklist.revoke("tok", exp + Duration::minutes(5)).await.unwrap();

        assert_eq!(blacklist.len(), 1);
        assert_eq!(blacklist.index().unwrap().by_expiry.len(), 1);
    }

    #[tokio::test]
    async fn purge_counts_evictions() {
        let blacklist = MemoryBlacklist::new();
        {
            let mut index = blacklist.index().unwrap();
            let past = Utc::now().timestamp() - 10;
            for token in ["a", "b"] {
                index.expiry_by_token.insert(token.to_string(), past);
                index.by_expiry.insert((past, token.to_string()));
            }
        }

        assert_eq!(blacklist.purge_expired().await.unwrap(), 2);
        assert_eq!(blacklist.len(), 0);
        assert_eq!(blacklist.purge_expired().await.unwrap(), 0);
    }
}
