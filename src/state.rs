use crate::config::{AppConfig, StorageBackend};
use crate::repository::{TokenBlacklist, UserStore};
use crate::services::jwt_service::JwtService;
use std::sync::Arc;

/// Shared handles every request needs; cloned into each worker.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub blacklist: Arc<dyn TokenBlacklist>,
    pub jwt: JwtService,
    pub bcrypt_cost: u32,
    pub cookie_secure: bool,
    pub storage: StorageBackend,
}

impl AppState {
    pub fn new(
        config: &AppConfig,
        users: Arc<dyn UserStore>,
        blacklist: Arc<dyn TokenBlacklist>,
    ) -> Self {
        Self {
            users,
            blacklist,
            jwt: JwtService::new(&config.jwt_secret, config.token_ttl_hours),
            bcrypt_cost: config.bcrypt_cost,
            cookie_secure: config.cookie_secure,
            storage: config.storage,
        }
    }

    /// In-memory state with cheap hashing, for handler tests.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        use crate::repository::memory::{MemoryBlacklist, MemoryUserStore};

        Self {
            users: Arc::new(MemoryUserStore::new()),
            blacklist: Arc::new(MemoryBlacklist::new()),
            jwt: JwtService::new("test-secret", 24),
            bcrypt_cost: 4,
            cookie_secure: false,
            storage: StorageBackend::Memory,
        }
    }
}
