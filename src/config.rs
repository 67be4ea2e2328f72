use std::env;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Mongo,
    Memory,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Mongo => f.write_str("mongo"),
            StorageBackend::Memory => f.write_str("memory"),
        }
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StorageBackend::Mongo),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("Invalid STORAGE_BACKEND: {}. Supported: mongo, memory", other)),
        }
    }
}

/// Runtime configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage: StorageBackend,
    pub mongo_uri: Option<String>,
    pub mongo_database: Option<String>,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub bcrypt_cost: u32,
    pub cookie_secure: bool,
    pub cors_origins: Vec<String>,
    pub blacklist_sweep_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage = match lookup("STORAGE_BACKEND") {
            Some(v) => v.parse()?,
            None => StorageBackend::Mongo,
        };

        let mongo_uri = lookup("MONGO_URI").or_else(|| lookup("DATABASE_URL"));
        if storage == StorageBackend::Mongo && mongo_uri.is_none() {
            return Err("MONGO_URI must be set".to_string());
        }

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "JWT_SECRET must be set".to_string())?;

        let bcrypt_cost: u32 = parse_or(&lookup, "BCRYPT_COST", 10)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(format!("BCRYPT_COST must be between 4 and 31, got {}", bcrypt_cost));
        }

        let token_ttl_hours: i64 = parse_or(&lookup, "TOKEN_TTL_HOURS", 24)?;
        if token_ttl_hours <= 0 {
            return Err("TOKEN_TTL_HOURS must be positive".to_string());
        }

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173,http://localhost:3000".to_string())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 5000)?,
            storage,
            mongo_uri,
            mongo_database: lookup("MONGO_DATABASE"),
            jwt_secret,
            token_ttl_hours,
            bcrypt_cost,
            cookie_secure: parse_or(&lookup, "COOKIE_SECURE", false)?,
            cors_origins,
            blacklist_sweep_secs: parse_or(&lookup, "BLACKLIST_SWEEP_SECS", 3600)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, String>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| format!("Invalid {}: {} ({})", key, raw, e)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig, String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[("MONGO_URI", "mongodb://localhost:27017/ktr"), ("JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.storage, StorageBackend::Mongo);
        assert_eq!(cfg.token_ttl_hours, 24);
        assert_eq!(cfg.bcrypt_cost, 10);
        assert!(!cfg.cookie_secure);
        assert_eq!(cfg.cors_origins.len(), 2);
    }

    #[test]
    fn mongo_requires_uri() {
        let err = config(&[("JWT_SECRET", "s3cret")]).unwrap_err();
        assert!(err.contains("MONGO_URI"));
    }

    #[test]
    fn memory_backend_needs_no_uri() {
        let cfg = config(&[("STORAGE_BACKEND", "memory"), ("JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(cfg.storage, StorageBackend::Memory);
        assert!(cfg.mongo_uri.is_none());
    }

    #[test]
    fn secret_is_required() {
        assert!(config(&[("STORAGE_BACKEND", "memory")]).is_err());
        assert!(config(&[("STORAGE_BACKEND", "memory"), ("JWT_SECRET", "")]).is_err());
    }

    #[test]
    fn rejects_bad_numbers() {
        let base = [("STORAGE_BACKEND", "memory"), ("JWT_SECRET", "x")];
        let with = |k: &'static str, v: &'static str| {
            let mut pairs = base.to_vec();
            pairs.push((k, v));
            config(&pairs)
        };
        assert!(with("PORT", "eighty").is_err());
        assert!(with("BCRYPT_COST", "3").is_err());
        assert!(with("TOKEN_TTL_HOURS", "0").is_err());
    }
}
