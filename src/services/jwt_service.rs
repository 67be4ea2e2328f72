use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user _id (hex)
    pub iat: i64,
    pub exp: i64,
    pub jti: String, // keeps two logins in the same second from sharing a token
}

impl Claims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0).single().unwrap_or_else(Utc::now)
    }
}

/// Signs and verifies HS256 session tokens.
#[derive(Clone)]
pub struct JwtService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtService {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, user_id: &str) -> Result<String, String> {
        self.issue_at(user_id, Utc::now())
    }

    pub(crate) fn issue_at(&self, user_id: &str, now: DateTime<Utc>) -> Result<String, String> {
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(|e| format!("Failed to generate token: {}", e))
    }

    /// Checks signature and expiry. The error string is for logs only;
    /// callers answer every failure the same way.
    pub fn verify(&self, token: &str) -> Result<Claims, String> {
        self.verify_at(token, Utc::now())
    }

    fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, String> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| format!("Invalid token: {}", e))?;

        // jsonwebtoken still accepts `exp == now`; the blacklist drops the
        // entry in that same second, so the token has to die with it
        if claims.exp <= now.timestamp() {
            return Err("Invalid token: ExpiredSignature".to_string());
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new("test-secret", 24)
    }

    #[test]
    fn issued_token_verifies() {
        let jwt = service();
        let token = jwt.issue("65f1c0ffee65f1c0ffee65f1").unwrap();
        let claims = jwt.verify(&token).unwrap();

        assert_eq!(claims.sub, "65f1c0ffee65f1c0ffee65f1");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
        assert_eq!(claims.expires_at().timestamp(), claims.exp);
    }

    #[test]
    fn tokens_are_unique_per_issue() {
        let jwt = service();
        let a = jwt.issue("u1").unwrap();
        let b = jwt.issue("u1").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn expired_token_is_rejected() {
        let jwt = service();
        let token = jwt.issue_at("u1", Utc::now() - Duration::hours(25)).unwrap();
        assert!(jwt.verify(&token).is_err());
    }

    #[test]
    fn token_is_rejected_in_its_expiry_second() {
        let jwt = service();
        let issued_at = Utc::now() - Duration::hours(1);
        let token = jwt.issue_at("u1", issued_at).unwrap();
        let exp = issued_at + Duration::hours(24);

        assert!(jwt.verify_at(&token, exp - Duration::seconds(1)).is_ok());
        assert!(jwt.verify_at(&token, exp).is_err());
    }

    #[test]
    fn token_one_second_past_expiry_is_rejected() {
        let jwt = service();
        let token = jwt.issue_at("u1", Utc::now() - Duration::hours(24) - Duration::seconds(1)).unwrap();
        assert!(jwt.verify(&token).is_err());
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let token = JwtService::new("other-secret", 24).issue("u1").unwrap();
        assert!(service().verify(&token).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(service().verify("not.a.jwt").is_err());
        assert!(service().verify("").is_err());
    }
}
