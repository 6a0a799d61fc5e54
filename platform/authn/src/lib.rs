//! Credential and bearer-token helpers.
//!
//! Passwords are stored as argon2 PHC strings. Sessions are stateless HS256
//! tokens carrying the user id, display name, role and tenant.

use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub const DEFAULT_ISSUER: &str = "PayrollAnalytics";
pub const DEFAULT_AUDIENCE: &str = "PayrollAnalyticsUsers";
pub const DEFAULT_TTL_HOURS: i64 = 8;
pub const MIN_SECRET_BYTES: usize = 32;

#[derive(Debug, Error)]
pub enum AuthnError {
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("signing key must be at least 32 bytes, got {0}")]
    WeakSecret(usize),
    #[error("signing key is not valid base64")]
    SecretEncoding(#[from] base64::DecodeError),
    #[error("token rejected: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

pub type AuthnResult<T> = Result<T, AuthnError>;

pub fn hash_password(password: &str) -> AuthnResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AuthnError::Hash(err.to_string()))
}

/// Returns false for a wrong password and for a malformed stored hash.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[derive(Clone)]
pub struct TokenConfig {
    secret: Vec<u8>,
    pub issuer: String,
    pub audience: String,
    pub ttl_hours: i64,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl_hours", &self.ttl_hours)
            .finish_non_exhaustive()
    }
}

impl TokenConfig {
    pub fn new(secret: Vec<u8>) -> AuthnResult<Self> {
        if secret.len() < MIN_SECRET_BYTES {
            return Err(AuthnError::WeakSecret(secret.len()));
        }
        Ok(Self {
            secret,
            issuer: DEFAULT_ISSUER.to_string(),
            audience: DEFAULT_AUDIENCE.to_string(),
            ttl_hours: DEFAULT_TTL_HOURS,
        })
    }

    pub fn from_base64(encoded: &str) -> AuthnResult<Self> {
        let secret = STANDARD.decode(encoded.trim())?;
        Self::new(secret)
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = audience.into();
        self
    }

    pub fn with_ttl_hours(mut self, hours: i64) -> Self {
        self.ttl_hours = hours.max(1);
        self
    }

    fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(&self.secret)
    }

    fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(&self.secret)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_audience(&[self.audience.as_str()]);
        validation
    }
}

/// Identity the token was issued for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Subject {
    pub user_id: i32,
    pub username: String,
    pub role: String,
    pub tenant: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub role: String,
    pub tenant: String,
    pub iss: String,
    pub aud: String,
    pub exp: usize,
    pub iat: usize,
    pub jti: Uuid,
}

impl Claims {
    pub fn user_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }
}

pub fn issue_token(subject: &Subject, config: &TokenConfig) -> AuthnResult<String> {
    let now = Utc::now();
    let exp = now
        .checked_add_signed(Duration::hours(config.ttl_hours))
        .unwrap_or(now)
        .timestamp() as usize;
    let claims = Claims {
        sub: subject.user_id.to_string(),
        name: subject.username.clone(),
        role: subject.role.clone(),
        tenant: subject.tenant.clone(),
        iss: config.issuer.clone(),
        aud: config.audience.clone(),
        exp,
        iat: now.timestamp() as usize,
        jti: Uuid::new_v4(),
    };
    Ok(jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &config.encoding_key(),
    )?)
}

pub fn decode_token(token: &str, config: &TokenConfig) -> AuthnResult<Claims> {
    let data = jsonwebtoken::decode::<Claims>(token, &config.decoding_key(), &config.validation())?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TokenConfig {
        TokenConfig::new(vec![7u8; 32]).unwrap()
    }

    fn subject() -> Subject {
        Subject {
            user_id: 1,
            username: "admin".into(),
            role: "Admin".into(),
            tenant: "default".into(),
        }
    }

    #[test]
    fn password_hash_verifies_only_the_original() {
        let hash = hash_password("admin123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("admin123", &hash));
        assert!(!verify_password("admin124", &hash));
        assert!(!verify_password("admin123", "not-a-hash"));
    }

    #[test]
    fn token_round_trip_keeps_identity() {
        let cfg = config();
        let token = issue_token(&subject(), &cfg).unwrap();
        let claims = decode_token(&token, &cfg).unwrap();
        assert_eq!(claims.user_id(), Some(1));
        assert_eq!(claims.name, "admin");
        assert_eq!(claims.role, "Admin");
        assert_eq!(claims.iss, DEFAULT_ISSUER);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_for_another_audience_is_rejected() {
        let issued = config().with_audience("SomeoneElse");
        let token = issue_token(&subject(), &issued).unwrap();
        assert!(decode_token(&token, &config()).is_err());
    }

    #[test]
    fn token_signed_with_another_key_is_rejected() {
        let other = TokenConfig::new(vec![9u8; 32]).unwrap();
        let token = issue_token(&subject(), &other).unwrap();
        assert!(matches!(
            decode_token(&token, &config()),
            Err(AuthnError::Token(_))
        ));
    }

    #[test]
    fn short_secrets_are_refused() {
        assert!(matches!(
            TokenConfig::new(vec![1u8; 8]),
            Err(AuthnError::WeakSecret(8))
        ));
        let encoded = STANDARD.encode([3u8; 48]);
        assert!(TokenConfig::from_base64(&encoded).is_ok());
        assert!(TokenConfig::from_base64("***").is_err());
    }
}
