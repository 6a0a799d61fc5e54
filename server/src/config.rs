use anyhow::{Context, Result};
use platform_authn::{DEFAULT_AUDIENCE, DEFAULT_ISSUER, DEFAULT_TTL_HOURS, TokenConfig};
use tracing::warn;

/// Signing key used when `JWT_SECRET_BASE64` is unset. Development only.
const DEV_SECRET: &[u8] = b"payroll-analytics-development-signing-key";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub default_tenant: String,
    pub cors_allowed_origins: Vec<String>,
    pub tokens: TokenConfig,
    /// When false, bearer tokens are optional and the audit routes are open.
    pub auth_enforced: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let default_tenant = lookup("DEFAULT_TENANT").unwrap_or_else(|| "default".into());

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>();

        let tokens = match lookup("JWT_SECRET_BASE64") {
            Some(encoded) => {
                TokenConfig::from_base64(encoded.trim()).context("invalid JWT_SECRET_BASE64")?
            }
            None => {
                warn!("JWT_SECRET_BASE64 not set; using the development signing key");
                TokenConfig::new(DEV_SECRET.to_vec())?
            }
        };
        let ttl_hours = match lookup("JWT_TTL_HOURS") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .with_context(|| format!("invalid JWT_TTL_HOURS {raw:?}"))?,
            None => DEFAULT_TTL_HOURS,
        };
        let tokens = tokens
            .with_issuer(lookup("JWT_ISSUER").unwrap_or_else(|| DEFAULT_ISSUER.into()))
            .with_audience(lookup("JWT_AUDIENCE").unwrap_or_else(|| DEFAULT_AUDIENCE.into()))
            .with_ttl_hours(ttl_hours);

        let auth_enforced = lookup("AUTH_ENFORCED")
            .map(|val| matches!(val.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            default_tenant,
            cors_allowed_origins,
            tokens,
            auth_enforced,
        })
    }

    #[cfg(test)]
    pub fn for_tests(auth_enforced: bool) -> Self {
        let mut config =
            Self::from_lookup(|_| None).expect("development config always loads");
        config.auth_enforced = auth_enforced;
        config
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_are_development_friendly() {
        let config = load(&[]).unwrap();
        assert_eq!(config.default_tenant, "default");
        assert_eq!(config.cors_allowed_origins, vec!["http://localhost:5173"]);
        assert!(!config.auth_enforced);
        assert_eq!(config.tokens.issuer, DEFAULT_ISSUER);
        assert_eq!(config.tokens.ttl_hours, DEFAULT_TTL_HOURS);
    }

    #[test]
    fn overrides_are_applied() {
        let config = load(&[
            ("CORS_ALLOWED_ORIGINS", "https://a.test, ,https://b.test"),
            ("AUTH_ENFORCED", "Yes"),
            ("JWT_TTL_HOURS", "2"),
            ("JWT_ISSUER", "issuer"),
            ("DEFAULT_TENANT", "acme"),
        ])
        .unwrap();
        assert_eq!(
            config.cors_allowed_origins,
            vec!["https://a.test", "https://b.test"]
        );
        assert!(config.auth_enforced);
        assert_eq!(config.tokens.ttl_hours, 2);
        assert_eq!(config.tokens.issuer, "issuer");
        assert_eq!(config.default_tenant, "acme");
    }

    #[test]
    fn short_or_malformed_secrets_are_rejected() {
        assert!(load(&[("JWT_SECRET_BASE64", "c2hvcnQ=")]).is_err());
        assert!(load(&[("JWT_SECRET_BASE64", "not base64!")]).is_err());
        assert!(load(&[("JWT_TTL_HOURS", "eight")]).is_err());
    }
}
