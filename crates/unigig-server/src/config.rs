//! Server configuration.
//!
//! Loaded from a TOML file (path via `UNIGIG_CONFIG`, default `config.toml`;
//! missing file falls back to defaults) with env overrides for the values
//! that differ per deployment. An empty JWT secret is not caught here; the
//! token issuer rejects it at startup.

use serde::{Deserialize, Serialize};
use std::{env, fs, path::PathBuf};
use unigig_core::PasswordPolicy;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address, e.g. "0.0.0.0:3001"
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "0.0.0.0:3001".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection URL. Env override: `DATABASE_URL`.
    #[serde(default = "default_database_url")]
    pub url: String,
}

fn default_database_url() -> String {
    "postgres://localhost:5432/unigig".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Token signing secret. Env override: `UNIGIG_JWT_SECRET`.
    /// Must be non-empty; startup fails otherwise.
    #[serde(default)]
    pub jwt_secret: String,

    /// Credential lifetime in hours.
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,

    /// When enabled, the gateway additionally requires that some active
    /// session exists at the identity provider. The check is existence-only;
    /// it does not match the session against the token subject.
    #[serde(default)]
    pub session_check: bool,

    #[serde(default)]
    pub password_policy: PasswordPolicy,
}

fn default_token_ttl_hours() -> i64 {
    unigig_token::DEFAULT_TTL_HOURS
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_hours: default_token_ttl_hours(),
            session_check: false,
            password_policy: PasswordPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// When false, no external identity records are created and sign-in
    /// defers entirely to the local credential check.
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub base_url: String,

    /// Service-role key sent as a bearer token on admin calls.
    /// Env override: `UNIGIG_IDENTITY_SERVICE_KEY`.
    #[serde(default)]
    pub service_key: String,
}

pub fn load_config() -> anyhow::Result<AppConfig> {
    let path = config_path();
    let mut cfg: AppConfig = if path.exists() {
        toml::from_str(&fs::read_to_string(&path)?)?
    } else {
        AppConfig::default()
    };

    if let Ok(url) = env::var("DATABASE_URL") {
        cfg.database.url = url;
    }
    if let Ok(secret) = env::var("UNIGIG_JWT_SECRET") {
        cfg.auth.jwt_secret = secret;
    }
    if let Ok(key) = env::var("UNIGIG_IDENTITY_SERVICE_KEY") {
        cfg.identity.service_key = key;
    }
    if let Ok(bind) = env::var("UNIGIG_BIND") {
        cfg.server.bind = bind;
    }

    Ok(cfg)
}

fn config_path() -> PathBuf {
    if let Ok(p) = env::var("UNIGIG_CONFIG") {
        return PathBuf::from(p);
    }
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.bind, "0.0.0.0:3001");
        assert_eq!(cfg.auth.token_ttl_hours, 24);
        assert!(!cfg.auth.session_check);
        assert!(!cfg.identity.enabled);
        assert!(cfg.auth.jwt_secret.is_empty());
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [auth]
            jwt_secret = "s3cret"
            session_check = true

            [identity]
            enabled = true
            base_url = "http://localhost:9999"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.auth.jwt_secret, "s3cret");
        assert!(cfg.auth.session_check);
        assert!(cfg.identity.enabled);
        assert_eq!(cfg.server.bind, "0.0.0.0:3001");
        assert_eq!(cfg.auth.password_policy.min_length, 8);
    }
}
