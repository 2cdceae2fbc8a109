//! External identity provider.
//!
//! Registration mirrors each user into an external identity service and
//! login (optionally) signs in against it; the gateway's secondary session
//! check also goes through here. The trait keeps the rest of the server
//! independent of the concrete provider (HTTP service in deployment,
//! disabled in development and tests).

use crate::config::IdentityConfig;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("identity provider rejected the request: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an upstream identity record. Returns its id when the provider
    /// is active, `None` when disabled.
    async fn create_identity(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<String>, IdentityError>;

    /// Remove an upstream identity. Used as best-effort compensation when a
    /// local registration write fails after the upstream record was created.
    async fn delete_identity(&self, identity_id: &str) -> Result<(), IdentityError>;

    /// Verify credentials upstream.
    async fn sign_in(&self, email: &str, password: &str) -> Result<(), IdentityError>;

    /// Whether some active session exists at the provider. Existence only:
    /// the session is not matched against any particular user, so this is a
    /// weak check, not an authorization guarantee.
    async fn has_active_session(&self) -> Result<bool, IdentityError>;
}

/// Build the provider selected by configuration.
pub fn from_config(cfg: &IdentityConfig) -> anyhow::Result<Arc<dyn IdentityProvider>> {
    if !cfg.enabled {
        return Ok(Arc::new(DisabledProvider));
    }
    if cfg.base_url.trim().is_empty() {
        anyhow::bail!("identity provider enabled but [identity].base_url is empty");
    }
    Ok(Arc::new(HttpIdentityProvider::new(
        cfg.base_url.trim_end_matches('/').to_string(),
        cfg.service_key.clone(),
    )))
}

/// No-op provider: local credentials are the only system of record.
pub struct DisabledProvider;

#[async_trait]
impl IdentityProvider for DisabledProvider {
    async fn create_identity(
        &self,
        _email: &str,
        _password: &str,
    ) -> Result<Option<String>, IdentityError> {
        Ok(None)
    }

    async fn delete_identity(&self, _identity_id: &str) -> Result<(), IdentityError> {
        Ok(())
    }

    async fn sign_in(&self, _email: &str, _password: &str) -> Result<(), IdentityError> {
        Ok(())
    }

    async fn has_active_session(&self) -> Result<bool, IdentityError> {
        Ok(true)
    }
}

/// HTTP-backed provider speaking a GoTrue-style admin API.
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
}

#[derive(Debug, Deserialize)]
struct CreatedIdentity {
    id: String,
}

impl HttpIdentityProvider {
    pub fn new(base_url: String, service_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            service_key,
        }
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn create_identity(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<String>, IdentityError> {
        let resp = self
            .client
            .post(format!("{}/admin/users", self.base_url))
            .bearer_auth(&self.service_key)
            .json(&json!({
                "email": email,
                "password": password,
                "email_confirm": true,
            }))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(IdentityError::Rejected(format!(
                "create identity returned {}",
                resp.status()
            )));
        }
        let created: CreatedIdentity = resp.json().await?;
        Ok(Some(created.id))
    }

    async fn delete_identity(&self, identity_id: &str) -> Result<(), IdentityError> {
        let resp = self
            .client
            .delete(format!("{}/admin/users/{}", self.base_url, identity_id))
            .bearer_auth(&self.service_key)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(IdentityError::Rejected(format!(
                "delete identity returned {}",
                resp.status()
            )));
        }
        Ok(())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<(), IdentityError> {
        let resp = self
            .client
            .post(format!("{}/token?grant_type=password", self.base_url))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(IdentityError::Rejected(format!(
                "sign in returned {}",
                resp.status()
            )));
        }
        Ok(())
    }

    async fn has_active_session(&self) -> Result<bool, IdentityError> {
        let resp = self
            .client
            .get(format!("{}/session", self.base_url))
            .bearer_auth(&self.service_key)
            .send()
            .await?;
        Ok(resp.status().is_success())
    }
}
