//! Shared application state.

use crate::auth::provider::{self, IdentityProvider};
use crate::config::AppConfig;
use std::sync::Arc;
use unigig_store::Store;
use unigig_token::{TokenIssuer, TokenVerifier};

/// Everything handlers need, constructed once at startup and injected into
/// the router. The store pool has an explicit connect/close lifecycle; there
/// is no ambient global handle.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<AppConfig>,
    pub store: Store,
    pub issuer: TokenIssuer,
    pub verifier: TokenVerifier,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    pub async fn init(cfg: AppConfig) -> anyhow::Result<Self> {
        let store = Store::connect(&cfg.database.url).await?;
        store.migrate().await?;

        // An empty secret is a fatal configuration error, not something to
        // discover on the first request.
        let ttl = chrono::Duration::hours(cfg.auth.token_ttl_hours);
        let issuer = TokenIssuer::with_ttl(&cfg.auth.jwt_secret, ttl)?;
        let verifier = TokenVerifier::new(&cfg.auth.jwt_secret)?;

        let identity = provider::from_config(&cfg.identity)?;

        Ok(Self {
            cfg: Arc::new(cfg),
            store,
            issuer,
            verifier,
            identity,
        })
    }

    pub async fn shutdown(&self) {
        self.store.close().await;
    }
}
