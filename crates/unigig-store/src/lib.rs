//! # unigig-store
//!
//! Postgres repository layer for the unigig marketplace.
//!
//! The [`Store`] owns the connection pool. It is constructed once at startup
//! with an explicit connect/migrate lifecycle and injected into handlers
//! through application state; nothing in this crate holds ambient global
//! state. Queries are runtime-checked `sqlx` queries; responses are shaped
//! into the camelCase views in [`models`].

pub mod activity;
pub mod categories;
pub mod conversations;
pub mod error;
pub mod gigs;
pub mod models;
pub mod reviews;
pub mod services;
pub mod users;

pub use error::StoreError;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Repository handle over a shared Postgres pool. Cheap to clone.
#[derive(Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    /// Connect to Postgres.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool (used by tests).
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run pending migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Close the pool. Called on shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub(crate) fn pool(&self) -> &PgPool {
        &self.pool
    }
}
