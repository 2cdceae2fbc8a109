//! Store error types.

use thiserror::Error;

/// Errors surfaced by the repository layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write (duplicate email, duplicate
    /// review, concurrent conversation creation).
    #[error("unique constraint violated")]
    Conflict,

    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(sqlx::Error),

    /// Failed to run migrations at startup.
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if is_unique_violation(&e) {
            Self::Conflict
        } else {
            Self::Database(e)
        }
    }
}

/// Postgres signals unique violations with SQLSTATE 23505.
fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => db.code().as_deref() == Some("23505"),
        _ => false,
    }
}
