//! Repository Module
//!
//! Tenant-scoped CRUD over SQLite. Every query filters by `restaurant_id`;
//! a row of another tenant is reported as not found.

pub mod category;
pub mod dining_table;
pub mod group;
pub mod item;
pub mod ivm_order;
pub mod order;
pub mod restaurant;
pub mod section;
pub mod spoilage;
pub mod tag;
pub mod user;
pub mod vendor;
pub mod waiter;

use thiserror::Error;

use crate::utils::AppError;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepoError::Duplicate(db_err.message().to_string())
            }
            sqlx::Error::RowNotFound => RepoError::NotFound("Row not found".to_string()),
            _ => RepoError::Database(err.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::not_found(msg),
            RepoError::Duplicate(msg) => AppError::conflict(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::InsufficientStock(msg) => AppError::insufficient_stock(msg),
            RepoError::Database(msg) => AppError::database(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Turn a missing row into [`RepoError::NotFound`]
pub(crate) fn require<T>(value: Option<T>, what: &str, id: i64) -> RepoResult<T> {
    value.ok_or_else(|| RepoError::NotFound(format!("{what} {id} not found")))
}

#[cfg(test)]
pub(crate) mod testing {
    //! Fixtures shared by repository and engine tests

    use sqlx::SqlitePool;

    use crate::db::DbService;

    pub const RESTAURANT: i64 = 1;
    pub const OTHER_RESTAURANT: i64 = 2;

    /// Fresh in-memory database with two tenants
    pub async fn pool() -> SqlitePool {
        let db = DbService::in_memory().await.unwrap();
        for (id, name) in [(RESTAURANT, "Spice Route"), (OTHER_RESTAURANT, "Other Place")] {
            sqlx::query(
                "INSERT INTO restaurant (id, name, owner_id, created_at, updated_at) VALUES (?, ?, 100, 0, 0)",
            )
            .bind(id)
            .bind(name)
            .execute(&db.pool)
            .await
            .unwrap();
        }
        db.pool
    }
}
