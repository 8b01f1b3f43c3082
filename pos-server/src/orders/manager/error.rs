use thiserror::Error;

use crate::db::repository::RepoError;
use crate::utils::AppError;

/// Order engine errors
#[derive(Debug, Error)]
pub enum OrderError {
    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error("{0}")]
    NotFound(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl From<sqlx::Error> for OrderError {
    fn from(err: sqlx::Error) -> Self {
        OrderError::Repo(err.into())
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::Repo(e) => e.into(),
            OrderError::NotFound(msg) => AppError::not_found(msg),
            OrderError::InvalidOperation(msg) => AppError::validation(msg),
        }
    }
}

pub type ManagerResult<T> = Result<T, OrderError>;
