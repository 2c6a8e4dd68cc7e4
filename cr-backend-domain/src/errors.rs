//! Crate-wide error hierarchy, mirroring `mr-reviewer::errors`'s layering:
//! one root error, `From` impls for ergonomic `?`, no dynamic dispatch.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("not found")]
    NotFound,

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
