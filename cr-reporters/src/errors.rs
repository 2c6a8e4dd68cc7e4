use thiserror::Error;

pub type ReportResult<T> = Result<T, ReportError>;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Backend(#[from] cr_backend_domain::DomainError),

    #[error("platform publish failed: {0}")]
    Platform(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
