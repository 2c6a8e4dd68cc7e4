use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Ingest(#[from] cr_ingest::IngestError),

    #[error(transparent)]
    Report(#[from] cr_reporters::ReportError),

    #[error(transparent)]
    Domain(#[from] cr_backend_domain::DomainError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("task worker panicked: {0}")]
    Join(String),

    /// The run's wall-clock deadline elapsed before completion (spec 5/6);
    /// no reporter is ever invoked once this is returned.
    #[error("run deadline exceeded")]
    Deadline,
}
