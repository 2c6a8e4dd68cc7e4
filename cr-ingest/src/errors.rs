//! Crate-wide error hierarchy for `cr-ingest`.
//!
//! Goals mirror the rest of the pipeline: a single root `Error` for public
//! functions, a CI-system-aware mapping (401/403 -> fatal, 429/5xx/timeout
//! -> transient and therefore retryable), no dynamic dispatch.

use thiserror::Error;

pub type IngestResult<T> = Result<T, IngestError>;

#[derive(Debug, Error)]
pub enum IngestError {
    /// Authentication/permission failure. Never retried; aborts the run.
    #[error("fatal ingestion error: {0}")]
    Fatal(String),

    /// Transient transport failure (5xx, timeout, 429). Retried with backoff
    /// by the caller; surfaced only once retries are exhausted.
    #[error("transient ingestion error: {0}")]
    Transient(String),

    /// Malformed/unexpected response body.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl From<reqwest::Error> for IngestError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return IngestError::Transient("timeout".into());
        }
        if let Some(status) = e.status() {
            let code = status.as_u16();
            return match code {
                401 | 403 => IngestError::Fatal(format!("http status {code}")),
                404 => IngestError::InvalidResponse("not found".into()),
                429 => IngestError::Transient("rate limited".into()),
                500..=599 => IngestError::Transient(format!("server error {code}")),
                _ => IngestError::InvalidResponse(format!("http status {code}")),
            };
        }
        IngestError::Transient(format!("network error: {e}"))
    }
}
