//! Runtime configuration for the ingestion client.

#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Base API URL of the CI system, e.g. "https://ci.example.org/api".
    pub base_api: String,
    /// Bearer credential for the CI system.
    pub token: String,
    /// Bounded parallelism for fetching task definitions/artifacts.
    pub max_parallel: usize,
    /// Maximum retry attempts for a transient failure.
    pub max_attempts: u32,
}

impl IngestConfig {
    pub fn new(base_api: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_api: base_api.into(),
            token: token.into(),
            max_parallel: 8,
            max_attempts: 5,
        }
    }
}
