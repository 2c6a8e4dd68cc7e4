//! Artifact Ingestion: task-group traversal, task status, artifact fetch.
//!
//! Given `(task_group_id, review_task_id)`, enumerate the tasks of the
//! group, fetch each task's definition/status, and fetch any declared
//! artifact by name. Transient transport failures are retried with
//! exponential backoff and jitter; permission failures are fatal.

pub mod client;
pub mod config;
pub mod errors;
pub mod retry;
pub mod types;

pub use client::IngestClient;
pub use config::IngestConfig;
pub use errors::{IngestError, IngestResult};
pub use types::{ArtifactBytes, TaskGroupId, TaskId, TaskRecord, TaskRef, TaskState};
