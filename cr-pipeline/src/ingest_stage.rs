//! Ingestion fan-out / parsing fan-in (spec 5: bounded queue, default 64
//! pending tasks). `cr-ingest` only reports task state; this module decides
//! which states are processed, mirroring the single-responsibility split
//! spec 4.1 calls out.

use std::sync::Arc;

use cr_analyzers::ParseResult;
use cr_ingest::{IngestClient, TaskGroupId, TaskRecord, TaskRef};
use tokio::sync::{mpsc, Semaphore};

use crate::errors::PipelineResult;

/// The artifact path convention this pipeline assumes when a task doesn't
/// declare its own (mirrors the real code-review bot's `public/code-review/`
/// artifact namespace).
const DEFAULT_ARTIFACT_PATH: &str = "public/code-review/issues.json";

#[derive(Debug, Clone)]
pub struct TaskOutcome {
    pub task_name: String,
    /// `Ok` carries the parsed issues; `Err` carries `(check_id, message)`
    /// for the synthetic `pipeline` issue the classify stage lifts it into.
    pub result: Result<ParseResult, (String, String)>,
}

fn artifact_path_for(record: &TaskRecord) -> String {
    record.tags.get("artifact-path").cloned().unwrap_or_else(|| DEFAULT_ARTIFACT_PATH.to_string())
}

async fn fetch_and_parse_one(client: &IngestClient, task_ref: &TaskRef) -> Option<TaskOutcome> {
    let fallback_name = task_ref.label.clone().unwrap_or_else(|| task_ref.task_id.0.clone());

    let record = match client.get_task(&task_ref.task_id).await {
        Ok(record) => record,
        Err(e) => return Some(TaskOutcome { task_name: fallback_name, result: Err(("task-error".to_string(), e.to_string())) }),
    };

    if !record.state.is_terminal() {
        // Pending/running tasks are skipped here, not judged by cr-ingest.
        return None;
    }

    let artifact_path = artifact_path_for(&record);
    let artifact = match client.get_artifact(&task_ref.task_id, record.run_id, &artifact_path).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            return Some(TaskOutcome {
                task_name: record.name,
                result: Err(("artifact-missing".to_string(), format!("artifact not found at {artifact_path}"))),
            })
        }
        Err(e) => return Some(TaskOutcome { task_name: record.name, result: Err(("fetch-error".to_string(), e.to_string())) }),
    };

    let parsed = cr_analyzers::parse_artifact(&record.name, &artifact_path, &artifact);
    Some(TaskOutcome { task_name: record.name, result: Ok(parsed) })
}

/// Enumerates the task group, then fetches+parses every member with
/// `max_parallel` fan-out feeding a bounded channel of `queue_capacity` --
/// producers naturally block once the channel is full (spec 5 backpressure).
pub async fn ingest_and_parse(
    client: &IngestClient,
    group: &TaskGroupId,
    max_parallel: usize,
    queue_capacity: usize,
) -> PipelineResult<Vec<TaskOutcome>> {
    let refs = client.list_group(group).await?;
    let (tx, mut rx) = mpsc::channel::<TaskOutcome>(queue_capacity.max(1));
    let semaphore = Arc::new(Semaphore::new(max_parallel.max(1)));

    let mut handles = Vec::with_capacity(refs.len());
    for task_ref in refs {
        let client = client.clone();
        let tx = tx.clone();
        let semaphore = semaphore.clone();
        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore never closed");
            if let Some(outcome) = fetch_and_parse_one(&client, &task_ref).await {
                let _ = tx.send(outcome).await;
            }
        }));
    }
    drop(tx);

    let mut outcomes = Vec::new();
    while let Some(outcome) = rx.recv().await {
        outcomes.push(outcome);
    }

    for handle in handles {
        handle.await.map_err(|e| crate::errors::PipelineError::Join(e.to_string()))?;
    }

    Ok(outcomes)
}
