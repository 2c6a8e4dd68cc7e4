//! HTTP client for CI task-group/task/artifact retrieval (spec 4.1).
//!
//! Endpoints (REST, JSON):
//! - GET {base}/task-group/{id}/list?continuationToken=   (paginated)
//! - GET {base}/task/{id}
//! - GET {base}/task/{id}/runs/{run_id}/artifacts/{path}
//!
//! Mirrors `mr-reviewer::git_providers::gitlab::GitLabClient`: one `reqwest`
//! client, plain `async fn`s, no trait objects.

use std::collections::HashSet;

use reqwest::Client;
use serde::Deserialize;

use crate::config::IngestConfig;
use crate::errors::{IngestError, IngestResult};
use crate::retry::with_retry;
use crate::types::{ArtifactBytes, TaskGroupId, TaskId, TaskRecord, TaskRef, TaskState};

#[derive(Debug, Clone)]
pub struct IngestClient {
    http: Client,
    cfg: IngestConfig,
}

impl IngestClient {
    pub fn new(cfg: IngestConfig) -> IngestResult<Self> {
        let http = Client::builder()
            .user_agent("cr-pipeline/0.1")
            .build()
            .map_err(|e| IngestError::Fatal(e.to_string()))?;
        Ok(Self { http, cfg })
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.bearer_auth(&self.cfg.token)
    }

    /// Enumerates the members of a task group. Finite, de-duplicated by
    /// `task_id`, restartable: each page fetch is independently retried, and
    /// the continuation token comes from the server so a caller can resume
    /// mid-listing by keeping the last token (not currently exposed, since
    /// every caller in this workspace consumes the whole group eagerly).
    pub async fn list_group(&self, group: &TaskGroupId) -> IngestResult<Vec<TaskRef>> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let page = with_retry(self.cfg.max_attempts, || {
                let token = token.clone();
                async move { self.fetch_group_page(group, token.as_deref()).await }
            })
            .await?;

            for entry in page.task_group.as_ref().map(|t| t.tasks.as_slice()).unwrap_or(&[]) {
                let id = TaskId(entry.status.task_id.clone());
                if seen.insert(id.clone()) {
                    out.push(TaskRef {
                        task_id: id,
                        label: entry.task.metadata.as_ref().map(|m| m.name.clone()),
                    });
                }
            }

            match page
                .task_group
                .and_then(|t| t.continuation_token)
                .filter(|t| !t.is_empty())
            {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        Ok(out)
    }

    async fn fetch_group_page(
        &self,
        group: &TaskGroupId,
        continuation: Option<&str>,
    ) -> IngestResult<GroupListResponse> {
        let mut url = format!("{}/task-group/{}/list", self.cfg.base_api, group.0);
        if let Some(tok) = continuation {
            url.push_str("?continuationToken=");
            url.push_str(&urlencoding::encode(tok));
        }
        let resp = self.auth(self.http.get(url)).send().await?;
        let resp = map_status(resp).await?;
        Ok(resp.json::<GroupListResponseRaw>().await?.into())
    }

    pub async fn get_task(&self, task: &TaskId) -> IngestResult<TaskRecord> {
        with_retry(self.cfg.max_attempts, || async {
            let url = format!("{}/task/{}", self.cfg.base_api, task.0);
            let resp = self.auth(self.http.get(url)).send().await?;
            let resp = map_status(resp).await?;
            let raw: TaskStatusRaw = resp.json().await?;
            Ok(raw.into())
        })
        .await
    }

    /// Returns `Ok(None)` on 404 (artifact not declared / not present).
    pub async fn get_artifact(
        &self,
        task: &TaskId,
        run_id: u32,
        path: &str,
    ) -> IngestResult<ArtifactBytes> {
        with_retry(self.cfg.max_attempts, || async {
            let url = format!(
                "{}/task/{}/runs/{}/artifacts/{}",
                self.cfg.base_api,
                task.0,
                run_id,
                urlencoding::encode(path)
            );
            let resp = self.auth(self.http.get(url)).send().await?;
            if resp.status() == reqwest::StatusCode::NOT_FOUND {
                return Ok(None);
            }
            let resp = map_status(resp).await?;
            Ok(Some(resp.bytes().await?.to_vec()))
        })
        .await
    }
}

async fn map_status(resp: reqwest::Response) -> IngestResult<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let code = status.as_u16();
    match code {
        401 | 403 => Err(IngestError::Fatal(format!("http status {code}"))),
        429 | 500..=599 => Err(IngestError::Transient(format!("http status {code}"))),
        _ => Err(IngestError::InvalidResponse(format!("http status {code}"))),
    }
}

// --- wire shapes -----------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GroupListResponseRaw {
    #[serde(rename = "taskGroupId")]
    #[allow(dead_code)]
    task_group_id: Option<String>,
    tasks: Vec<GroupTaskEntryRaw>,
    #[serde(rename = "continuationToken")]
    continuation_token: Option<String>,
}

struct GroupListResponse {
    task_group: Option<GroupListInner>,
}

struct GroupListInner {
    tasks: Vec<GroupTaskEntryRaw>,
    continuation_token: Option<String>,
}

impl From<GroupListResponseRaw> for GroupListResponse {
    fn from(raw: GroupListResponseRaw) -> Self {
        GroupListResponse {
            task_group: Some(GroupListInner {
                tasks: raw.tasks,
                continuation_token: raw.continuation_token,
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GroupTaskEntryRaw {
    status: GroupTaskStatusRaw,
    task: GroupTaskDefRaw,
}

#[derive(Debug, Deserialize)]
struct GroupTaskStatusRaw {
    #[serde(rename = "taskId")]
    task_id: String,
}

#[derive(Debug, Deserialize)]
struct GroupTaskDefRaw {
    metadata: Option<GroupTaskMetadataRaw>,
}

#[derive(Debug, Deserialize)]
struct GroupTaskMetadataRaw {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TaskStatusRaw {
    #[serde(default)]
    name: String,
    #[serde(default)]
    tags: std::collections::BTreeMap<String, String>,
    state: String,
    #[serde(rename = "runId", default)]
    run_id: u32,
}

impl From<TaskStatusRaw> for TaskRecord {
    fn from(raw: TaskStatusRaw) -> Self {
        let state = match raw.state.as_str() {
            "pending" => TaskState::Pending,
            "running" => TaskState::Running,
            "completed" => TaskState::Completed,
            "failed" => TaskState::Failed,
            _ => TaskState::Exception,
        };
        TaskRecord {
            name: raw.name,
            tags: raw.tags,
            state,
            run_id: raw.run_id,
        }
    }
}
