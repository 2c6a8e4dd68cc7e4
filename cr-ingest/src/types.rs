//! Provider-agnostic data model for the CI task group this pipeline ingests.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskGroupId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub String);

/// One member of a task group, as returned by `list_group`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRef {
    pub task_id: TaskId,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskState {
    Pending,
    Running,
    Completed,
    Failed,
    Exception,
}

impl TaskState {
    /// Non-terminal tasks are skipped by the caller (spec 4.1): ingestion
    /// itself never judges state, it only reports it.
    pub fn is_terminal(self) -> bool {
        !matches!(self, TaskState::Pending | TaskState::Running)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub name: String,
    pub tags: std::collections::BTreeMap<String, String>,
    pub state: TaskState,
    pub run_id: u32,
}

/// `Ok(None)` means "artifact not found" -- never an error at this layer.
pub type ArtifactBytes = Option<Vec<u8>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_and_running_are_non_terminal() {
        assert!(!TaskState::Pending.is_terminal());
        assert!(!TaskState::Running.is_terminal());
    }

    #[test]
    fn completed_failed_exception_are_terminal() {
        assert!(TaskState::Completed.is_terminal());
        assert!(TaskState::Failed.is_terminal());
        assert!(TaskState::Exception.is_terminal());
    }
}
