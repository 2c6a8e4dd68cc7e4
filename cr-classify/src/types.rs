use cr_analyzers::Level;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Issue {
    pub hash: String,
    pub path: String,
    pub line: Option<u32>,
    pub nb_lines: u32,
    pub check: Option<String>,
    pub analyzer: String,
    pub level: Level,
    pub message: String,
    pub body: Option<String>,
    pub in_patch: bool,
    pub new_for_revision: bool,
    pub publishable: bool,
}

/// Outcome of parsing one task's artifact(s), as fed into aggregation.
/// A task that failed outright (missing artifact, parser crash boundary,
/// exhausted retries) carries `Err` and is lifted into a synthetic
/// `analyzer = "pipeline"` issue rather than dropped (spec 4.3).
pub type ParseOutcome = Result<Vec<cr_analyzers::RawIssue>, String>;
