use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mirrors `cr_analyzers::Level`. A distinct, crate-local type because sqlx's
/// `Type`/`Decode`/`Encode` can't be implemented for a foreign enum here
/// (orphan rule) — `From` impls below keep the two in lockstep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "issue_level", rename_all = "lowercase")]
pub enum IssueLevel {
    Error,
    Warning,
}

impl From<cr_analyzers::Level> for IssueLevel {
    fn from(level: cr_analyzers::Level) -> Self {
        match level {
            cr_analyzers::Level::Error => IssueLevel::Error,
            cr_analyzers::Level::Warning => IssueLevel::Warning,
        }
    }
}

impl From<IssueLevel> for cr_analyzers::Level {
    fn from(level: IssueLevel) -> Self {
        match level {
            IssueLevel::Error => cr_analyzers::Level::Error,
            IssueLevel::Warning => cr_analyzers::Level::Warning,
        }
    }
}

/// The "source tree" role a Repository plays (try/head tree vs. base tree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "repo_kind", rename_all = "lowercase")]
pub enum RepoKind {
    Try,
    Head,
    Base,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "provider_kind", rename_all = "lowercase")]
pub enum ProviderKind {
    CodeReviewPlatform,
    PullRequestPlatform,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Repository {
    pub id: i64,
    pub slug: String,
    pub url: String,
    pub kind: RepoKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Revision {
    pub id: i64,
    pub provider: ProviderKind,
    pub provider_id: String,
    pub title: String,
    pub bug_id: Option<i64>,
    pub base_repository_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Diff {
    pub id: i64,
    pub revision_id: i64,
    pub provider_diff_id: i64,
    pub commit_hash: String,
    pub review_task_id: String,
    pub base_repository_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Issue {
    pub id: i64,
    pub hash: String,
    pub path: String,
    pub line: Option<i32>,
    pub nb_lines: i32,
    pub check: Option<String>,
    pub analyzer: String,
    pub level: IssueLevel,
    pub message: String,
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct IssueLink {
    pub issue_id: i64,
    pub diff_id: i64,
    pub revision_id: i64,
    pub in_patch: bool,
    pub new_for_revision: bool,
    pub publishable: bool,
}
