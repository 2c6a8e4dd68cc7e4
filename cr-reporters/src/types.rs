use cr_classify::Issue;
use cr_backend_domain::{ProviderKind, RepoKind};
use serde::{Deserialize, Serialize};

/// Everything a reporter needs about the run it is publishing, resolved once
/// by `cr-pipeline` from the ingested bundle and handed to every reporter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevisionContext {
    pub repository_slug: String,
    pub repository_url: String,
    pub repository_kind: RepoKind,
    pub provider: ProviderKind,
    pub revision_provider_id: String,
    pub revision_title: String,
    pub bug_id: Option<i64>,
    pub provider_diff_id: i64,
    pub commit_hash: String,
    pub review_task_id: String,
    /// Resolved via `ChangeRequest::author` from the ingested bundle (spec 4.4).
    pub author_email: String,
}

/// The classified, aggregated, sorted issue set plus the context every
/// reporter needs. Built once per run and shared read-only across reporters.
#[derive(Debug, Clone)]
pub struct ClassifiedRun {
    pub revision: RevisionContext,
    pub issues: Vec<Issue>,
}

impl ClassifiedRun {
    pub fn has_build_error(&self) -> bool {
        self.issues.iter().any(|i| i.analyzer == "pipeline" && i.level == cr_analyzers::Level::Error)
    }
}

/// Writes go straight through `cr-backend-domain::Store` — there is no
/// separate network hop to configure, so this carries no fields today. Kept
/// as a distinct variant/type (rather than folding backend into a bool) so
/// the dispatch ordering rule in spec 4.4 has something concrete to match on.
#[derive(Debug, Clone, Default)]
pub struct BackendReporterConfig {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformKind {
    GitLab,
}

#[derive(Debug, Clone)]
pub struct PlatformReporterConfig {
    pub kind: PlatformKind,
    pub base_api: String,
    pub token: String,
    pub project: String,
    pub iid: u64,
    /// Analyzers excluded from this platform's inline/summary output
    /// (still written to the backend and included in the email digest).
    pub analyzers_skipped: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct EmailReporterConfig {
    pub webhook_url: String,
    pub api_key: String,
    pub recipients: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct BuildErrorReporterConfig {
    pub webhook_url: String,
    pub api_key: String,
}

/// One enum, no trait object (teacher's no-`Box<dyn>` rule).
#[derive(Debug, Clone)]
pub enum Reporter {
    Backend(BackendReporterConfig),
    Platform(PlatformReporterConfig),
    Email(EmailReporterConfig),
    BuildError(BuildErrorReporterConfig),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendOutcome {
    pub issues_written: usize,
    pub links_written: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Published { inline: usize, summary: bool },
    AlreadyPublished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailOutcome {
    pub sent_to: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildErrorOutcome {
    pub sent: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DispatchOutcome {
    pub backend: Option<BackendOutcome>,
    pub platform: Option<PublishOutcome>,
    pub email: Option<EmailOutcome>,
    pub build_error: Option<BuildErrorOutcome>,
    pub partial_failures: Vec<String>,
}
