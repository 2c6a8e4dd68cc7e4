//! Backend reporter: idempotent upsert of a run's issues into the system of
//! record. One in-flight write per `revision_id`, the same keyed-lock-table
//! idiom `mr-reviewer::publish::gitlab` uses for `max_concurrency`, scoped
//! here to a mutex per revision instead of a shared semaphore permit count.

use std::collections::HashMap;
use std::sync::Arc;

use cr_backend_domain::{IssueLevel, Store};
use tokio::sync::Mutex;

use crate::errors::ReportResult;
use crate::types::{BackendOutcome, ClassifiedRun};

pub struct BackendReporter<S: Store> {
    store: Arc<S>,
    locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl<S: Store> BackendReporter<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store, locks: Mutex::new(HashMap::new()) }
    }

    /// Exposes the underlying store so callers can resolve a revision's
    /// prior hashes before classification runs (the backend write itself
    /// happens later, in `dispatch`).
    pub fn store(&self) -> &S {
        &self.store
    }

    async fn lock_for(&self, revision_id: i64) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(revision_id).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }

    pub async fn publish(&self, run: &ClassifiedRun) -> ReportResult<BackendOutcome> {
        let ctx = &run.revision;
        let repository = self
            .store
            .upsert_repository(&ctx.repository_slug, &ctx.repository_url, ctx.repository_kind)
            .await?;
        let revision = self
            .store
            .upsert_revision(ctx.provider, &ctx.revision_provider_id, &ctx.revision_title, ctx.bug_id, repository.id)
            .await?;

        // Serialize concurrent runs that land on the same revision (e.g. a
        // retried diff and its predecessor publishing at the same time).
        let lock = self.lock_for(revision.id).await;
        let _guard = lock.lock().await;

        let diff = self
            .store
            .upsert_diff(revision.id, ctx.provider_diff_id, &ctx.commit_hash, &ctx.review_task_id, repository.id)
            .await?;

        let mut issues_written = 0;
        let mut links_written = 0;
        for issue in &run.issues {
            let row = self
                .store
                .upsert_issue(
                    &issue.hash,
                    &issue.path,
                    issue.line.map(|l| l as i32),
                    issue.nb_lines as i32,
                    issue.check.as_deref(),
                    &issue.analyzer,
                    IssueLevel::from(issue.level),
                    &issue.message,
                    issue.body.as_deref(),
                )
                .await?;
            issues_written += 1;

            self.store
                .upsert_issue_link(row.id, diff.id, revision.id, issue.in_patch, issue.new_for_revision, issue.publishable)
                .await?;
            links_written += 1;
        }

        Ok(BackendOutcome { issues_written, links_written })
    }
}

#[cfg(test)]
mod tests {
    use cr_analyzers::Level;
    use cr_backend_domain::{InMemoryStore, ProviderKind, RepoKind};

    use super::*;
    use crate::types::RevisionContext;

    fn sample_run() -> ClassifiedRun {
        ClassifiedRun {
            revision: RevisionContext {
                repository_slug: "org/repo".to_string(),
                repository_url: "https://example.com/org/repo".to_string(),
                repository_kind: RepoKind::Base,
                provider: ProviderKind::CodeReviewPlatform,
                revision_provider_id: "mr-1".to_string(),
                revision_title: "Fix the thing".to_string(),
                bug_id: None,
                provider_diff_id: 1,
                commit_hash: "a".repeat(40),
                review_task_id: "task-1".to_string(),
                author_email: "author@example.com".to_string(),
            },
            issues: vec![cr_classify::Issue {
                hash: "deadbeef".to_string(),
                path: "src/lib.rs".to_string(),
                line: Some(10),
                nb_lines: 1,
                check: Some("unused".to_string()),
                analyzer: "clang-tidy".to_string(),
                level: Level::Error,
                message: "unused variable".to_string(),
                body: None,
                in_patch: true,
                new_for_revision: true,
                publishable: true,
            }],
        }
    }

    #[tokio::test]
    async fn publish_writes_issue_and_link_once() {
        let store = Arc::new(InMemoryStore::new());
        let reporter = BackendReporter::new(store.clone());
        let run = sample_run();

        let outcome = reporter.publish(&run).await.unwrap();
        assert_eq!(outcome.issues_written, 1);
        assert_eq!(outcome.links_written, 1);

        // Republishing the same run is idempotent: the underlying store
        // upserts by natural key, so row counts don't double.
        reporter.publish(&run).await.unwrap();
        let repos = store.list_repositories().await.unwrap();
        assert_eq!(repos.len(), 1);
    }
}
