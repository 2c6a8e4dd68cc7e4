//! Build-error reporter: fires only when the aggregated set contains a
//! synthetic `analyzer = "pipeline"`, `level = Error` issue, and emails the
//! revision author directly rather than the general recipient list.

use crate::errors::{ReportError, ReportResult};
use crate::types::{BuildErrorOutcome, BuildErrorReporterConfig, ClassifiedRun};

pub async fn maybe_send(cfg: &BuildErrorReporterConfig, run: &ClassifiedRun) -> ReportResult<Option<BuildErrorOutcome>> {
    if !run.has_build_error() {
        return Ok(None);
    }

    let failures: Vec<_> = run.issues.iter().filter(|i| i.analyzer == "pipeline").collect();
    let mut body = format!("Pipeline task(s) failed for {}\n\n", run.revision.revision_title);
    for issue in &failures {
        body.push_str(&format!("- {}\n", issue.message));
    }

    #[derive(serde::Serialize)]
    struct Req<'a> {
        to: &'a str,
        subject: &'a str,
        body: String,
    }

    let client = reqwest::Client::new();
    let resp = client
        .post(&cfg.webhook_url)
        .bearer_auth(&cfg.api_key)
        .json(&Req { to: &run.revision.author_email, subject: "Pipeline task failure", body })
        .send()
        .await?;

    if !resp.status().is_success() {
        return Err(ReportError::Platform(format!("build-error webhook failed: status={}", resp.status())));
    }

    Ok(Some(BuildErrorOutcome { sent: true }))
}

#[cfg(test)]
mod tests {
    use cr_analyzers::Level;
    use cr_backend_domain::{ProviderKind, RepoKind};

    use super::*;
    use crate::types::RevisionContext;

    fn ctx() -> RevisionContext {
        RevisionContext {
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
        }
    }

    #[tokio::test]
    async fn no_pipeline_error_is_a_noop() {
        let run = ClassifiedRun {
            revision: ctx(),
            issues: vec![cr_classify::Issue {
                hash: "h".to_string(),
                path: "a.rs".to_string(),
                line: Some(1),
                nb_lines: 1,
                check: None,
                analyzer: "clang-tidy".to_string(),
                message: "m".to_string(),
                body: None,
                level: Level::Error,
                in_patch: true,
                new_for_revision: true,
                publishable: true,
            }],
        };
        let cfg = BuildErrorReporterConfig { webhook_url: String::new(), api_key: String::new() };
        assert!(maybe_send(&cfg, &run).await.unwrap().is_none());
    }
}
