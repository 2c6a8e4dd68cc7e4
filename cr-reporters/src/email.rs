//! Email reporter: one digest per run, listing every issue regardless of
//! `publishable` (spec 4.4). Delivery goes through a transactional-email
//! webhook rather than SMTP directly, the same "one `reqwest::Client`,
//! one JSON POST" shape `mr-reviewer::publish::gitlab` uses for its provider.

use crate::errors::{ReportError, ReportResult};
use crate::types::{ClassifiedRun, EmailOutcome, EmailReporterConfig};

fn render_digest(run: &ClassifiedRun) -> String {
    let mut body = format!("### Code review digest for {}\n\n", run.revision.revision_title);
    for issue in &run.issues {
        body.push_str(&format!(
            "- `{}:{}` [{}/{}] {} (publishable={})\n",
            issue.path,
            issue.line.unwrap_or(0),
            issue.analyzer,
            issue.check.as_deref().unwrap_or("-"),
            issue.message,
            issue.publishable,
        ));
    }
    body
}

pub async fn send(cfg: &EmailReporterConfig, run: &ClassifiedRun) -> ReportResult<EmailOutcome> {
    if cfg.recipients.is_empty() {
        return Ok(EmailOutcome { sent_to: 0 });
    }

    #[derive(serde::Serialize)]
    struct Req<'a> {
        to: &'a [String],
        subject: String,
        body: String,
    }

    let req = Req {
        to: &cfg.recipients,
        subject: format!("Code review digest: {}", run.revision.revision_title),
        body: render_digest(run),
    };

    let client = reqwest::Client::new();
    let resp = client
        .post(&cfg.webhook_url)
        .bearer_auth(&cfg.api_key)
        .json(&req)
        .send()
        .await?;

    if !resp.status().is_success() {
        return Err(ReportError::Platform(format!("email webhook failed: status={}", resp.status())));
    }

    Ok(EmailOutcome { sent_to: cfg.recipients.len() })
}

#[cfg(test)]
mod tests {
    use cr_analyzers::Level;
    use cr_backend_domain::{ProviderKind, RepoKind};

    use super::*;
    use crate::types::RevisionContext;

    fn run_with(issues: Vec<cr_classify::Issue>) -> ClassifiedRun {
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
            issues,
        }
    }

    #[test]
    fn digest_includes_non_publishable_issues() {
        let run = run_with(vec![cr_classify::Issue {
            hash: "h".to_string(),
            path: "a.rs".to_string(),
            line: Some(1),
            nb_lines: 1,
            check: None,
            analyzer: "mozlint".to_string(),
            message: "suppressed warning".to_string(),
            body: None,
            level: Level::Warning,
            in_patch: false,
            new_for_revision: true,
            publishable: false,
        }]);
        let body = render_digest(&run);
        assert!(body.contains("suppressed warning"));
        assert!(body.contains("publishable=false"));
    }

    #[tokio::test]
    async fn no_recipients_is_a_noop() {
        let cfg = EmailReporterConfig { webhook_url: String::new(), api_key: String::new(), recipients: vec![] };
        let outcome = send(&cfg, &run_with(vec![])).await.unwrap();
        assert_eq!(outcome.sent_to, 0);
    }
}
