//! End-to-end scenarios (spec 8). `cr-ingest::IngestClient` only speaks real
//! HTTP, so these fixtures start one stage later than network ingestion:
//! each scenario builds the `RawIssue`s a parser would have produced and
//! drives classification, aggregation, and the backend reporter exactly the
//! way `cr_pipeline::run` does for its stage3/stage4, against an
//! `InMemoryStore` (no live Postgres).

use std::collections::HashSet;
use std::sync::Arc;

use cr_analyzers::{Level, RawIssue};
use cr_backend_domain::{InMemoryStore, ProviderKind, RepoKind, Store};
use cr_classify::{PatchFile, PatchHunk, PatchLine, UnifiedPatch};
use cr_reporters::{BackendReporter, ClassifiedRun, Reporter, RevisionContext};

fn patch_adding(path: &str, start: u32, count: u32) -> UnifiedPatch {
    let end = start + count - 1;
    UnifiedPatch {
        files: vec![PatchFile {
            path: path.to_string(),
            is_new: false,
            is_deleted: false,
            hunks: vec![PatchHunk {
                old_start: start,
                old_lines: 0,
                new_start: start,
                new_lines: count,
                // Content is the same text regardless of line number so that
                // scenario 6 can move an issue's line across patches and
                // still hash-match on an unchanged source line.
                lines: (start..=end).map(|n| PatchLine::Added { new_line: n, content: "unchanged line".to_string() }).collect(),
            }],
        }],
    }
}

fn ctx(provider_diff_id: i64) -> RevisionContext {
    RevisionContext {
        repository_slug: "org/repo".to_string(),
        repository_url: "https://example.com/org/repo".to_string(),
        repository_kind: RepoKind::Base,
        provider: ProviderKind::CodeReviewPlatform,
        revision_provider_id: "mr-1".to_string(),
        revision_title: "Fix the thing".to_string(),
        bug_id: None,
        provider_diff_id,
        commit_hash: "a".repeat(40),
        review_task_id: format!("task-{provider_diff_id}"),
        author_email: "author@example.com".to_string(),
    }
}

/// `provider_diff_id` distinguishes independent diffs of the same revision
/// (scenario 6 calls this twice with 1 then 2 to model D1/D2); every other
/// scenario just reuses 1.
async fn classify_and_dispatch(
    raws: Vec<RawIssue>,
    patch: &UnifiedPatch,
    store: Arc<InMemoryStore>,
    provider_diff_id: i64,
) -> (Vec<cr_classify::Issue>, cr_reporters::DispatchOutcome) {
    let ctx = ctx(provider_diff_id);
    let backend = BackendReporter::new(store.clone());
    let repo = backend.store().upsert_repository(&ctx.repository_slug, &ctx.repository_url, ctx.repository_kind).await.unwrap();
    let revision = backend
        .store()
        .upsert_revision(ctx.provider, &ctx.revision_provider_id, &ctx.revision_title, ctx.bug_id, repo.id)
        .await
        .unwrap();
    let current_diff = backend
        .store()
        .upsert_diff(revision.id, ctx.provider_diff_id, &ctx.commit_hash, &ctx.review_task_id, repo.id)
        .await
        .unwrap();
    let prior: HashSet<String> =
        backend.store().hashes_for_revision(revision.id, Some(current_diff.id)).await.unwrap().into_iter().collect();

    let classified: Vec<_> = raws.iter().map(|raw| cr_classify::classify(raw, patch, &prior, &ctx.repository_slug)).collect();
    let aggregated = cr_classify::aggregate(classified);

    let run = ClassifiedRun { revision: ctx, issues: aggregated.issues.clone() };
    let reporters = vec![Reporter::Backend(cr_reporters::BackendReporterConfig::default())];
    let dispatch = cr_reporters::dispatch(&backend, &reporters, &run).await.unwrap();

    (aggregated.issues, dispatch)
}

fn mozlint_issue(path: &str, line: u32, level: Level, message: &str) -> RawIssue {
    RawIssue {
        path: path.to_string(),
        line: Some(line),
        nb_lines: 1,
        column: Some(1),
        check: Some("no-var".to_string()),
        analyzer: "eslint".to_string(),
        level,
        message: message.to_string(),
        body: None,
    }
}

#[tokio::test]
async fn scenario_1_single_mozlint_error_in_patch() {
    let store = Arc::new(InMemoryStore::new());
    let patch = patch_adding("src/a.js", 8, 5);
    let raws = vec![mozlint_issue("src/a.js", 10, Level::Error, "Unexpected var.")];

    let (issues, dispatch) = classify_and_dispatch(raws, &patch, store, 1).await;

    assert_eq!(issues.len(), 1);
    assert!(issues[0].publishable);
    assert_eq!(dispatch.backend.unwrap().issues_written, 1);
}

#[tokio::test]
async fn scenario_2_warning_outside_patch_suppressed() {
    let store = Arc::new(InMemoryStore::new());
    let patch = patch_adding("src/a.js", 8, 5);
    let raws = vec![mozlint_issue("src/a.js", 100, Level::Warning, "Unexpected var.")];

    let (issues, dispatch) = classify_and_dispatch(raws, &patch, store, 1).await;

    assert_eq!(issues.len(), 1);
    assert!(!issues[0].publishable);
    // Still recorded in the backend even though suppressed from the platform.
    assert_eq!(dispatch.backend.unwrap().issues_written, 1);
}

#[tokio::test]
async fn scenario_3_clang_format_two_hunks() {
    let store = Arc::new(InMemoryStore::new());
    let patch = UnifiedPatch {
        files: vec![PatchFile {
            path: "foo.cpp".to_string(),
            is_new: false,
            is_deleted: false,
            hunks: vec![
                PatchHunk {
                    old_start: 5,
                    old_lines: 2,
                    new_start: 5,
                    new_lines: 2,
                    lines: vec![
                        PatchLine::Added { new_line: 5, content: "a".to_string() },
                        PatchLine::Added { new_line: 6, content: "b".to_string() },
                    ],
                },
                PatchHunk {
                    old_start: 50,
                    old_lines: 0,
                    new_start: 50,
                    new_lines: 1,
                    lines: vec![PatchLine::Added { new_line: 50, content: "c".to_string() }],
                },
            ],
        }],
    };

    let raws = vec![
        RawIssue {
            path: "foo.cpp".to_string(),
            line: Some(5),
            nb_lines: 2,
            column: None,
            check: Some("replace".to_string()),
            analyzer: "clang-format".to_string(),
            level: Level::Warning,
            message: "formatting".to_string(),
            body: None,
        },
        RawIssue {
            path: "foo.cpp".to_string(),
            line: Some(50),
            nb_lines: 1,
            column: None,
            check: Some("insert".to_string()),
            analyzer: "clang-format".to_string(),
            level: Level::Warning,
            message: "formatting".to_string(),
            body: None,
        },
    ];

    let (issues, _dispatch) = classify_and_dispatch(raws, &patch, store, 1).await;

    assert_eq!(issues.len(), 2);
    assert!(issues.iter().all(|i| i.analyzer == "clang-format" && i.level == Level::Warning));
    assert!(issues.iter().all(|i| i.publishable));
}

#[tokio::test]
async fn scenario_4_missing_artifact_degrades_to_synthetic_issue() {
    let store = Arc::new(InMemoryStore::new());
    let patch = UnifiedPatch::default();

    let ctx = ctx(1);
    let backend = BackendReporter::new(store.clone());
    let repo = backend.store().upsert_repository(&ctx.repository_slug, &ctx.repository_url, ctx.repository_kind).await.unwrap();
    backend
        .store()
        .upsert_revision(ctx.provider, &ctx.revision_provider_id, &ctx.revision_title, ctx.bug_id, repo.id)
        .await
        .unwrap();

    let synthetic =
        cr_classify::synthetic_pipeline_issue("source-test-mozlint-eslint", "artifact-missing", "404", &ctx.repository_slug);
    let aggregated = cr_classify::aggregate(vec![synthetic]);

    assert_eq!(aggregated.issues.len(), 1);
    assert_eq!(aggregated.issues[0].analyzer, "pipeline");
    assert_eq!(aggregated.issues[0].check.as_deref(), Some("artifact-missing"));
    assert!(aggregated.issues[0].publishable);

    let run = ClassifiedRun { revision: ctx, issues: aggregated.issues };
    let reporters = vec![Reporter::Backend(cr_reporters::BackendReporterConfig::default())];
    let dispatch = cr_reporters::dispatch(&backend, &reporters, &run).await.unwrap();
    assert_eq!(dispatch.backend.unwrap().issues_written, 1);
    let _ = patch;
}

#[tokio::test]
async fn scenario_5_retry_convergence_backend_state_unchanged() {
    // A Warning (not Error) issue so publishable's dependency on
    // new_for_revision is actually exercised: if hashes_for_revision ever
    // again counted the current diff's own prior link as "seen", this
    // issue's new_for_revision/publishable would flip from true to false on
    // the second run even though nothing about the run changed.
    let store = Arc::new(InMemoryStore::new());
    let patch = patch_adding("src/a.js", 8, 5);
    let raws = vec![mozlint_issue("src/a.js", 10, Level::Warning, "Unexpected var.")];

    let (issues_first, first) = classify_and_dispatch(raws.clone(), &patch, store.clone(), 1).await;
    let (issues_second, second) = classify_and_dispatch(raws, &patch, store.clone(), 1).await;

    assert_eq!(issues_first.len(), 1);
    assert_eq!(issues_second.len(), 1);
    assert!(issues_first[0].new_for_revision);
    assert!(issues_first[0].publishable);
    // The link row produced by the re-run must be byte-identical to the
    // first run's: same hash, same in_patch/new_for_revision/publishable.
    assert_eq!(issues_first[0], issues_second[0]);

    let first_backend = first.backend.unwrap();
    let second_backend = second.backend.unwrap();
    assert_eq!(first_backend.issues_written, second_backend.issues_written);
    assert_eq!(first_backend.links_written, second_backend.links_written);

    let issue_rows = store
        .list_issues_by_check("org/repo", "eslint", "no-var", None, cr_backend_domain::Pagination::new(None, None))
        .await
        .unwrap();
    assert_eq!(issue_rows.count, 1);
}

#[tokio::test]
async fn scenario_6_cross_diff_new_for_revision() {
    let store = Arc::new(InMemoryStore::new());

    // D1: issue H at (a.c, 20), patch touches 18-22.
    let patch1 = patch_adding("a.c", 18, 5);
    let raw1 = RawIssue {
        path: "a.c".to_string(),
        line: Some(20),
        nb_lines: 1,
        column: None,
        check: Some("rule".to_string()),
        analyzer: "clang-tidy".to_string(),
        level: Level::Warning,
        message: "same message".to_string(),
        body: None,
    };
    let (issues1, _) = classify_and_dispatch(vec![raw1.clone()], &patch1, store.clone(), 1).await;
    assert!(issues1[0].new_for_revision);
    let hash_h = issues1[0].hash.clone();

    // D2: same hash at (a.c, 22) after edits elsewhere, plus a brand new issue H'.
    let patch2 = patch_adding("a.c", 20, 6);
    let raw2_same = RawIssue { line: Some(22), ..raw1 };
    let raw2_new = RawIssue {
        path: "a.c".to_string(),
        line: Some(21),
        nb_lines: 1,
        column: None,
        check: Some("rule2".to_string()),
        analyzer: "clang-tidy".to_string(),
        level: Level::Warning,
        message: "a brand new message".to_string(),
        body: None,
    };
    let (issues2, _) = classify_and_dispatch(vec![raw2_same, raw2_new], &patch2, store, 2).await;

    let h = issues2.iter().find(|i| i.hash == hash_h).unwrap();
    assert!(!h.new_for_revision);
    let h_prime = issues2.iter().find(|i| i.hash != hash_h).unwrap();
    assert!(h_prime.new_for_revision);
}
