//! Top-level orchestration (spec 5, 6): wires ingestion -> parsing ->
//! classification -> reporting, shaped like `mr_reviewer::run_review` --
//! sequential named stages, each timed and `tracing::debug!`-instrumented.

mod config;
mod errors;
mod ingest_stage;
mod workdir;

pub use config::{Channel, CheckoutMode, PipelineConfig, ReporterSpec, RepositorySpec};
pub use errors::{PipelineError, PipelineResult};
pub use ingest_stage::TaskOutcome;

use std::collections::HashSet;
use std::future::Future;
use std::time::{Duration, Instant};

use cr_backend_domain::Store;
use cr_classify::{Issue, UnifiedPatch};
use cr_ingest::{IngestClient, TaskGroupId};
use cr_reporters::{BackendReporter, ClassifiedRun, DispatchOutcome, RevisionContext};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Everything a single run needs beyond the shared client/config/backend:
/// the task group to traverse and the two external-collaborator inputs
/// spec 1 names (patch-applier output, revision identity).
#[derive(Debug, Clone)]
pub struct RunInput {
    pub task_group_id: TaskGroupId,
    pub patch: UnifiedPatch,
    pub revision: RevisionContext,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub issues: Vec<Issue>,
    pub dispatch: DispatchOutcome,
    pub stage_timings: Vec<(&'static str, Duration)>,
}

async fn with_cancellation<T>(token: &CancellationToken, fut: impl Future<Output = PipelineResult<T>>) -> PipelineResult<T> {
    tokio::select! {
        _ = token.cancelled() => Err(PipelineError::Deadline),
        result = fut => result,
    }
}

pub async fn run<S: Store>(
    cfg: &PipelineConfig,
    client: &IngestClient,
    backend: &BackendReporter<S>,
    input: RunInput,
) -> PipelineResult<RunReport> {
    let token = CancellationToken::new();
    let watchdog_token = token.clone();
    let deadline = Duration::from_secs(cfg.deadline_secs);
    let watchdog = tokio::spawn(async move {
        tokio::time::sleep(deadline).await;
        watchdog_token.cancel();
    });

    let result = run_stages(cfg, client, backend, input, &token).await;
    watchdog.abort();
    result
}

async fn run_stages<S: Store>(
    cfg: &PipelineConfig,
    client: &IngestClient,
    backend: &BackendReporter<S>,
    input: RunInput,
    token: &CancellationToken,
) -> PipelineResult<RunReport> {
    let mut timings = Vec::new();

    let t0 = Instant::now();
    debug!("stage1: ingest + parse task group");
    let outcomes = with_cancellation(
        token,
        ingest_stage::ingest_and_parse(client, &input.task_group_id, cfg.max_parallel, cfg.parse_queue_capacity),
    )
    .await?;
    debug!("stage1: done, tasks={} ({} ms)", outcomes.len(), t0.elapsed().as_millis());
    timings.push(("ingest", t0.elapsed()));

    let t1 = Instant::now();
    debug!("stage2: resolve revision + current-diff identity for prior-hash lookup");
    let store = backend.store();
    let ctx = &input.revision;
    let repository = with_cancellation(token, async {
        Ok(store.upsert_repository(&ctx.repository_slug, &ctx.repository_url, ctx.repository_kind).await?)
    })
    .await?;
    let revision = with_cancellation(token, async {
        Ok(store
            .upsert_revision(ctx.provider, &ctx.revision_provider_id, &ctx.revision_title, ctx.bug_id, repository.id)
            .await?)
    })
    .await?;
    // Upserting the current diff here (ahead of the backend reporter's own,
    // idempotent upsert in stage4) resolves its id so it can be excluded
    // below -- otherwise a re-run of the same diff would see its own prior
    // link's hashes as "already seen" and flip new_for_revision to false.
    let current_diff = with_cancellation(token, async {
        Ok(store.upsert_diff(revision.id, ctx.provider_diff_id, &ctx.commit_hash, &ctx.review_task_id, repository.id).await?)
    })
    .await?;
    let prior_hashes: HashSet<String> =
        with_cancellation(token, async { Ok(store.hashes_for_revision(revision.id, Some(current_diff.id)).await?) })
            .await?
            .into_iter()
            .collect();
    debug!("stage2: done, prior_hashes={} ({} ms)", prior_hashes.len(), t1.elapsed().as_millis());
    timings.push(("resolve_revision", t1.elapsed()));

    let t2 = Instant::now();
    debug!("stage3: classify + aggregate");
    let mut classified = Vec::with_capacity(outcomes.len());
    for outcome in &outcomes {
        match &outcome.result {
            Ok(parsed) => {
                for raw in &parsed.issues {
                    classified.push(cr_classify::classify(raw, &input.patch, &prior_hashes, &ctx.repository_slug));
                }
            }
            Err((check, message)) => {
                classified.push(cr_classify::synthetic_pipeline_issue(&outcome.task_name, check, message, &ctx.repository_slug));
            }
        }
    }
    let aggregated = cr_classify::aggregate(classified);
    debug!("stage3: done, issues={} ({} ms)", aggregated.issues.len(), t2.elapsed().as_millis());
    timings.push(("classify", t2.elapsed()));

    let t3 = Instant::now();
    debug!("stage4: dispatch reporters");
    let classified_run = ClassifiedRun { revision: input.revision.clone(), issues: aggregated.issues.clone() };
    let reporters = cfg.reporters();
    let dispatch = with_cancellation(token, async { Ok(cr_reporters::dispatch(backend, &reporters, &classified_run).await?) }).await?;
    debug!("stage4: done ({} ms)", t3.elapsed().as_millis());
    timings.push(("report", t3.elapsed()));

    workdir::write_report_json(&cfg.workdir, &aggregated.issues)?;
    workdir::write_issues_json(&cfg.workdir, &outcomes)?;
    workdir::write_summary_md(&cfg.workdir, &aggregated.issues)?;

    Ok(RunReport { issues: aggregated.issues, dispatch, stage_timings: timings })
}
