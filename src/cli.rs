//! Argument parsing and the `run`/`serve` subcommand bodies.
//!
//! `--configuration PATH` / `--taskcluster-secret NAME` mirror spec 6's two
//! ways a `PipelineConfig` reaches the harness: a local file for the common
//! case, or a named secret for the Taskcluster-hosted case. Taskcluster
//! itself is out of scope (spec 10 Non-goals), so `SecretLoader`'s shipped
//! implementation is a local-file stand-in a real deployment would replace.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use cr_backend_domain::PgStore;
use cr_ingest::{IngestClient, IngestConfig, IngestError, TaskGroupId};
use cr_pipeline::{PipelineConfig, PipelineError, RunInput};
use cr_reporters::{BackendReporter, RevisionContext};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "cr-harness", about = "Code-review publication pipeline harness")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ingest one task group, classify its findings, and publish them.
    Run(RunArgs),
    /// Serve the read-only backend HTTP API.
    Serve(ServeArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Path to a PipelineConfig JSON document.
    #[arg(long, conflicts_with = "taskcluster_secret")]
    pub configuration: Option<PathBuf>,

    /// Name of a Taskcluster secret holding the PipelineConfig document.
    #[arg(long)]
    pub taskcluster_secret: Option<String>,

    /// Path to a RunInput JSON document (task_group_id, patch, revision) --
    /// the external patch-applier/revision-identity collaborators spec 1
    /// assumes, represented here as a file the harness reads instead of a
    /// live provider call.
    #[arg(long)]
    pub run_input: PathBuf,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[arg(long, default_value = "0.0.0.0:8080")]
    pub bind: String,
}

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Domain(#[from] cr_backend_domain::DomainError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl HarnessError {
    /// Taxonomy-to-exit-code mapping (spec 6/7): fatal ingestion auth
    /// failures get a distinct code from ordinary config/runtime errors so
    /// a calling CI job can tell "retry won't help, check credentials"
    /// apart from "the run timed out" or "something else broke".
    pub fn exit_code(&self) -> u8 {
        match self {
            HarnessError::Config(_) => 1,
            HarnessError::Pipeline(PipelineError::Ingest(IngestError::Fatal(_))) => 2,
            HarnessError::Pipeline(PipelineError::Deadline) => 3,
            _ => 1,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RunInputDocument {
    task_group_id: String,
    patch: cr_classify::UnifiedPatch,
    revision: RevisionContext,
}

/// External collaborator: resolves a named secret to a `PipelineConfig`
/// document (spec 1's "a loader returning a configuration record").
trait SecretLoader {
    fn load(&self, name: &str) -> Result<PipelineConfig, HarnessError>;
}

/// Reads `{dir}/{name}.json`. Sufficient for the CLI/test surface; a real
/// deployment swaps this for a Taskcluster secrets client.
struct FileSecretLoader {
    dir: PathBuf,
}

impl SecretLoader for FileSecretLoader {
    fn load(&self, name: &str) -> Result<PipelineConfig, HarnessError> {
        let path = self.dir.join(format!("{name}.json"));
        load_config_file(&path)
    }
}

fn load_config_file(path: &Path) -> Result<PipelineConfig, HarnessError> {
    let body = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&body)?)
}

pub async fn run_pipeline(args: RunArgs) -> Result<(), HarnessError> {
    let cfg = match (&args.configuration, &args.taskcluster_secret) {
        (Some(path), None) => load_config_file(path)?,
        (None, Some(secret)) => {
            let dir = std::env::var("TASKCLUSTER_SECRETS_DIR").unwrap_or_else(|_| "/etc/cr-harness/secrets".to_string());
            FileSecretLoader { dir: PathBuf::from(dir) }.load(secret)?
        }
        _ => return Err(HarnessError::Config("exactly one of --configuration or --taskcluster-secret is required".into())),
    };

    let run_input_body = std::fs::read_to_string(&args.run_input)?;
    let doc: RunInputDocument = serde_json::from_str(&run_input_body)?;
    let input = RunInput { task_group_id: TaskGroupId(doc.task_group_id), patch: doc.patch, revision: doc.revision };

    let database_url = std::env::var("DATABASE_URL").map_err(|_| HarnessError::Config("DATABASE_URL not set".into()))?;
    let pool = sqlx::postgres::PgPoolOptions::new().max_connections(10).connect(&database_url).await.map_err(cr_backend_domain::DomainError::from)?;
    let store = Arc::new(PgStore::new(pool));
    store.run_migrations().await?;

    let ci_base_api = std::env::var("CI_BASE_API").map_err(|_| HarnessError::Config("CI_BASE_API not set".into()))?;
    let ci_token = std::env::var("CI_TOKEN").unwrap_or_default();
    let mut ingest_cfg = IngestConfig::new(ci_base_api, ci_token);
    ingest_cfg.max_parallel = cfg.max_parallel;
    let client = IngestClient::new(ingest_cfg).map_err(PipelineError::from)?;

    let backend = BackendReporter::new(store);

    info!(task_group = %input.task_group_id.0, channel = ?cfg.app_channel, "starting run");
    let report = cr_pipeline::run(&cfg, &client, &backend, input).await?;
    info!(
        issues = report.issues.len(),
        partial_failures = report.dispatch.partial_failures.len(),
        "run complete"
    );

    Ok(())
}
