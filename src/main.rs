//! CLI harness: loads a `PipelineConfig`, wires up the ingestion client,
//! Postgres store, and reporters, and runs one pipeline invocation -- or,
//! with `serve`, exposes the read-only backend HTTP API. Mirrors
//! `mr-ai-backend`'s thin `main.rs` (`dotenvy::dotenv()` then hand off to a
//! library crate), generalized into two subcommands instead of one.

mod cli;
mod telemetry;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use cli::{Cli, Command};
use cr_backend_domain::PgStore;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    telemetry::init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "run failed");
            ExitCode::from(err.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<(), cli::HarnessError> {
    match cli.command {
        Command::Run(args) => cli::run_pipeline(args).await,
        Command::Serve(args) => serve(args).await,
    }
}

async fn serve(args: cli::ServeArgs) -> Result<(), cli::HarnessError> {
    let database_url = std::env::var("DATABASE_URL").map_err(|_| cli::HarnessError::Config("DATABASE_URL not set".into()))?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .map_err(cr_backend_domain::DomainError::from)?;
    let store = PgStore::new(pool);
    store.run_migrations().await?;

    let router = cr_backend_api::build_router(Arc::new(store));
    let listener = tokio::net::TcpListener::bind(&args.bind).await.map_err(cli::HarnessError::Io)?;
    tracing::info!(bind = %args.bind, "serving backend API");
    axum::serve(listener, router).await.map_err(cli::HarnessError::Io)?;
    Ok(())
}
