//! Dispatch ordering: the backend reporter runs first, as its own function
//! call (not enum-matched in the loop below), so the happens-before relation
//! from spec 5 is structural. A backend `Err` short-circuits and propagates;
//! every other reporter's `Err` is captured and logged, never fatal.

use std::sync::Arc;

use cr_backend_domain::Store;

use crate::backend::BackendReporter;
use crate::errors::ReportResult;
use crate::types::{ClassifiedRun, DispatchOutcome, Reporter};
use crate::{build_error, email, platform};

pub async fn dispatch<S: Store>(
    backend: &BackendReporter<S>,
    reporters: &[Reporter],
    run: &ClassifiedRun,
) -> ReportResult<DispatchOutcome> {
    let mut outcome = DispatchOutcome::default();

    if reporters.iter().any(|r| matches!(r, Reporter::Backend(_))) {
        outcome.backend = Some(backend.publish(run).await?);
    }

    for reporter in reporters {
        match reporter {
            Reporter::Backend(_) => {}
            Reporter::Platform(cfg) => match platform::publish(cfg, run).await {
                Ok(result) => outcome.platform = Some(result),
                Err(err) => {
                    tracing::warn!(error = %err, "platform reporter failed");
                    outcome.partial_failures.push(format!("platform: {err}"));
                }
            },
            Reporter::Email(cfg) => match email::send(cfg, run).await {
                Ok(result) => outcome.email = Some(result),
                Err(err) => {
                    tracing::warn!(error = %err, "email reporter failed");
                    outcome.partial_failures.push(format!("email: {err}"));
                }
            },
            Reporter::BuildError(cfg) => match build_error::maybe_send(cfg, run).await {
                Ok(result) => outcome.build_error = result,
                Err(err) => {
                    tracing::warn!(error = %err, "build-error reporter failed");
                    outcome.partial_failures.push(format!("build_error: {err}"));
                }
            },
        }
    }

    Ok(outcome)
}

pub fn build_reporter_for<S: Store>(store: Arc<S>) -> BackendReporter<S> {
    BackendReporter::new(store)
}
