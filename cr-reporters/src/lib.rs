//! Reporting (spec 4.4): backend/platform/email/build-error reporters behind
//! one enum-dispatch interface, with the backend write happening first.

mod backend;
mod build_error;
mod dispatch;
mod email;
mod errors;
mod platform;
mod types;

pub use backend::BackendReporter;
pub use dispatch::{build_reporter_for, dispatch};
pub use errors::{ReportError, ReportResult};
pub use types::{
    BackendOutcome, BackendReporterConfig, BuildErrorOutcome, BuildErrorReporterConfig, ClassifiedRun,
    DispatchOutcome, EmailOutcome, EmailReporterConfig, PlatformKind, PlatformReporterConfig, PublishOutcome,
    Reporter, RevisionContext,
};
