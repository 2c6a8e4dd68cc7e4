//! Enrichment of parsed issues into classified, deduplicated `Issue`s.

mod aggregate;
mod classify;
mod hash;
mod patch;
mod types;

pub use aggregate::{aggregate, synthetic_pipeline_issue, AggregationResult};
pub use classify::classify;
pub use hash::compute_hash;
pub use patch::{PatchFile, PatchHunk, PatchLine, UnifiedPatch};
pub use types::{Issue, ParseOutcome};
