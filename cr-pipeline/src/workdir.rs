//! Per-run artifact writer (spec 6's "persisted state layout"): `report.json`,
//! one `issues.json` per analyzer task, and `summary.md`. The content-addressed
//! `code_data/mr_cache`-style cache in `mr-reviewer::cache` becomes, here, a
//! plain working-directory writer -- this pipeline has no cross-run cache to
//! maintain, only a per-run artifact trail.

use std::collections::BTreeMap;
use std::path::Path;

use cr_analyzers::ParseResult;
use cr_classify::Issue;
use serde::Serialize;

use crate::errors::PipelineResult;
use crate::ingest_stage::TaskOutcome;

#[derive(Debug, Serialize)]
struct ReportJson<'a> {
    issues: &'a [Issue],
}

pub fn write_report_json(dir: &Path, issues: &[Issue]) -> PipelineResult<()> {
    std::fs::create_dir_all(dir)?;
    let body = serde_json::to_vec_pretty(&ReportJson { issues })?;
    std::fs::write(dir.join("report.json"), body)?;
    Ok(())
}

pub fn write_issues_json(dir: &Path, outcomes: &[TaskOutcome]) -> PipelineResult<()> {
    std::fs::create_dir_all(dir)?;
    let mut by_task: BTreeMap<&str, &ParseResult> = BTreeMap::new();
    for outcome in outcomes {
        if let Ok(parsed) = &outcome.result {
            by_task.insert(&outcome.task_name, parsed);
        }
    }
    let issues: BTreeMap<&str, &[cr_analyzers::RawIssue]> =
        by_task.iter().map(|(name, parsed)| (*name, parsed.issues.as_slice())).collect();
    let body = serde_json::to_vec_pretty(&issues)?;
    std::fs::write(dir.join("issues.json"), body)?;
    Ok(())
}

pub fn write_summary_md(dir: &Path, issues: &[Issue]) -> PipelineResult<()> {
    std::fs::create_dir_all(dir)?;
    let mut counts: BTreeMap<(&str, &'static str), u32> = BTreeMap::new();
    for issue in issues {
        let level = if issue.level == cr_analyzers::Level::Error { "error" } else { "warning" };
        *counts.entry((issue.analyzer.as_str(), level)).or_insert(0) += 1;
    }

    let mut body = String::from("# Code review summary\n\n");
    body.push_str(&format!("Total issues: {}\n\n", issues.len()));
    body.push_str(&format!("Publishable: {}\n\n", issues.iter().filter(|i| i.publishable).count()));
    body.push_str("| analyzer | level | count |\n|---|---|---|\n");
    for ((analyzer, level), count) in counts {
        body.push_str(&format!("| {analyzer} | {level} | {count} |\n"));
    }

    std::fs::write(dir.join("summary.md"), body)?;
    Ok(())
}
