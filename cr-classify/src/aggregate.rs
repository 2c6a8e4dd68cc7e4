use std::collections::HashMap;

use cr_analyzers::Level;

use crate::hash::compute_hash;
use crate::types::Issue;

#[derive(Debug, Clone, Default)]
pub struct AggregationResult {
    pub issues: Vec<Issue>,
}

/// Lifts a task-level failure (missing artifact, parser crash boundary,
/// retries exhausted) into a synthetic `pipeline` issue rather than
/// swallowing it (spec 4.3). Always publishable: `level = Error`.
pub fn synthetic_pipeline_issue(task_name: &str, check: &str, message: &str, repo_slug: &str) -> Issue {
    let hash = compute_hash("pipeline", Some(check), repo_slug, task_name, None, message);
    Issue {
        hash,
        path: task_name.to_string(),
        line: None,
        nb_lines: 1,
        check: Some(check.to_string()),
        analyzer: "pipeline".to_string(),
        level: Level::Error,
        message: message.to_string(),
        body: None,
        in_patch: false,
        new_for_revision: true,
        publishable: true,
    }
}

/// Merges already-classified issues from every task in the group. Duplicates
/// by `(hash, path, line, analyzer, check)` collapse, preserving the
/// earliest observation in `issues`'s order. Result is sorted by
/// `(path, line, analyzer, check, hash)` (P4) before reaching `cr-reporters`.
pub fn aggregate(issues: Vec<Issue>) -> AggregationResult {
    let mut seen: HashMap<(String, String, Option<u32>, String, Option<String>), ()> = HashMap::new();
    let mut out = Vec::new();

    for issue in issues {
        let key = (
            issue.hash.clone(),
            issue.path.clone(),
            issue.line,
            issue.analyzer.clone(),
            issue.check.clone(),
        );
        if seen.contains_key(&key) {
            continue;
        }
        seen.insert(key, ());
        out.push(issue);
    }

    out.sort_by(|a, b| {
        (&a.path, a.line, &a.analyzer, &a.check, &a.hash)
            .cmp(&(&b.path, b.line, &b.analyzer, &b.check, &b.hash))
    });

    AggregationResult { issues: out }
}
