use std::collections::HashSet;

use cr_analyzers::{Level, RawIssue};

use crate::hash::compute_hash;
use crate::patch::UnifiedPatch;
use crate::types::Issue;

/// Enriches one `RawIssue` into a classified `Issue`. Pure: no IO, no
/// clock, no RNG — the same inputs always produce the same `Issue`.
pub fn classify(
    raw: &RawIssue,
    patch: &UnifiedPatch,
    prior_hashes: &HashSet<String>,
    repo_slug: &str,
) -> Issue {
    let source_line = raw
        .line
        .and_then(|l| patch.source_line(&raw.path, l));

    let hash = compute_hash(
        &raw.analyzer,
        raw.check.as_deref(),
        repo_slug,
        &raw.path,
        source_line.as_deref(),
        &raw.message,
    );

    let in_patch = match raw.line {
        Some(start) => match patch.added_lines(&raw.path) {
            Some(added) => {
                let end = start.saturating_add(raw.nb_lines.saturating_sub(1));
                (start..=end).any(|l| added.contains(&l))
            }
            None => false,
        },
        None => patch.touches_file(&raw.path),
    };

    let new_for_revision = !prior_hashes.contains(&hash);
    let publishable = raw.level == Level::Error || (in_patch && new_for_revision);

    Issue {
        hash,
        path: raw.path.clone(),
        line: raw.line,
        nb_lines: raw.nb_lines,
        check: raw.check.clone(),
        analyzer: raw.analyzer.clone(),
        level: raw.level,
        message: raw.message.clone(),
        body: raw.body.clone(),
        in_patch,
        new_for_revision,
        publishable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::{PatchFile, PatchHunk, PatchLine};

    fn patch_touching_a_js_lines_8_to_12() -> UnifiedPatch {
        UnifiedPatch {
            files: vec![PatchFile {
                path: "src/a.js".to_string(),
                is_new: false,
                is_deleted: false,
                hunks: vec![PatchHunk {
                    old_start: 6,
                    old_lines: 0,
                    new_start: 8,
                    new_lines: 5,
                    lines: (8..=12)
                        .map(|n| PatchLine::Added {
                            new_line: n,
                            content: format!("line {n}"),
                        })
                        .collect(),
                }],
            }],
        }
    }

    fn raw(path: &str, line: Option<u32>, level: Level) -> RawIssue {
        RawIssue {
            path: path.to_string(),
            line,
            nb_lines: 1,
            column: None,
            check: Some("no-var".to_string()),
            analyzer: "eslint".to_string(),
            level,
            message: "Unexpected var.".to_string(),
            body: None,
        }
    }

    #[test]
    fn error_in_patch_is_publishable() {
        let patch = patch_touching_a_js_lines_8_to_12();
        let issue = classify(&raw("src/a.js", Some(10), Level::Error), &patch, &HashSet::new(), "org/repo");
        assert!(issue.in_patch);
        assert!(issue.new_for_revision);
        assert!(issue.publishable);
    }

    #[test]
    fn warning_outside_patch_is_suppressed_but_stored() {
        let patch = patch_touching_a_js_lines_8_to_12();
        let issue = classify(&raw("src/a.js", Some(100), Level::Warning), &patch, &HashSet::new(), "org/repo");
        assert!(!issue.in_patch);
        assert!(!issue.publishable);
    }

    #[test]
    fn recurring_hash_is_not_new_for_revision() {
        let patch = patch_touching_a_js_lines_8_to_12();
        let first = classify(&raw("src/a.js", Some(10), Level::Warning), &patch, &HashSet::new(), "org/repo");
        let mut prior = HashSet::new();
        prior.insert(first.hash.clone());
        let second = classify(&raw("src/a.js", Some(10), Level::Warning), &patch, &prior, "org/repo");
        assert!(!second.new_for_revision);
        assert!(!second.publishable);
    }

    #[test]
    fn file_level_issue_uses_file_membership() {
        let patch = patch_touching_a_js_lines_8_to_12();
        let in_file = classify(&raw("src/a.js", None, Level::Warning), &patch, &HashSet::new(), "org/repo");
        let out_of_file = classify(&raw("src/other.js", None, Level::Warning), &patch, &HashSet::new(), "org/repo");
        assert!(in_file.in_patch);
        assert!(!out_of_file.in_patch);
    }
}
