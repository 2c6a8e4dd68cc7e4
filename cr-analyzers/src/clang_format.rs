//! clang-format: unified-diff artifact -> one RawIssue per hunk.
//!
//! Each hunk becomes a warning-level issue carrying `mode` in `check` and
//! the old/new line ranges in `body` (spec 4.2).

use crate::diff::{HunkMode, looks_like_binary_patch, parse_format_hunks};
use crate::path_norm::normalize;
use crate::types::{Level, ParseResult, RawIssue};

/// `path` is the file this diff artifact applies to (declared by the task's
/// artifact naming convention, e.g. `clang-format/src/foo.cpp.diff`).
pub fn parse(task_name: &str, path: &str, artifact: &[u8]) -> ParseResult {
    let mut out = ParseResult::default();

    let text = match std::str::from_utf8(artifact) {
        Ok(t) => t,
        Err(e) => {
            out.push_diagnostic(format!("clang-format: non-utf8 artifact: {e}"));
            return out;
        }
    };

    if looks_like_binary_patch(text) {
        out.push_diagnostic("clang-format: binary patch skipped".to_string());
        return out;
    }

    let (norm_path, was_absolute) = normalize(path);
    if was_absolute {
        out.push_diagnostic(format!("clang-format: absolute path coerced: {path}"));
    }

    for hunk in parse_format_hunks(text) {
        let mode = match hunk.mode {
            HunkMode::Replace => "replace",
            HunkMode::Insert => "insert",
            HunkMode::Delete => "delete",
        };
        let (line, nb_lines) = match hunk.mode {
            HunkMode::Delete => (Some(hunk.old_start.max(1)), hunk.old_lines.max(1)),
            _ => (Some(hunk.new_start.max(1)), hunk.new_lines.max(1)),
        };

        out.issues.push(RawIssue {
            path: norm_path.clone(),
            line,
            nb_lines,
            column: None,
            check: Some(mode.to_string()),
            analyzer: "clang-format".to_string(),
            level: Level::Warning,
            message: "Formatting does not match the project style".to_string(),
            body: Some(format!(
                "old: {},{} new: {},{}",
                hunk.old_start, hunk.old_lines, hunk.new_start, hunk.new_lines
            )),
        });
    }

    let _ = task_name;
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_hunks_yield_two_issues() {
        let diff = "@@ -5,2 +5,2 @@\n-a\n-b\n+c\n+d\n@@ -50,0 +51,1 @@\n+e\n";
        let result = parse("source-test-clang-format", "foo.cpp", diff.as_bytes());
        assert_eq!(result.issues.len(), 2);
        assert!(result.issues.iter().all(|i| i.analyzer == "clang-format"));
        assert_eq!(result.issues[0].check.as_deref(), Some("replace"));
        assert_eq!(result.issues[1].check.as_deref(), Some("insert"));
    }

    #[test]
    fn binary_patch_is_skipped_via_diagnostic() {
        let result = parse("t", "x.png", b"Binary files a/x.png and b/x.png differ");
        assert!(result.issues.is_empty());
        assert_eq!(result.diagnostics.len(), 1);
    }
}
