//! Unified-patch shapes consumed by classification.
//!
//! Adapted from `mr-reviewer::git_providers::types::{DiffHunk, DiffLine}`.
//! Renamed to `PatchHunk`/`PatchLine` because this crate has no provider-fetch
//! concern, only patch interpretation: the patch itself is supplied by the
//! external patch-applier contract, not fetched here.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PatchLine {
    Added { new_line: u32, content: String },
    Removed { old_line: u32, content: String },
    Context {
        old_line: u32,
        new_line: u32,
        content: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchHunk {
    pub old_start: u32,
    pub old_lines: u32,
    pub new_start: u32,
    pub new_lines: u32,
    pub lines: Vec<PatchLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchFile {
    pub path: String,
    pub is_new: bool,
    pub is_deleted: bool,
    pub hunks: Vec<PatchHunk>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnifiedPatch {
    pub files: Vec<PatchFile>,
}

impl UnifiedPatch {
    pub fn touches_file(&self, path: &str) -> bool {
        self.files.iter().any(|f| f.path == path)
    }

    fn file(&self, path: &str) -> Option<&PatchFile> {
        self.files.iter().find(|f| f.path == path)
    }

    /// New-file-image line numbers introduced by added hunks, or `None` if
    /// the file is not part of the patch at all.
    pub fn added_lines(&self, path: &str) -> Option<HashSet<u32>> {
        let file = self.file(path)?;
        let mut lines = HashSet::new();
        for hunk in &file.hunks {
            for line in &hunk.lines {
                if let PatchLine::Added { new_line, .. } = line {
                    lines.insert(*new_line);
                }
            }
        }
        Some(lines)
    }

    /// Trimmed after-image source content at `(path, new_line)`, from either
    /// an added or context line. `None` if the line isn't present in the
    /// patch (e.g. unchanged region outside any hunk).
    pub fn source_line(&self, path: &str, new_line: u32) -> Option<String> {
        let file = self.file(path)?;
        let mut by_new_line = HashMap::new();
        for hunk in &file.hunks {
            for line in &hunk.lines {
                match line {
                    PatchLine::Added { new_line, content } => {
                        by_new_line.insert(*new_line, content.clone());
                    }
                    PatchLine::Context { new_line, content, .. } => {
                        by_new_line.insert(*new_line, content.clone());
                    }
                    PatchLine::Removed { .. } => {}
                }
            }
        }
        by_new_line.remove(&new_line).map(|s| s.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_patch() -> UnifiedPatch {
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
                    lines: vec![
                        PatchLine::Added { new_line: 8, content: "a".to_string() },
                        PatchLine::Added { new_line: 9, content: "b".to_string() },
                        PatchLine::Added {
                            new_line: 10,
                            content: "  var x = 1;  ".to_string(),
                        },
                        PatchLine::Added { new_line: 11, content: "c".to_string() },
                        PatchLine::Added { new_line: 12, content: "d".to_string() },
                    ],
                }],
            }],
        }
    }

    #[test]
    fn added_lines_reports_only_touched_file() {
        let patch = sample_patch();
        assert!(patch.added_lines("src/other.js").is_none());
        let lines = patch.added_lines("src/a.js").unwrap();
        assert_eq!(lines.len(), 5);
        assert!(lines.contains(&10));
    }

    #[test]
    fn source_line_is_trimmed() {
        let patch = sample_patch();
        assert_eq!(patch.source_line("src/a.js", 10).as_deref(), Some("var x = 1;"));
    }
}
