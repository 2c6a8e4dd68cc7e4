//! Minimal unified-diff hunk parser, used by the `clang-format` parser.
//!
//! Adapted from the pipeline's own patch-interpretation idiom: robust to
//! missing file headers, only `@@` hunk headers are required, and ignores
//! `\ No newline at end of file` marker lines.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HunkMode {
    Replace,
    Insert,
    Delete,
}

#[derive(Debug, Clone)]
pub struct FormatHunk {
    pub mode: HunkMode,
    pub old_start: u32,
    pub old_lines: u32,
    pub new_start: u32,
    pub new_lines: u32,
}

/// Parses a unified diff into one `FormatHunk` per `@@` block, classifying
/// each block's mode from whether it carries only additions, only removals,
/// or both.
pub fn parse_format_hunks(s: &str) -> Vec<FormatHunk> {
    let mut hunks = Vec::new();
    let mut cur: Option<(u32, u32, u32, u32)> = None;
    let mut has_add = false;
    let mut has_del = false;

    let flush = |hunks: &mut Vec<FormatHunk>,
                 cur: &Option<(u32, u32, u32, u32)>,
                 has_add: bool,
                 has_del: bool| {
        if let Some((os, ol, ns, nl)) = cur {
            let mode = match (has_add, has_del) {
                (true, true) => HunkMode::Replace,
                (true, false) => HunkMode::Insert,
                (false, true) => HunkMode::Delete,
                (false, false) => HunkMode::Replace,
            };
            hunks.push(FormatHunk {
                mode,
                old_start: *os,
                old_lines: *ol,
                new_start: *ns,
                new_lines: *nl,
            });
        }
    };

    for line in s.lines() {
        if line.starts_with("@@") {
            flush(&mut hunks, &cur, has_add, has_del);
            has_add = false;
            has_del = false;
            if let Some((left, right)) = line
                .trim_start_matches('@')
                .trim_end_matches('@')
                .trim()
                .split_once('+')
            {
                let (os, ol) = split_nums(left.trim().trim_start_matches('-'));
                let (ns, nl) = split_nums(right.trim());
                cur = Some((os, ol, ns, nl));
            } else {
                cur = None;
            }
            continue;
        }
        if line.starts_with("\\ ") || cur.is_none() {
            continue;
        }
        if line.starts_with('+') {
            has_add = true;
        } else if line.starts_with('-') {
            has_del = true;
        }
    }
    flush(&mut hunks, &cur, has_add, has_del);
    hunks
}

fn split_nums(s: &str) -> (u32, u32) {
    let s = s.trim();
    if let Some((a, b)) = s.split_once(',') {
        (a.parse().unwrap_or(0), b.parse().unwrap_or(0))
    } else {
        (s.parse().unwrap_or(0), 0)
    }
}

pub fn looks_like_binary_patch(s: &str) -> bool {
    s.contains("GIT binary patch")
        || s.starts_with("Binary files ")
        || (s.starts_with("Files ") && s.contains(" differ"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_insert_only_hunk() {
        let diff = "@@ -5,0 +6,2 @@\n+a\n+b\n";
        let hunks = parse_format_hunks(diff);
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].mode, HunkMode::Insert);
        assert_eq!(hunks[0].new_start, 6);
    }

    #[test]
    fn classifies_replace_hunk() {
        let diff = "@@ -5,2 +5,2 @@\n-old1\n-old2\n+new1\n+new2\n";
        let hunks = parse_format_hunks(diff);
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].mode, HunkMode::Replace);
    }

    #[test]
    fn classifies_delete_only_hunk() {
        let diff = "@@ -5,2 +5,0 @@\n-old1\n-old2\n";
        let hunks = parse_format_hunks(diff);
        assert_eq!(hunks[0].mode, HunkMode::Delete);
    }

    #[test]
    fn detects_binary_marker() {
        assert!(looks_like_binary_patch("Binary files a/x differ"));
        assert!(!looks_like_binary_patch("@@ -1 +1 @@\n-a\n+b\n"));
    }
}
