//! Stable issue fingerprinting.
//!
//! Same canonicalize-buffer-then-hash idiom as `mr-reviewer::map`'s
//! `compute_snippet_hash_and_preview` and `mr-reviewer::cache`'s `key_path`,
//! reused verbatim: build one buffer in a fixed field order, hash it once.

use sha2::{Digest, Sha256};

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Order is fixed and must never change without also changing P1's fixtures:
/// `analyzer`, `check`, `repo_slug`, `path`, after-image source line (or
/// `"-"`), normalized message.
pub fn compute_hash(
    analyzer: &str,
    check: Option<&str>,
    repo_slug: &str,
    path: &str,
    source_line: Option<&str>,
    message: &str,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(analyzer.as_bytes());
    hasher.update(b"\0");
    hasher.update(check.unwrap_or("-").as_bytes());
    hasher.update(b"\0");
    hasher.update(repo_slug.as_bytes());
    hasher.update(b"\0");
    hasher.update(path.as_bytes());
    hasher.update(b"\0");
    hasher.update(source_line.map(str::trim).unwrap_or("-").as_bytes());
    hasher.update(b"\0");
    hasher.update(collapse_whitespace(message).as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_inputs_hash_identically() {
        let a = compute_hash("eslint", Some("no-var"), "org/repo", "src/a.js", Some("var x = 1;"), "bad");
        let b = compute_hash("eslint", Some("no-var"), "org/repo", "src/a.js", Some("var x = 1;"), "bad");
        assert_eq!(a, b);
    }

    #[test]
    fn message_whitespace_is_normalized() {
        let a = compute_hash("eslint", Some("no-var"), "org/repo", "src/a.js", None, "bad   thing");
        let b = compute_hash("eslint", Some("no-var"), "org/repo", "src/a.js", None, "bad\t thing");
        assert_eq!(a, b);
    }

    #[test]
    fn different_check_hashes_differently() {
        let a = compute_hash("eslint", Some("no-var"), "org/repo", "src/a.js", None, "bad");
        let b = compute_hash("eslint", Some("no-let"), "org/repo", "src/a.js", None, "bad");
        assert_ne!(a, b);
    }
}
