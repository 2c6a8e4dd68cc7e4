//! Dispatch table: which `AnalyzerKind` owns a given CI task.
//!
//! Mirrors `mr-reviewer::git_providers::ProviderClient::from_config`: one
//! function picks a variant, the caller's `match` on that variant picks the
//! parse function. No trait objects.

use crate::types::AnalyzerKind;

const CLANG_TIDY_PREFIXES: &[&str] = &["source-test-clang-tidy"];
const CLANG_FORMAT_PREFIXES: &[&str] = &["source-test-clang-format"];
const MOZLINT_PREFIXES: &[&str] = &["source-test-mozlint-"];

pub fn detect_analyzer(task_name: &str, artifact_path: &str) -> AnalyzerKind {
    if CLANG_TIDY_PREFIXES.iter().any(|p| task_name.starts_with(p)) {
        return AnalyzerKind::ClangTidy;
    }
    if CLANG_FORMAT_PREFIXES.iter().any(|p| task_name.starts_with(p))
        || artifact_path.ends_with(".diff")
    {
        return AnalyzerKind::ClangFormat;
    }
    if MOZLINT_PREFIXES.iter().any(|p| task_name.starts_with(p)) {
        return AnalyzerKind::MozLint;
    }
    AnalyzerKind::Default
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clang_tidy_by_task_name() {
        assert_eq!(
            detect_analyzer("source-test-clang-tidy", "issues.json"),
            AnalyzerKind::ClangTidy
        );
    }

    #[test]
    fn mozlint_eslint_variant() {
        assert_eq!(
            detect_analyzer("source-test-mozlint-eslint", "issues.json"),
            AnalyzerKind::MozLint
        );
    }

    #[test]
    fn clang_format_by_artifact_extension() {
        assert_eq!(
            detect_analyzer("weird-task-name", "patch.diff"),
            AnalyzerKind::ClangFormat
        );
    }

    #[test]
    fn unknown_analyzer_falls_back_to_default() {
        assert_eq!(
            detect_analyzer("my-new-analyzer", "issues.json"),
            AnalyzerKind::Default
        );
    }
}
