//! Parsing of per-task CI analyzer artifacts into `RawIssue`s.
//!
//! Every parser here is total: malformed input yields a `ParseDiagnostic`,
//! never a panic (spec 4.2, P5).

mod clang_format;
mod clang_tidy;
mod default_format;
mod diff;
mod dispatch;
mod mozlint;
mod path_norm;
mod types;

pub use dispatch::detect_analyzer;
pub use types::{AnalyzerKind, Level, ParseDiagnostic, ParseResult, RawIssue};

/// Routes an artifact to the parser selected by `detect_analyzer` and
/// returns its result. `artifact_path` is the declared path of the artifact
/// within the task (used both for analyzer detection and, for
/// clang-format, as the file the diff applies to).
pub fn parse_artifact(task_name: &str, artifact_path: &str, artifact: &[u8]) -> ParseResult {
    match detect_analyzer(task_name, artifact_path) {
        AnalyzerKind::ClangTidy => clang_tidy::parse(task_name, artifact),
        AnalyzerKind::ClangFormat => clang_format::parse(task_name, artifact_path, artifact),
        AnalyzerKind::MozLint => mozlint::parse(task_name, artifact),
        AnalyzerKind::Default => default_format::parse(task_name, artifact),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_clang_tidy_by_task_name() {
        let artifact = br#"{"src/a.cpp":[{"path":"src/a.cpp","line":1,"check":"c","message":"m"}]}"#;
        let result = parse_artifact("source-test-clang-tidy", "issues.json", artifact);
        assert_eq!(result.issues[0].analyzer, "clang-tidy");
    }

    #[test]
    fn routes_unknown_task_to_default_format() {
        let artifact = br#"{"x":[{"path":"x","line":1,"level":"warning","message":"m"}]}"#;
        let result = parse_artifact("brand-new-analyzer", "issues.json", artifact);
        assert_eq!(result.issues[0].analyzer, "brand-new-analyzer");
    }
}
