//! clang-tidy: JSON artifact keyed by relative path -> array of findings.

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::path_norm::normalize;
use crate::types::{Level, ParseResult, RawIssue};

#[derive(Debug, Deserialize)]
struct ClangTidyEntry {
    #[serde(default)]
    path: Option<String>,
    line: u32,
    #[serde(default)]
    column: Option<u32>,
    check: String,
    #[serde(default)]
    header: Option<String>,
    message: String,
    #[serde(default)]
    publishable_source: Option<bool>,
}

pub fn parse(task_name: &str, artifact: &[u8]) -> ParseResult {
    let mut out = ParseResult::default();

    let parsed: BTreeMap<String, Vec<ClangTidyEntry>> = match serde_json::from_slice(artifact) {
        Ok(v) => v,
        Err(e) => {
            out.push_diagnostic(format!("clang-tidy: malformed artifact: {e}"));
            return out;
        }
    };

    for (file_key, entries) in parsed {
        for entry in entries {
            let raw_path = entry.path.clone().unwrap_or_else(|| file_key.clone());
            let (path, was_absolute) = normalize(&raw_path);
            if was_absolute {
                out.push_diagnostic(format!("clang-tidy: absolute path coerced: {raw_path}"));
            }
            if entry.line < 1 {
                out.push_diagnostic(format!("clang-tidy: invalid line {} in {path}", entry.line));
                continue;
            }

            // clang-tidy never reports its own severity in this artifact
            // shape; every finding is a style/lint Warning, and
            // `publishable_source` (when false, meaning the source line
            // itself belongs to a generated/vendored region) is carried
            // into the body for the classifier's patch-membership check to
            // use as a secondary signal rather than a parse-time decision.
            out.issues.push(RawIssue {
                path,
                line: Some(entry.line),
                nb_lines: 1,
                column: entry.column,
                check: Some(entry.check.clone()),
                analyzer: "clang-tidy".to_string(),
                level: Level::Warning,
                message: entry.message,
                body: entry.header.map(|h| format!("header: {h}")).or_else(|| {
                    (!entry.publishable_source.unwrap_or(true))
                        .then(|| "publishable_source=false".to_string())
                }),
            });
        }
    }

    let _ = task_name;
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_artifact() {
        let artifact = br#"{"src/a.cpp":[{"path":"src/a.cpp","line":10,"column":3,"check":"modernize-use-auto","message":"use auto"}]}"#;
        let result = parse("source-test-clang-tidy", artifact);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].check.as_deref(), Some("modernize-use-auto"));
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn malformed_artifact_yields_diagnostic_not_panic() {
        let result = parse("source-test-clang-tidy", b"not json");
        assert!(result.issues.is_empty());
        assert_eq!(result.diagnostics.len(), 1);
    }

    #[test]
    fn absolute_path_is_coerced_with_diagnostic() {
        let artifact = br#"{"x":[{"path":"/abs/src/a.cpp","line":1,"check":"c","message":"m"}]}"#;
        let result = parse("t", artifact);
        assert_eq!(result.issues[0].path, "abs/src/a.cpp");
        assert_eq!(result.diagnostics.len(), 1);
    }
}
