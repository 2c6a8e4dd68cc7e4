//! The canonical default format: new analyzers register no parser of their
//! own and are parsed entirely by this module (spec 4.2).

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::path_norm::normalize;
use crate::types::{Level, ParseResult, RawIssue};

#[derive(Debug, Deserialize)]
struct DefaultEntry {
    #[serde(default)]
    path: Option<String>,
    line: Option<u32>,
    #[serde(default)]
    nb_lines: Option<u32>,
    #[serde(default)]
    column: Option<u32>,
    #[serde(default)]
    check: Option<String>,
    level: String,
    message: String,
    #[serde(default)]
    analyzer: Option<String>,
}

pub fn parse(task_name: &str, artifact: &[u8]) -> ParseResult {
    let mut out = ParseResult::default();

    let parsed: BTreeMap<String, Vec<DefaultEntry>> = match serde_json::from_slice(artifact) {
        Ok(v) => v,
        Err(e) => {
            out.push_diagnostic(format!("default: malformed artifact: {e}"));
            return out;
        }
    };

    for (file_key, entries) in parsed {
        for entry in entries {
            let raw_path = entry.path.clone().unwrap_or_else(|| file_key.clone());
            let (path, was_absolute) = normalize(&raw_path);
            if was_absolute {
                out.push_diagnostic(format!("default: absolute path coerced: {raw_path}"));
            }

            if let Some(l) = entry.line {
                if l < 1 {
                    out.push_diagnostic(format!("default: invalid line {l} in {path}"));
                    continue;
                }
            }

            let nb_lines = entry.nb_lines.unwrap_or(1);
            if nb_lines < 1 {
                out.push_diagnostic(format!("default: invalid nb_lines {nb_lines} in {path}"));
                continue;
            }

            let level = match entry.level.as_str() {
                "error" => Level::Error,
                "warning" => Level::Warning,
                other => {
                    out.push_diagnostic(format!("default: unknown level '{other}' in {path}"));
                    Level::Warning
                }
            };

            let analyzer = entry.analyzer.clone().unwrap_or_else(|| task_name.to_string());
            let check = entry.check.clone().unwrap_or_else(|| analyzer.clone());

            out.issues.push(RawIssue {
                path,
                line: entry.line,
                nb_lines,
                column: entry.column,
                check: Some(check),
                analyzer,
                level,
                message: entry.message,
                body: None,
            });
        }
    }

    out
}
