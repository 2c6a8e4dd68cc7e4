//! Common schema every analyzer parser converts its artifact(s) into.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    Error,
    Warning,
}

/// One issue as reported by a single analyzer task, before classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawIssue {
    /// Repository-relative path. Absolute paths are coerced here (with a
    /// diagnostic) before a `RawIssue` is ever constructed.
    pub path: String,
    /// `None` means "applies to the whole file".
    pub line: Option<u32>,
    pub nb_lines: u32,
    pub column: Option<u32>,
    pub check: Option<String>,
    pub analyzer: String,
    pub level: Level,
    pub message: String,
    pub body: Option<String>,
}

/// A non-fatal problem observed while parsing one artifact. Never crosses
/// the artifact boundary as an error (spec 4.2, property P5); the caller
/// lifts these into synthetic `pipeline` issues.
#[derive(Debug, Clone)]
pub struct ParseDiagnostic {
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    pub issues: Vec<RawIssue>,
    pub diagnostics: Vec<ParseDiagnostic>,
}

impl ParseResult {
    pub fn push_diagnostic(&mut self, reason: impl Into<String>) {
        self.diagnostics.push(ParseDiagnostic {
            reason: reason.into(),
        });
    }
}

/// Tagged variant for analyzer dispatch (spec 9's redesign of the source's
/// class hierarchy). New analyzers never need a new variant: they use
/// `Default` and are identified purely by the dispatch table in
/// `dispatch::detect_analyzer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzerKind {
    ClangTidy,
    ClangFormat,
    MozLint,
    Default,
}
