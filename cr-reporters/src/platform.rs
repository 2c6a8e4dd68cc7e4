//! Code-review platform reporter. Enum-dispatch over provider kind (today
//! only `GitLab`), adapted directly from `mr-reviewer::publish::gitlab`:
//! idempotency marker embedded in the comment body, existing markers loaded
//! before posting, inline finding = GitLab discussion, summary = GitLab note.

use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};

use crate::errors::{ReportError, ReportResult};
use crate::types::{ClassifiedRun, PlatformKind, PlatformReporterConfig, PublishOutcome};

const MARKER_RE: &str = r"<!--\s*cr:key=([^;>]+);hash=([0-9a-f]+);ver=\d+\s*-->";

fn make_marker_and_key(issue: &cr_classify::Issue) -> (String, String) {
    let line_key = issue.line.map(|l| l.to_string()).unwrap_or_else(|| "-".to_string());
    let key = format!("{}:{}", issue.path, line_key);
    let full_key = format!("{}#{}", key, issue.hash);
    let marker = format!("<!-- cr:key={};hash={};ver=1 -->", key, issue.hash);
    (marker, full_key)
}

fn build_http_client() -> ReportResult<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(30))
        .pool_idle_timeout(Some(Duration::from_secs(90)))
        .build()?)
}

fn build_headers(token: &str) -> ReportResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static("cr-reporters/1.0"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(
        "PRIVATE-TOKEN",
        HeaderValue::from_str(token).map_err(|e| ReportError::Platform(format!("bad token: {e}")))?,
    );
    Ok(headers)
}

async fn load_existing_markers(
    http: &reqwest::Client,
    headers: &HeaderMap,
    base_api: &str,
    project: &str,
    iid: u64,
) -> ReportResult<HashSet<String>> {
    let url = format!("{base_api}/projects/{project}/merge_requests/{iid}/discussions?per_page=100");

    #[derive(serde::Deserialize)]
    struct Note {
        body: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct Discussion {
        notes: Vec<Note>,
    }

    let resp = http.get(&url).headers(headers.clone()).send().await?;
    if !resp.status().is_success() {
        return Err(ReportError::Platform(format!("list discussions failed: status={}", resp.status())));
    }

    let discussions: Vec<Discussion> = resp.json().await.unwrap_or_default();
    let re = Regex::new(MARKER_RE).expect("static regex");
    let mut markers = HashSet::new();
    for discussion in discussions {
        for note in discussion.notes {
            if let Some(body) = note.body {
                if let Some(caps) = re.captures(&body) {
                    let key = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
                    let hash = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
                    markers.insert(format!("{key}#{hash}"));
                }
            }
        }
    }
    Ok(markers)
}

async fn post_inline(
    http: &reqwest::Client,
    headers: &HeaderMap,
    base_api: &str,
    project: &str,
    iid: u64,
    path: &str,
    line: u32,
    body: &str,
) -> ReportResult<()> {
    #[derive(serde::Serialize)]
    struct Position<'a> {
        position_type: &'a str,
        new_path: &'a str,
        new_line: u32,
    }
    #[derive(serde::Serialize)]
    struct Req<'a> {
        body: &'a str,
        position: Position<'a>,
    }

    let url = format!("{base_api}/projects/{project}/merge_requests/{iid}/discussions");
    let req = Req { body, position: Position { position_type: "text", new_path: path, new_line: line } };
    let resp = http.post(&url).headers(headers.clone()).json(&req).send().await?;
    if !resp.status().is_success() {
        return Err(ReportError::Platform(format!("inline post failed: status={}", resp.status())));
    }
    Ok(())
}

async fn post_summary(
    http: &reqwest::Client,
    headers: &HeaderMap,
    base_api: &str,
    project: &str,
    iid: u64,
    body: &str,
) -> ReportResult<()> {
    #[derive(serde::Serialize)]
    struct Req<'a> {
        body: &'a str,
    }
    let url = format!("{base_api}/projects/{project}/merge_requests/{iid}/notes");
    let resp = http.post(&url).headers(headers.clone()).json(&Req { body }).send().await?;
    if !resp.status().is_success() {
        return Err(ReportError::Platform(format!("note post failed: status={}", resp.status())));
    }
    Ok(())
}

fn render_summary(run: &ClassifiedRun, skipped_analyzers: &[String]) -> String {
    let publishable: Vec<_> = run.issues.iter().filter(|i| i.publishable && !skipped_analyzers.contains(&i.analyzer)).collect();

    let mut counts: BTreeMap<(&str, &'static str), u32> = BTreeMap::new();
    for issue in &publishable {
        let level = if issue.level == cr_analyzers::Level::Error { "error" } else { "warning" };
        *counts.entry((issue.analyzer.as_str(), level)).or_insert(0) += 1;
    }

    let mut body = format!("### Code review: {} publishable issue(s)\n\n", publishable.len());
    body.push_str("| analyzer | level | count |\n|---|---|---|\n");
    for ((analyzer, level), count) in counts {
        body.push_str(&format!("| {analyzer} | {level} | {count} |\n"));
    }
    body
}

pub async fn publish(cfg: &PlatformReporterConfig, run: &ClassifiedRun) -> ReportResult<PublishOutcome> {
    match cfg.kind {
        PlatformKind::GitLab => publish_gitlab(cfg, run).await,
    }
}

async fn publish_gitlab(cfg: &PlatformReporterConfig, run: &ClassifiedRun) -> ReportResult<PublishOutcome> {
    let http = build_http_client()?;
    let headers = build_headers(&cfg.token)?;
    let base_api = cfg.base_api.trim_end_matches('/');

    let existing = load_existing_markers(&http, &headers, base_api, &cfg.project, cfg.iid).await?;

    let publishable: Vec<_> = run
        .issues
        .iter()
        .filter(|i| i.publishable && !cfg.analyzers_skipped.contains(&i.analyzer))
        .collect();

    // Every publishable finding for this revision was already posted on a
    // prior attempt: nothing new to say, skip the network round trip (P3).
    if !publishable.is_empty() && publishable.iter().all(|issue| existing.contains(&make_marker_and_key(issue).1)) {
        return Ok(PublishOutcome::AlreadyPublished);
    }

    let mut inline = 0;
    for issue in &publishable {
        let (marker, key) = make_marker_and_key(issue);
        if existing.contains(&key) {
            continue;
        }
        let Some(line) = issue.line else { continue };
        let body = format!("{}\n\n{}", issue.message, marker);
        post_inline(&http, &headers, base_api, &cfg.project, cfg.iid, &issue.path, line, &body).await?;
        inline += 1;
    }

    let summary = render_summary(run, &cfg.analyzers_skipped);
    post_summary(&http, &headers, base_api, &cfg.project, cfg.iid, &summary).await?;

    Ok(PublishOutcome::Published { inline, summary: true })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_key_is_stable_for_same_issue() {
        let issue = cr_classify::Issue {
            hash: "abc123".to_string(),
            path: "src/lib.rs".to_string(),
            line: Some(5),
            nb_lines: 1,
            check: None,
            analyzer: "clang-tidy".to_string(),
            message: "m".to_string(),
            body: None,
            level: cr_analyzers::Level::Error,
            in_patch: true,
            new_for_revision: true,
            publishable: true,
        };
        let (_, key1) = make_marker_and_key(&issue);
        let (_, key2) = make_marker_and_key(&issue);
        assert_eq!(key1, key2);
        assert_eq!(key1, "src/lib.rs:5#abc123");
    }
}
