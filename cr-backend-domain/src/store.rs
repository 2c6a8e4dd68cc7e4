use std::future::Future;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::DomainResult;
use crate::types::{Diff, Issue, IssueLevel, IssueLink, ProviderKind, RepoKind, Repository, Revision};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssuesFilter {
    No,
    Any,
    Publishable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: i64,
    pub results: Vec<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckStat {
    pub repository: String,
    pub analyzer: String,
    pub check: String,
    pub total: i64,
    pub publishable: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub total: i64,
}

/// One pagination window: 1-based `page`, capped `page_size` (spec 6).
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Pagination {
    pub const DEFAULT_PAGE_SIZE: u32 = 50;
    pub const MAX_PAGE_SIZE: u32 = 200;

    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size.unwrap_or(Self::DEFAULT_PAGE_SIZE).clamp(1, Self::MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        ((self.page - 1) as i64) * self.page_size as i64
    }

    pub fn limit(&self) -> i64 {
        self.page_size as i64
    }
}

/// Not object-safe by design: `cr-backend-domain` exposes exactly one
/// concrete implementation (`PgStore`) plus, for tests, `InMemoryStore`.
/// No `Box<dyn Store>` anywhere (teacher's no-trait-objects rule).
pub trait Store {
    fn upsert_repository(&self, slug: &str, url: &str, kind: RepoKind) -> impl Future<Output = DomainResult<Repository>> + Send;
    fn get_repository(&self, id: i64) -> impl Future<Output = DomainResult<Repository>> + Send;
    fn get_repository_by_slug(&self, slug: &str) -> impl Future<Output = DomainResult<Repository>> + Send;
    fn list_repositories(&self) -> impl Future<Output = DomainResult<Vec<Repository>>> + Send;

    fn upsert_revision(
        &self,
        provider: ProviderKind,
        provider_id: &str,
        title: &str,
        bug_id: Option<i64>,
        base_repository_id: i64,
    ) -> impl Future<Output = DomainResult<Revision>> + Send;
    fn get_revision(&self, id: i64) -> impl Future<Output = DomainResult<Revision>> + Send;
    fn list_diffs_for_revision(
        &self,
        revision_id: i64,
        pagination: Pagination,
    ) -> impl Future<Output = DomainResult<Page<Diff>>> + Send;

    fn upsert_diff(
        &self,
        revision_id: i64,
        provider_diff_id: i64,
        commit_hash: &str,
        review_task_id: &str,
        base_repository_id: i64,
    ) -> impl Future<Output = DomainResult<Diff>> + Send;
    fn get_diff(&self, id: i64) -> impl Future<Output = DomainResult<Diff>> + Send;
    fn list_diffs(
        &self,
        repository_slug: Option<&str>,
        search: Option<&str>,
        issues: IssuesFilter,
        pagination: Pagination,
    ) -> impl Future<Output = DomainResult<Page<Diff>>> + Send;

    fn upsert_issue(
        &self,
        hash: &str,
        path: &str,
        line: Option<i32>,
        nb_lines: i32,
        check: Option<&str>,
        analyzer: &str,
        level: IssueLevel,
        message: &str,
        body: Option<&str>,
    ) -> impl Future<Output = DomainResult<Issue>> + Send;
    /// Hashes of every issue linked to this revision by a *previously
    /// ingested* diff (spec 4.3) — `exclude_diff_id` names the diff the
    /// current run is producing (already upserted for identity resolution)
    /// so its own link, if a prior run wrote one, never counts as "prior"
    /// for this same run. Omitting the exclusion would flip `new_for_revision`
    /// (and therefore `publishable`) to `false` on every re-run of the same
    /// diff, breaking P3.
    fn hashes_for_revision(
        &self,
        revision_id: i64,
        exclude_diff_id: Option<i64>,
    ) -> impl Future<Output = DomainResult<Vec<String>>> + Send;
    fn list_issues_for_diff(
        &self,
        diff_id: i64,
        pagination: Pagination,
    ) -> impl Future<Output = DomainResult<Page<Issue>>> + Send;
    fn list_issues_by_check(
        &self,
        repository_slug: &str,
        analyzer: &str,
        check: &str,
        publishable: Option<bool>,
        pagination: Pagination,
    ) -> impl Future<Output = DomainResult<Page<Issue>>> + Send;

    /// Upsert on `(issue_id, diff_id)`; `ON CONFLICT ... DO UPDATE` so a
    /// retried run never loses I5 (every Diff's linked-issue set equals what
    /// the pipeline produced for it, never a subset).
    fn upsert_issue_link(
        &self,
        issue_id: i64,
        diff_id: i64,
        revision_id: i64,
        in_patch: bool,
        new_for_revision: bool,
        publishable: bool,
    ) -> impl Future<Output = DomainResult<IssueLink>> + Send;

    fn check_stats(&self, since: NaiveDate) -> impl Future<Output = DomainResult<Vec<CheckStat>>> + Send;
    fn check_history(
        &self,
        repository_slug: Option<&str>,
        analyzer: Option<&str>,
        check: Option<&str>,
        since: NaiveDate,
    ) -> impl Future<Output = DomainResult<Vec<HistoryPoint>>> + Send;
}
