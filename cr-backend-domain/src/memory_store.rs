//! In-process `Store` for tests that don't want a live Postgres. Mirrors
//! `PgStore`'s upsert/query semantics with plain `Vec`s behind a mutex.

use std::sync::Mutex;

use chrono::{NaiveDate, Utc};

use crate::errors::{DomainError, DomainResult};
use crate::store::{CheckStat, HistoryPoint, IssuesFilter, Page, Pagination, Store};
use crate::types::{Diff, Issue, IssueLevel, IssueLink, ProviderKind, RepoKind, Repository, Revision};

#[derive(Default)]
struct Tables {
    repositories: Vec<Repository>,
    revisions: Vec<Revision>,
    diffs: Vec<Diff>,
    issues: Vec<Issue>,
    links: Vec<IssueLink>,
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn next_id<T>(items: &[T]) -> i64 {
    items.len() as i64 + 1
}

fn paginate<T: Clone>(items: Vec<T>, pagination: Pagination) -> Page<T> {
    let count = items.len() as i64;
    let start = pagination.offset().min(count) as usize;
    let end = (pagination.offset() + pagination.limit()).clamp(0, count) as usize;
    Page {
        count,
        results: items[start..end].to_vec(),
    }
}

impl Store for InMemoryStore {
    async fn upsert_repository(&self, slug: &str, url: &str, kind: RepoKind) -> DomainResult<Repository> {
        let mut t = self.tables.lock().unwrap();
        if let Some(existing) = t.repositories.iter_mut().find(|r| r.slug == slug) {
            existing.url = url.to_string();
            return Ok(existing.clone());
        }
        let repo = Repository {
            id: next_id(&t.repositories),
            slug: slug.to_string(),
            url: url.to_string(),
            kind,
        };
        t.repositories.push(repo.clone());
        Ok(repo)
    }

    async fn get_repository(&self, id: i64) -> DomainResult<Repository> {
        let t = self.tables.lock().unwrap();
        t.repositories.iter().find(|r| r.id == id).cloned().ok_or(DomainError::NotFound)
    }

    async fn get_repository_by_slug(&self, slug: &str) -> DomainResult<Repository> {
        let t = self.tables.lock().unwrap();
        t.repositories.iter().find(|r| r.slug == slug).cloned().ok_or(DomainError::NotFound)
    }

    async fn list_repositories(&self) -> DomainResult<Vec<Repository>> {
        let t = self.tables.lock().unwrap();
        let mut out = t.repositories.clone();
        out.sort_by(|a, b| a.slug.cmp(&b.slug));
        Ok(out)
    }

    async fn upsert_revision(
        &self,
        provider: ProviderKind,
        provider_id: &str,
        title: &str,
        bug_id: Option<i64>,
        base_repository_id: i64,
    ) -> DomainResult<Revision> {
        let mut t = self.tables.lock().unwrap();
        if let Some(existing) = t
            .revisions
            .iter_mut()
            .find(|r| r.provider == provider && r.provider_id == provider_id)
        {
            existing.title = title.to_string();
            existing.bug_id = bug_id;
            return Ok(existing.clone());
        }
        let revision = Revision {
            id: next_id(&t.revisions),
            provider,
            provider_id: provider_id.to_string(),
            title: title.to_string(),
            bug_id,
            base_repository_id,
        };
        t.revisions.push(revision.clone());
        Ok(revision)
    }

    async fn get_revision(&self, id: i64) -> DomainResult<Revision> {
        let t = self.tables.lock().unwrap();
        t.revisions.iter().find(|r| r.id == id).cloned().ok_or(DomainError::NotFound)
    }

    async fn list_diffs_for_revision(&self, revision_id: i64, pagination: Pagination) -> DomainResult<Page<Diff>> {
        let t = self.tables.lock().unwrap();
        let mut diffs: Vec<_> = t.diffs.iter().filter(|d| d.revision_id == revision_id).cloned().collect();
        diffs.sort_by_key(|d| d.created_at);
        Ok(paginate(diffs, pagination))
    }

    async fn upsert_diff(
        &self,
        revision_id: i64,
        provider_diff_id: i64,
        commit_hash: &str,
        review_task_id: &str,
        base_repository_id: i64,
    ) -> DomainResult<Diff> {
        let mut t = self.tables.lock().unwrap();
        if let Some(existing) = t
            .diffs
            .iter_mut()
            .find(|d| d.revision_id == revision_id && d.provider_diff_id == provider_diff_id)
        {
            existing.commit_hash = commit_hash.to_string();
            return Ok(existing.clone());
        }
        let diff = Diff {
            id: next_id(&t.diffs),
            revision_id,
            provider_diff_id,
            commit_hash: commit_hash.to_string(),
            review_task_id: review_task_id.to_string(),
            base_repository_id,
            created_at: Utc::now(),
        };
        t.diffs.push(diff.clone());
        Ok(diff)
    }

    async fn get_diff(&self, id: i64) -> DomainResult<Diff> {
        let t = self.tables.lock().unwrap();
        t.diffs.iter().find(|d| d.id == id).cloned().ok_or(DomainError::NotFound)
    }

    async fn list_diffs(
        &self,
        repository_slug: Option<&str>,
        search: Option<&str>,
        issues: IssuesFilter,
        pagination: Pagination,
    ) -> DomainResult<Page<Diff>> {
        let t = self.tables.lock().unwrap();
        let mut diffs: Vec<_> = t
            .diffs
            .iter()
            .filter(|d| {
                let repo_ok = repository_slug
                    .map(|slug| t.repositories.iter().any(|r| r.id == d.base_repository_id && r.slug == slug))
                    .unwrap_or(true);
                let search_ok = search
                    .map(|s| d.commit_hash.contains(s) || d.review_task_id.contains(s))
                    .unwrap_or(true);
                let has_any = t.links.iter().any(|l| l.diff_id == d.id);
                let has_publishable = t.links.iter().any(|l| l.diff_id == d.id && l.publishable);
                let issues_ok = match issues {
                    IssuesFilter::No => !has_any,
                    IssuesFilter::Any => has_any,
                    IssuesFilter::Publishable => has_publishable,
                };
                repo_ok && search_ok && issues_ok
            })
            .cloned()
            .collect();
        diffs.sort_by_key(|d| std::cmp::Reverse(d.created_at));
        Ok(paginate(diffs, pagination))
    }

    async fn upsert_issue(
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
    ) -> DomainResult<Issue> {
        let mut t = self.tables.lock().unwrap();
        if let Some(existing) = t.issues.iter().find(|i| i.hash == hash) {
            return Ok(existing.clone());
        }
        let issue = Issue {
            id: next_id(&t.issues),
            hash: hash.to_string(),
            path: path.to_string(),
            line,
            nb_lines,
            check: check.map(String::from),
            analyzer: analyzer.to_string(),
            level,
            message: message.to_string(),
            body: body.map(String::from),
            created_at: Utc::now(),
        };
        t.issues.push(issue.clone());
        Ok(issue)
    }

    async fn hashes_for_revision(&self, revision_id: i64, exclude_diff_id: Option<i64>) -> DomainResult<Vec<String>> {
        let t = self.tables.lock().unwrap();
        let hashes = t
            .links
            .iter()
            .filter(|l| l.revision_id == revision_id)
            .filter(|l| exclude_diff_id != Some(l.diff_id))
            .filter_map(|l| t.issues.iter().find(|i| i.id == l.issue_id).map(|i| i.hash.clone()))
            .collect();
        Ok(hashes)
    }

    async fn list_issues_for_diff(&self, diff_id: i64, pagination: Pagination) -> DomainResult<Page<Issue>> {
        let t = self.tables.lock().unwrap();
        let mut issues: Vec<_> = t
            .links
            .iter()
            .filter(|l| l.diff_id == diff_id)
            .filter_map(|l| t.issues.iter().find(|i| i.id == l.issue_id).cloned())
            .collect();
        issues.sort_by(|a, b| (a.path.clone(), a.line).cmp(&(b.path.clone(), b.line)));
        Ok(paginate(issues, pagination))
    }

    async fn list_issues_by_check(
        &self,
        repository_slug: &str,
        analyzer: &str,
        check: &str,
        publishable: Option<bool>,
        pagination: Pagination,
    ) -> DomainResult<Page<Issue>> {
        let t = self.tables.lock().unwrap();
        let mut issues: Vec<_> = t
            .links
            .iter()
            .filter(|l| match publishable {
                Some(p) => l.publishable == p,
                None => true,
            })
            .filter_map(|l| {
                let diff = t.diffs.iter().find(|d| d.id == l.diff_id)?;
                let repo = t.repositories.iter().find(|r| r.id == diff.base_repository_id)?;
                if repo.slug != repository_slug {
                    return None;
                }
                let issue = t.issues.iter().find(|i| i.id == l.issue_id)?;
                if issue.analyzer != analyzer || issue.check.as_deref() != Some(check) {
                    return None;
                }
                Some(issue.clone())
            })
            .collect();
        issues.sort_by(|a, b| (a.path.clone(), a.line).cmp(&(b.path.clone(), b.line)));
        issues.dedup_by(|a, b| a.id == b.id);
        Ok(paginate(issues, pagination))
    }

    async fn upsert_issue_link(
        &self,
        issue_id: i64,
        diff_id: i64,
        revision_id: i64,
        in_patch: bool,
        new_for_revision: bool,
        publishable: bool,
    ) -> DomainResult<IssueLink> {
        let mut t = self.tables.lock().unwrap();
        let link = IssueLink {
            issue_id,
            diff_id,
            revision_id,
            in_patch,
            new_for_revision,
            publishable,
        };
        if let Some(existing) = t.links.iter_mut().find(|l| l.issue_id == issue_id && l.diff_id == diff_id) {
            *existing = link;
            return Ok(link);
        }
        t.links.push(link);
        Ok(link)
    }

    async fn check_stats(&self, since: NaiveDate) -> DomainResult<Vec<CheckStat>> {
        let t = self.tables.lock().unwrap();
        let mut stats: Vec<CheckStat> = Vec::new();
        for link in &t.links {
            let Some(issue) = t.issues.iter().find(|i| i.id == link.issue_id) else { continue };
            if issue.created_at.date_naive() < since {
                continue;
            }
            let Some(diff) = t.diffs.iter().find(|d| d.id == link.diff_id) else { continue };
            let Some(repo) = t.repositories.iter().find(|r| r.id == diff.base_repository_id) else { continue };
            let check = issue.check.clone().unwrap_or_default();
            let entry = stats.iter_mut().find(|s| {
                s.repository == repo.slug && s.analyzer == issue.analyzer && s.check == check
            });
            match entry {
                Some(s) => {
                    s.total += 1;
                    if link.publishable {
                        s.publishable += 1;
                    }
                }
                None => stats.push(CheckStat {
                    repository: repo.slug.clone(),
                    analyzer: issue.analyzer.clone(),
                    check,
                    total: 1,
                    publishable: if link.publishable { 1 } else { 0 },
                }),
            }
        }
        Ok(stats)
    }

    async fn check_history(
        &self,
        repository_slug: Option<&str>,
        analyzer: Option<&str>,
        check: Option<&str>,
        since: NaiveDate,
    ) -> DomainResult<Vec<HistoryPoint>> {
        let t = self.tables.lock().unwrap();
        let mut points: Vec<HistoryPoint> = Vec::new();
        for link in &t.links {
            let Some(issue) = t.issues.iter().find(|i| i.id == link.issue_id) else { continue };
            let date = issue.created_at.date_naive();
            if date < since {
                continue;
            }
            let Some(diff) = t.diffs.iter().find(|d| d.id == link.diff_id) else { continue };
            let Some(repo) = t.repositories.iter().find(|r| r.id == diff.base_repository_id) else { continue };
            if repository_slug.is_some_and(|s| s != repo.slug) {
                continue;
            }
            if analyzer.is_some_and(|a| a != issue.analyzer) {
                continue;
            }
            if check.is_some_and(|c| Some(c) != issue.check.as_deref()) {
                continue;
            }
            match points.iter_mut().find(|p| p.date == date) {
                Some(p) => p.total += 1,
                None => points.push(HistoryPoint { date, total: 1 }),
            }
        }
        points.sort_by_key(|p| p.date);
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_repository_is_idempotent_on_slug() {
        let store = InMemoryStore::new();
        let a = store.upsert_repository("org/repo", "https://example.com/a", RepoKind::Base).await.unwrap();
        let b = store.upsert_repository("org/repo", "https://example.com/b", RepoKind::Base).await.unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(b.url, "https://example.com/b");
    }

    #[tokio::test]
    async fn upsert_issue_link_overwrites_flags_on_retry() {
        let store = InMemoryStore::new();
        let repo = store.upsert_repository("org/repo", "u", RepoKind::Base).await.unwrap();
        let revision = store
            .upsert_revision(ProviderKind::CodeReviewPlatform, "mr-1", "t", None, repo.id)
            .await
            .unwrap();
        let diff = store.upsert_diff(revision.id, 1, "a".repeat(40).as_str(), "task-1", repo.id).await.unwrap();
        let issue = store
            .upsert_issue("h1", "a.js", Some(1), 1, Some("c"), "eslint", IssueLevel::Warning, "m", None)
            .await
            .unwrap();
        store.upsert_issue_link(issue.id, diff.id, revision.id, false, true, false).await.unwrap();
        let updated = store.upsert_issue_link(issue.id, diff.id, revision.id, true, true, true).await.unwrap();
        assert!(updated.publishable);

        let page = store.list_issues_for_diff(diff.id, Pagination::new(None, None)).await.unwrap();
        assert_eq!(page.count, 1);
    }
}
