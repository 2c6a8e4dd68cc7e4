//! Postgres-backed `Store`. Queries are built and bound dynamically (no
//! `sqlx::query!` compile-time macros) so the crate has no build-time
//! dependency on a live database, matching `dashflow-sql-database`'s
//! runtime-`Row`-based style.

use chrono::NaiveDate;
use sqlx::{PgPool, Row};

use crate::errors::{DomainError, DomainResult};
use crate::store::{CheckStat, HistoryPoint, IssuesFilter, Page, Pagination, Store};
use crate::types::{Diff, Issue, IssueLevel, IssueLink, ProviderKind, RepoKind, Repository, Revision};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> DomainResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await.map_err(|e| {
            DomainError::Validation(format!("migration failed: {e}"))
        })
    }
}

fn map_not_found<T>(result: sqlx::Result<Option<T>>) -> DomainResult<T> {
    match result {
        Ok(Some(v)) => Ok(v),
        Ok(None) => Err(DomainError::NotFound),
        Err(e) => Err(e.into()),
    }
}

impl Store for PgStore {
    async fn upsert_repository(&self, slug: &str, url: &str, kind: RepoKind) -> DomainResult<Repository> {
        let row = sqlx::query_as::<_, Repository>(
            "INSERT INTO repository (slug, url, kind) VALUES ($1, $2, $3)
             ON CONFLICT (slug) DO UPDATE SET url = EXCLUDED.url
             RETURNING id, slug, url, kind",
        )
        .bind(slug)
        .bind(url)
        .bind(kind)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_repository(&self, id: i64) -> DomainResult<Repository> {
        map_not_found(
            sqlx::query_as::<_, Repository>("SELECT id, slug, url, kind FROM repository WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await,
        )
    }

    async fn get_repository_by_slug(&self, slug: &str) -> DomainResult<Repository> {
        map_not_found(
            sqlx::query_as::<_, Repository>("SELECT id, slug, url, kind FROM repository WHERE slug = $1")
                .bind(slug)
                .fetch_optional(&self.pool)
                .await,
        )
    }

    async fn list_repositories(&self) -> DomainResult<Vec<Repository>> {
        let rows = sqlx::query_as::<_, Repository>("SELECT id, slug, url, kind FROM repository ORDER BY slug")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn upsert_revision(
        &self,
        provider: ProviderKind,
        provider_id: &str,
        title: &str,
        bug_id: Option<i64>,
        base_repository_id: i64,
    ) -> DomainResult<Revision> {
        let row = sqlx::query_as::<_, Revision>(
            "INSERT INTO revision (provider, provider_id, title, bug_id, base_repository_id)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (provider, provider_id) DO UPDATE SET title = EXCLUDED.title, bug_id = EXCLUDED.bug_id
             RETURNING id, provider, provider_id, title, bug_id, base_repository_id",
        )
        .bind(provider)
        .bind(provider_id)
        .bind(title)
        .bind(bug_id)
        .bind(base_repository_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_revision(&self, id: i64) -> DomainResult<Revision> {
        map_not_found(
            sqlx::query_as::<_, Revision>(
                "SELECT id, provider, provider_id, title, bug_id, base_repository_id
                 FROM revision WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await,
        )
    }

    async fn list_diffs_for_revision(&self, revision_id: i64, pagination: Pagination) -> DomainResult<Page<Diff>> {
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM diff WHERE revision_id = $1")
            .bind(revision_id)
            .fetch_one(&self.pool)
            .await?;
        let results = sqlx::query_as::<_, Diff>(
            "SELECT id, revision_id, provider_diff_id, commit_hash, review_task_id, base_repository_id, created_at
             FROM diff WHERE revision_id = $1 ORDER BY created_at OFFSET $2 LIMIT $3",
        )
        .bind(revision_id)
        .bind(pagination.offset())
        .bind(pagination.limit())
        .fetch_all(&self.pool)
        .await?;
        Ok(Page { count, results })
    }

    async fn upsert_diff(
        &self,
        revision_id: i64,
        provider_diff_id: i64,
        commit_hash: &str,
        review_task_id: &str,
        base_repository_id: i64,
    ) -> DomainResult<Diff> {
        let row = sqlx::query_as::<_, Diff>(
            "INSERT INTO diff (revision_id, provider_diff_id, commit_hash, review_task_id, base_repository_id)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (revision_id, provider_diff_id) DO UPDATE SET commit_hash = EXCLUDED.commit_hash
             RETURNING id, revision_id, provider_diff_id, commit_hash, review_task_id, base_repository_id, created_at",
        )
        .bind(revision_id)
        .bind(provider_diff_id)
        .bind(commit_hash)
        .bind(review_task_id)
        .bind(base_repository_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_diff(&self, id: i64) -> DomainResult<Diff> {
        map_not_found(
            sqlx::query_as::<_, Diff>(
                "SELECT id, revision_id, provider_diff_id, commit_hash, review_task_id, base_repository_id, created_at
                 FROM diff WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await,
        )
    }

    async fn list_diffs(
        &self,
        repository_slug: Option<&str>,
        search: Option<&str>,
        issues: IssuesFilter,
        pagination: Pagination,
    ) -> DomainResult<Page<Diff>> {
        let issues_clause = match issues {
            IssuesFilter::No => "NOT EXISTS (SELECT 1 FROM issue_link il WHERE il.diff_id = d.id)",
            IssuesFilter::Any => "EXISTS (SELECT 1 FROM issue_link il WHERE il.diff_id = d.id)",
            IssuesFilter::Publishable => {
                "EXISTS (SELECT 1 FROM issue_link il WHERE il.diff_id = d.id AND il.publishable)"
            }
        };

        let sql_base = format!(
            "FROM diff d
             JOIN repository r ON r.id = d.base_repository_id
             WHERE ($1::text IS NULL OR r.slug = $1)
               AND ($2::text IS NULL OR d.commit_hash ILIKE '%' || $2 || '%' OR d.review_task_id ILIKE '%' || $2 || '%')
               AND {issues_clause}"
        );

        let count: i64 = sqlx::query_scalar(&format!("SELECT count(*) {sql_base}"))
            .bind(repository_slug)
            .bind(search)
            .fetch_one(&self.pool)
            .await?;

        let results = sqlx::query_as::<_, Diff>(&format!(
            "SELECT d.id, d.revision_id, d.provider_diff_id, d.commit_hash, d.review_task_id, d.base_repository_id, d.created_at
             {sql_base} ORDER BY d.created_at DESC OFFSET $3 LIMIT $4"
        ))
        .bind(repository_slug)
        .bind(search)
        .bind(pagination.offset())
        .bind(pagination.limit())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page { count, results })
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
        // I1/I4: the hash is the identity; a re-observation never creates a
        // second row, and the `(hash, path, line, analyzer, check)` tuple
        // that produced it is immutable by construction.
        let row = sqlx::query_as::<_, Issue>(
            "INSERT INTO issue (hash, path, line, nb_lines, check_id, analyzer, level, message, body)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             ON CONFLICT (hash) DO UPDATE SET hash = EXCLUDED.hash
             RETURNING id, hash, path, line, nb_lines, check_id AS \"check\", analyzer, level, message, body, created_at",
        )
        .bind(hash)
        .bind(path)
        .bind(line)
        .bind(nb_lines)
        .bind(check)
        .bind(analyzer)
        .bind(level)
        .bind(message)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn hashes_for_revision(&self, revision_id: i64, exclude_diff_id: Option<i64>) -> DomainResult<Vec<String>> {
        let rows = sqlx::query(
            "SELECT DISTINCT i.hash FROM issue i
             JOIN issue_link il ON il.issue_id = i.id
             WHERE il.revision_id = $1 AND il.diff_id IS DISTINCT FROM $2",
        )
        .bind(revision_id)
        .bind(exclude_diff_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|r| r.get::<String, _>("hash")).collect())
    }

    async fn list_issues_for_diff(&self, diff_id: i64, pagination: Pagination) -> DomainResult<Page<Issue>> {
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM issue_link WHERE diff_id = $1")
            .bind(diff_id)
            .fetch_one(&self.pool)
            .await?;
        let results = sqlx::query_as::<_, Issue>(
            "SELECT i.id, i.hash, i.path, i.line, i.nb_lines, i.check_id AS \"check\", i.analyzer, i.level, i.message, i.body, i.created_at
             FROM issue i JOIN issue_link il ON il.issue_id = i.id
             WHERE il.diff_id = $1 ORDER BY i.path, i.line OFFSET $2 LIMIT $3",
        )
        .bind(diff_id)
        .bind(pagination.offset())
        .bind(pagination.limit())
        .fetch_all(&self.pool)
        .await?;
        Ok(Page { count, results })
    }

    async fn list_issues_by_check(
        &self,
        repository_slug: &str,
        analyzer: &str,
        check: &str,
        publishable: Option<bool>,
        pagination: Pagination,
    ) -> DomainResult<Page<Issue>> {
        let sql_base = "FROM issue i
             JOIN issue_link il ON il.issue_id = i.id
             JOIN diff d ON d.id = il.diff_id
             JOIN repository r ON r.id = d.base_repository_id
             WHERE r.slug = $1 AND i.analyzer = $2 AND i.check_id = $3
               AND ($4::boolean IS NULL OR il.publishable = $4)";

        let count: i64 = sqlx::query_scalar(&format!("SELECT count(DISTINCT i.id) {sql_base}"))
            .bind(repository_slug)
            .bind(analyzer)
            .bind(check)
            .bind(publishable)
            .fetch_one(&self.pool)
            .await?;

        let results = sqlx::query_as::<_, Issue>(&format!(
            "SELECT DISTINCT i.id, i.hash, i.path, i.line, i.nb_lines, i.check_id AS \"check\", i.analyzer, i.level, i.message, i.body, i.created_at
             {sql_base} ORDER BY i.path, i.line OFFSET $5 LIMIT $6"
        ))
        .bind(repository_slug)
        .bind(analyzer)
        .bind(check)
        .bind(publishable)
        .bind(pagination.offset())
        .bind(pagination.limit())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page { count, results })
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
        let row = sqlx::query_as::<_, IssueLink>(
            "INSERT INTO issue_link (issue_id, diff_id, revision_id, in_patch, new_for_revision, publishable)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (issue_id, diff_id) DO UPDATE SET
                 in_patch = EXCLUDED.in_patch,
                 new_for_revision = EXCLUDED.new_for_revision,
                 publishable = EXCLUDED.publishable
             RETURNING issue_id, diff_id, revision_id, in_patch, new_for_revision, publishable",
        )
        .bind(issue_id)
        .bind(diff_id)
        .bind(revision_id)
        .bind(in_patch)
        .bind(new_for_revision)
        .bind(publishable)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn check_stats(&self, since: NaiveDate) -> DomainResult<Vec<CheckStat>> {
        let rows = sqlx::query(
            "SELECT r.slug AS repository, i.analyzer, i.check_id AS \"check\",
                    count(*) AS total,
                    count(*) FILTER (WHERE il.publishable) AS publishable
             FROM issue i
             JOIN issue_link il ON il.issue_id = i.id
             JOIN diff d ON d.id = il.diff_id
             JOIN repository r ON r.id = d.base_repository_id
             WHERE i.created_at >= $1
             GROUP BY r.slug, i.analyzer, i.check_id",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| CheckStat {
                repository: row.get("repository"),
                analyzer: row.get("analyzer"),
                check: row.get::<Option<String>, _>("check").unwrap_or_default(),
                total: row.get("total"),
                publishable: row.get("publishable"),
            })
            .collect())
    }

    async fn check_history(
        &self,
        repository_slug: Option<&str>,
        analyzer: Option<&str>,
        check: Option<&str>,
        since: NaiveDate,
    ) -> DomainResult<Vec<HistoryPoint>> {
        let rows = sqlx::query(
            "SELECT date_trunc('day', i.created_at)::date AS date, count(*) AS total
             FROM issue i
             JOIN issue_link il ON il.issue_id = i.id
             JOIN diff d ON d.id = il.diff_id
             JOIN repository r ON r.id = d.base_repository_id
             WHERE i.created_at >= $1
               AND ($2::text IS NULL OR r.slug = $2)
               AND ($3::text IS NULL OR i.analyzer = $3)
               AND ($4::text IS NULL OR i.check_id = $4)
             GROUP BY date ORDER BY date",
        )
        .bind(since)
        .bind(repository_slug)
        .bind(analyzer)
        .bind(check)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| HistoryPoint {
                date: row.get("date"),
                total: row.get("total"),
            })
            .collect())
    }
}
