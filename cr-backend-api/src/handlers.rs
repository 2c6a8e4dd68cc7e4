use axum::extract::{Path, Query, State};
use axum::Json;
use cr_backend_domain::{IssuesFilter, Pagination};

use crate::errors::ApiError;
use crate::pagination::{paginate, PaginatedResponse};
use crate::query::{CheckQuery, DiffListQuery, HistoryQuery, PageQuery, StatsQuery};
use crate::state::{AppState, ApiStore};

pub async fn list_repositories<S: ApiStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<cr_backend_domain::Repository>>, ApiError> {
    Ok(Json(state.store.list_repositories().await?))
}

pub async fn list_diffs<S: ApiStore>(
    State(state): State<AppState<S>>,
    Query(q): Query<DiffListQuery>,
) -> Result<Json<PaginatedResponse<cr_backend_domain::Diff>>, ApiError> {
    let issues = match q.issues.as_deref() {
        None | Some("") => IssuesFilter::Any,
        Some("no") => IssuesFilter::No,
        Some("any") => IssuesFilter::Any,
        Some("publishable") => IssuesFilter::Publishable,
        Some(other) => return Err(ApiError::BadRequest(format!("invalid issues filter: {other}"))),
    };
    let pagination = Pagination::new(q.page, q.page_size);
    let page = state
        .store
        .list_diffs(q.repository.as_deref(), q.search.as_deref(), issues, pagination)
        .await?;
    Ok(Json(paginate("/v1/diff/", "", pagination, page)))
}

pub async fn get_diff<S: ApiStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
) -> Result<Json<cr_backend_domain::Diff>, ApiError> {
    Ok(Json(state.store.get_diff(id).await?))
}

pub async fn list_diff_issues<S: ApiStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
    Query(q): Query<PageQuery>,
) -> Result<Json<PaginatedResponse<cr_backend_domain::Issue>>, ApiError> {
    let pagination = Pagination::new(q.page, q.page_size);
    let page = state.store.list_issues_for_diff(id, pagination).await?;
    Ok(Json(paginate(&format!("/v1/diff/{id}/issues/"), "", pagination, page)))
}

pub async fn get_revision<S: ApiStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
) -> Result<Json<cr_backend_domain::Revision>, ApiError> {
    Ok(Json(state.store.get_revision(id).await?))
}

pub async fn list_revision_diffs<S: ApiStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
    Query(q): Query<PageQuery>,
) -> Result<Json<PaginatedResponse<cr_backend_domain::Diff>>, ApiError> {
    let pagination = Pagination::new(q.page, q.page_size);
    let page = state.store.list_diffs_for_revision(id, pagination).await?;
    Ok(Json(paginate(&format!("/v1/revision/{id}/diffs/"), "", pagination, page)))
}

pub async fn list_issues_by_check<S: ApiStore>(
    State(state): State<AppState<S>>,
    Path((repository, analyzer, check)): Path<(String, String, String)>,
    Query(q): Query<CheckQuery>,
) -> Result<Json<PaginatedResponse<cr_backend_domain::Issue>>, ApiError> {
    let pagination = Pagination::new(q.page, q.page_size);
    let page = state
        .store
        .list_issues_by_check(&repository, &analyzer, &check, q.publishable, pagination)
        .await?;
    let path = format!("/v1/check/{repository}/{analyzer}/{check}/");
    Ok(Json(paginate(&path, "", pagination, page)))
}

pub async fn check_stats<S: ApiStore>(
    State(state): State<AppState<S>>,
    Query(q): Query<StatsQuery>,
) -> Result<Json<Vec<cr_backend_domain::CheckStat>>, ApiError> {
    Ok(Json(state.store.check_stats(q.since).await?))
}

pub async fn check_history<S: ApiStore>(
    State(state): State<AppState<S>>,
    Query(q): Query<HistoryQuery>,
) -> Result<Json<Vec<cr_backend_domain::HistoryPoint>>, ApiError> {
    Ok(Json(
        state
            .store
            .check_history(q.repository.as_deref(), q.analyzer.as_deref(), q.check.as_deref(), q.since)
            .await?,
    ))
}
