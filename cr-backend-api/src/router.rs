use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::{ApiStore, AppState};

pub fn build_router<S: ApiStore>(store: Arc<S>) -> Router {
    Router::new()
        .route("/v1/repository/", get(handlers::list_repositories::<S>))
        .route("/v1/diff/", get(handlers::list_diffs::<S>))
        .route("/v1/diff/{id}/", get(handlers::get_diff::<S>))
        .route("/v1/diff/{id}/issues/", get(handlers::list_diff_issues::<S>))
        .route("/v1/revision/{id}/", get(handlers::get_revision::<S>))
        .route("/v1/revision/{id}/diffs/", get(handlers::list_revision_diffs::<S>))
        .route(
            "/v1/check/{repository}/{analyzer}/{check}/",
            get(handlers::list_issues_by_check::<S>),
        )
        .route("/v1/check/stats/", get(handlers::check_stats::<S>))
        .route("/v1/check/history/", get(handlers::check_history::<S>))
        .with_state(AppState::new(store))
}
