//! DRF-shaped `{count, next, previous, results}` envelope, chosen because
//! the out-of-scope presentation layer already speaks that contract (the
//! upstream Mozilla code-review system's backend is a Django REST
//! Framework service).

use cr_backend_domain::{Page, Pagination};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

pub fn paginate<T>(base_path: &str, extra_query: &str, pagination: Pagination, page: Page<T>) -> PaginatedResponse<T> {
    let page_size = pagination.page_size as i64;
    let total_pages = ((page.count + page_size - 1) / page_size).max(1);
    let current = pagination.page as i64;

    let link = |p: i64| -> String {
        if extra_query.is_empty() {
            format!("{base_path}?page={p}&page_size={}", pagination.page_size)
        } else {
            format!("{base_path}?page={p}&page_size={}&{extra_query}", pagination.page_size)
        }
    };

    PaginatedResponse {
        count: page.count,
        next: (current < total_pages).then(|| link(current + 1)),
        previous: (current > 1).then(|| link(current - 1)),
        results: page.results,
    }
}
