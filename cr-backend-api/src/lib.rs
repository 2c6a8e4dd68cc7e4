//! Read-only paginated HTTP surface over `cr-backend-domain` (spec 6).

mod errors;
mod handlers;
mod pagination;
mod query;
mod router;
mod state;

pub use errors::ApiError;
pub use pagination::PaginatedResponse;
pub use router::build_router;
pub use state::{ApiStore, AppState};
