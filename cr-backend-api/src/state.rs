use std::sync::Arc;

use cr_backend_domain::Store;

/// Bound satisfied by both `PgStore` and `InMemoryStore`; lets handlers and
/// the router stay generic over `Store` without repeating `Send + Sync +
/// 'static` everywhere axum's `State` extractor needs it.
pub trait ApiStore: Store + Send + Sync + 'static {}
impl<T: Store + Send + Sync + 'static> ApiStore for T {}

pub struct AppState<S: Store> {
    pub store: Arc<S>,
}

impl<S: Store> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self { store: self.store.clone() }
    }
}

impl<S: Store> AppState<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}
