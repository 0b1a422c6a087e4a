use std::sync::Arc;

use crate::auth::TokenStore;
use crate::database::IssueStore;

/// Shared handles injected into every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn IssueStore>,
    pub tokens: TokenStore,
}

impl AppState {
    pub fn new(store: Arc<dyn IssueStore>, tokens: TokenStore) -> Self {
        Self { store, tokens }
    }
}
