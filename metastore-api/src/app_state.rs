use std::sync::Arc;

use axum::extract::FromRef;

use crate::{auth::TokenDecoder, domain::search::SearchService};

#[derive(Clone)]
pub struct AppState {
    pub search: SearchService,
    pub tokens: Arc<TokenDecoder>,
}

impl AppState {
    pub fn new(search: SearchService, tokens: Arc<TokenDecoder>) -> Self {
        Self { search, tokens }
    }
}

impl FromRef<AppState> for Arc<TokenDecoder> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}
