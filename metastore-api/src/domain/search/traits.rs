//! Trait definitions for search domain abstractions.
//!
//! The engine sits behind [`SearchEngine`] so the service can be tested
//! against an in-memory implementation.

use async_trait::async_trait;

use super::types::{EngineRequest, EngineResponse};

/// Error type for search operations.
///
/// None of these escape [`super::SearchService::search`]; they are turned
/// into the `error` field of the outcome.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SearchError {
    #[error("malformed value {value:?} for parameter '{param}': {reason}")]
    MalformedFilterValue {
        param: String,
        value: String,
        reason: String,
    },

    #[error("unknown search kind: {0}")]
    UnknownProfile(String),

    #[error("search engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("search engine rejected the query: {0}")]
    EngineQueryError(String),

    #[error("index not found: {0}")]
    IndexNotFound(String),
}

impl SearchError {
    pub fn malformed(
        param: impl Into<String>,
        value: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        Self::MalformedFilterValue {
            param: param.into(),
            value: value.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the failure was caused by the request rather than the engine.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedFilterValue { .. } | Self::UnknownProfile(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;

/// Executes compiled queries.
///
/// One call per search request; implementations add no retry.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    async fn search(&self, request: &EngineRequest) -> Result<EngineResponse>;
}
