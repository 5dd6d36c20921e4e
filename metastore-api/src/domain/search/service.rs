//! Search service: compiles a request, runs it on the engine and normalizes
//! the outcome.

use std::sync::Arc;

use tracing::instrument;

use crate::domain::models::CallerId;

use super::compiler::compile_request;
use super::normalizer::normalize_response;
use super::profile::ProfileRegistry;
use super::traits::{Result, SearchEngine};
use super::types::{RawParams, SearchOutcome};

/// Search entry point shared by all requests.
///
/// Holds only immutable state, so one instance serves concurrent requests.
///
/// # Examples
///
/// ```ignore
/// let service = SearchService::new(engine, ProfileRegistry::builtin()?);
/// let outcome = service.search("dataset", None, &params).await;
/// ```
#[derive(Clone)]
pub struct SearchService {
    engine: Arc<dyn SearchEngine>,
    registry: Arc<ProfileRegistry>,
}

impl SearchService {
    pub fn new(engine: impl SearchEngine + 'static, registry: ProfileRegistry) -> Self {
        Self {
            engine: Arc::new(engine),
            registry: Arc::new(registry),
        }
    }

    /// Execute a search for `kind` on behalf of `caller`.
    ///
    /// Never fails: input and engine errors come back as an outcome with
    /// empty results, a zero summary and an `error` message.
    #[instrument(
        name = "search",
        skip(self, caller, params),
        fields(caller = caller.map(CallerId::as_str))
    )]
    pub async fn search(
        &self,
        kind: &str,
        caller: Option<&CallerId>,
        params: &RawParams,
    ) -> SearchOutcome {
        match self.try_search(kind, caller, params).await {
            Ok(outcome) => outcome,
            Err(err) => {
                if err.is_input_error() {
                    tracing::warn!(error = %err, "Rejected search request");
                } else {
                    tracing::error!(error = %err, "Search engine call failed");
                }
                SearchOutcome::failed(&err)
            }
        }
    }

    async fn try_search(
        &self,
        kind: &str,
        caller: Option<&CallerId>,
        params: &RawParams,
    ) -> Result<SearchOutcome> {
        let request = compile_request(&self.registry, kind, caller, params)?;
        let profile = self.registry.lookup(kind)?;

        tracing::debug!(
            index = request.index,
            size = request.page.size,
            from = request.page.from,
            query = %request.body.to_json(),
            "Performing search"
        );

        let response = self.engine.search(&request).await?;
        Ok(normalize_response(profile, response))
    }
}

impl std::fmt::Debug for SearchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchService")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
