//! Elasticsearch engine backed by the `es-client` crate.

use std::time::Duration;

use async_trait::async_trait;
use es_client::{EsClient, EsError, SearchResponse, SearchTarget, SearchType};
use tokio::sync::OnceCell;

use crate::domain::search::profile::TOTAL_BYTES_AGGREGATION;
use crate::domain::search::traits::{Result, SearchEngine, SearchError};
use crate::domain::search::types::{EngineRequest, EngineResponse};

/// Engine talking to an Elasticsearch cluster over HTTP.
///
/// The HTTP client is built on the first search, not at startup. A failed
/// build is reported as [`SearchError::EngineUnavailable`] and attempted
/// again on the next call.
///
/// # Example
///
/// ```ignore
/// let engine = ElasticSearchEngine::new("localhost:9200", Duration::from_secs(30));
/// let response = engine.search(&request).await?;
/// ```
pub struct ElasticSearchEngine {
    address: String,
    request_timeout: Duration,
    client: OnceCell<EsClient>,
}

impl ElasticSearchEngine {
    pub fn new(address: impl Into<String>, request_timeout: Duration) -> Self {
        Self {
            address: address.into(),
            request_timeout,
            client: OnceCell::new(),
        }
    }

    async fn client(&self) -> Result<&EsClient> {
        self.client
            .get_or_try_init(|| async {
                let client = EsClient::new(&self.address, self.request_timeout)
                    .map_err(map_es_error)?;
                tracing::info!(url = %client.base_url(), "Search engine client ready");
                Ok::<_, SearchError>(client)
            })
            .await
    }
}

#[async_trait]
impl SearchEngine for ElasticSearchEngine {
    async fn search(&self, request: &EngineRequest) -> Result<EngineResponse> {
        let client = self.client().await?;
        let target = SearchTarget::new(request.index, request.doc_type);
        let page = es_client::Page {
            from: request.page.from,
            size: request.page.size,
        };

        let response = client
            .search(&target, &request.body, page, SearchType::DfsQueryThenFetch)
            .await
            .map_err(map_es_error)?;

        Ok(to_engine_response(response))
    }
}

fn to_engine_response(response: SearchResponse) -> EngineResponse {
    let total_bytes = response.metric(TOTAL_BYTES_AGGREGATION);
    match response.hits {
        Some(hits) => EngineResponse {
            total: Some(hits.total.value()),
            documents: hits.hits.into_iter().map(|hit| hit.source).collect(),
            total_bytes,
        },
        None => EngineResponse {
            total_bytes,
            ..Default::default()
        },
    }
}

fn map_es_error(e: EsError) -> SearchError {
    match e {
        EsError::InvalidAddress(_) | EsError::Transport(_) => {
            SearchError::EngineUnavailable(e.to_string())
        }
        EsError::NotFound(reason) => SearchError::IndexNotFound(reason),
        EsError::Status { .. } | EsError::ParsingError(_) => {
            SearchError::EngineQueryError(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::search::query::{Clause, CompiledQuery, SumAggregation};
    use crate::domain::search::types::Page;
    use serde_json::json;
    use std::sync::Arc;
    use tokio::task::JoinSet;

    fn response(body: serde_json::Value) -> SearchResponse {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn maps_hits_and_aggregate() {
        let engine_response = to_engine_response(response(json!({
            "took": 3,
            "hits": {
                "total": {"value": 105, "relation": "eq"},
                "hits": [
                    {"_id": "1", "_score": 1.0, "_source": {"name": "a"}},
                    {"_id": "2", "_score": 0.5, "_source": {"name": "b"}}
                ]
            },
            "aggregations": {"total_bytes": {"value": 1050.0}}
        })));

        assert_eq!(engine_response.total, Some(105));
        assert_eq!(engine_response.total_bytes, Some(1050.0));
        assert_eq!(engine_response.documents.len(), 2);
        assert_eq!(engine_response.documents[1]["name"], "b");
    }

    #[test]
    fn missing_sections_stay_unset() {
        let engine_response = to_engine_response(response(json!({
            "took": 1,
            "aggregations": {"total_bytes": {"value": null}}
        })));

        assert_eq!(engine_response, EngineResponse::default());
    }

    #[test]
    fn client_errors_map_to_search_errors() {
        assert!(matches!(
            map_es_error(EsError::Transport("connection refused".into())),
            SearchError::EngineUnavailable(_)
        ));
        assert_eq!(
            map_es_error(EsError::NotFound("no such index [datahub]".into())),
            SearchError::IndexNotFound("no such index [datahub]".into())
        );
        assert!(matches!(
            map_es_error(EsError::Status {
                status: 400,
                reason: "parsing_exception".into()
            }),
            SearchError::EngineQueryError(_)
        ));
    }

    #[tokio::test]
    async fn empty_address_is_unavailable_and_retried() {
        let engine = ElasticSearchEngine::new("", Duration::from_secs(1));
        let request = EngineRequest {
            index: "datahub",
            doc_type: "dataset",
            body: CompiledQuery {
                query: Clause::MatchAll,
                sort: vec![],
                aggregation: SumAggregation {
                    name: TOTAL_BYTES_AGGREGATION.into(),
                    field: "datahub.stats.bytes".into(),
                },
                source_fields: None,
            },
            page: Page { size: 1, from: 0 },
        };

        for _ in 0..2 {
            let err = engine.search(&request).await.unwrap_err();
            assert!(matches!(err, SearchError::EngineUnavailable(_)));
        }
        assert!(!engine.client.initialized());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_calls_share_one_client() {
        let engine = Arc::new(ElasticSearchEngine::new(
            "localhost:9200",
            Duration::from_secs(1),
        ));

        let mut tasks = JoinSet::new();
        for _ in 0..8 {
            let engine = Arc::clone(&engine);
            tasks.spawn(async move {
                let client = engine.client().await.unwrap();
                client as *const EsClient as usize
            });
        }

        let mut addresses = Vec::new();
        while let Some(address) = tasks.join_next().await {
            addresses.push(address.unwrap());
        }

        assert_eq!(addresses.len(), 8);
        let winner = engine.client().await.unwrap();
        assert!(addresses
            .iter()
            .all(|&address| std::ptr::eq(address as *const EsClient, winner)));
        assert!(engine.client.initialized());
    }
}
