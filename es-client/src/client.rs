use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;

use crate::{response::ErrorResponse, EsURL, SearchResponse};

/// Where a search runs: an index and the mapping type inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTarget {
    pub index: String,
    pub doc_type: String,
}

impl SearchTarget {
    pub fn new(index: impl Into<String>, doc_type: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            doc_type: doc_type.into(),
        }
    }
}

/// How the engine gathers term statistics before scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchType {
    #[default]
    QueryThenFetch,
    DfsQueryThenFetch,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QueryThenFetch => "query_then_fetch",
            Self::DfsQueryThenFetch => "dfs_query_then_fetch",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub from: u64,
    pub size: u64,
}

#[derive(Clone)]
pub struct EsClient {
    http: reqwest::Client,
    base_url: EsURL,
}

impl EsClient {
    /// Builds a client for the engine at `address`.
    ///
    /// No connection is made here; the first request opens one.
    pub fn new(address: &str, request_timeout: Duration) -> Result<Self, EsError> {
        if address.trim().is_empty() {
            return Err(EsError::InvalidAddress(address.to_string()));
        }

        let base_url = EsURL::new(address);
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .https_only(base_url.is_tls())
            .build()
            .map_err(|e| EsError::Transport(e.to_string()))?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &EsURL {
        &self.base_url
    }

    fn search_url(&self, target: &SearchTarget, page: Page, search_type: SearchType) -> EsURL {
        self.base_url
            .append_path(&format!("{}/{}/_search", target.index, target.doc_type))
            .with_param("from", page.from)
            .with_param("size", page.size)
            .with_param("search_type", search_type.as_str())
    }

    pub async fn search<B: Serialize + ?Sized>(
        &self,
        target: &SearchTarget,
        body: &B,
        page: Page,
        search_type: SearchType,
    ) -> Result<SearchResponse, EsError> {
        let url = self.search_url(target, page, search_type);
        let started = Instant::now();

        let resp = self
            .http
            .post(url.as_ref())
            .json(body)
            .send()
            .await
            .map_err(|e| EsError::Transport(e.to_string()))?;

        let status = resp.status();
        tracing::debug!(
            url = %url,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search request finished"
        );

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| EsError::Transport(e.to_string()))?;

        if !status.is_success() {
            let reason = serde_json::from_slice::<ErrorResponse>(&bytes)
                .map(|r| r.error.describe())
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());

            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(EsError::NotFound(reason));
            }
            return Err(EsError::Status {
                status: status.as_u16(),
                reason,
            });
        }

        serde_json::from_slice::<SearchResponse>(&bytes).map_err(|e| {
            EsError::ParsingError(format!("Failed to parse search response as JSON: {}", e))
        })
    }
}

#[derive(Error, Debug)]
pub enum EsError {
    #[error("InvalidAddress: {0:?}")]
    InvalidAddress(String),
    #[error("TransportError: {0}")]
    Transport(String),
    #[error("NotFound: {0}")]
    NotFound(String),
    #[error("RequestError ({status}): {reason}")]
    Status { status: u16, reason: String },
    #[error("ParsingError: {0}")]
    ParsingError(String),
}
