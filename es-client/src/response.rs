//! Wire types for the engine's `_search` response.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Body of a successful `_search` call.
///
/// Only the parts the search API reads are modelled; everything else in the
/// engine's reply is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub hits: Option<Hits>,
    #[serde(default)]
    pub aggregations: Option<Map<String, Value>>,
}

impl SearchResponse {
    /// Value of a single-value metric aggregation (`sum`, `avg`, ...).
    ///
    /// Returns `None` when the aggregation is missing or its value is `null`,
    /// which the engine reports for an empty match set on some versions.
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.aggregations
            .as_ref()?
            .get(name)?
            .get("value")?
            .as_f64()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Hits {
    pub total: TotalHits,
    #[serde(default)]
    pub hits: Vec<Hit>,
}

/// `hits.total` is a bare number before engine 7.0 and an object after.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum TotalHits {
    Count(u64),
    Object { value: u64 },
}

impl TotalHits {
    pub fn value(&self) -> u64 {
        match *self {
            Self::Count(value) | Self::Object { value } => value,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Hit {
    #[serde(rename = "_source", default)]
    pub source: Map<String, Value>,
}

/// Error body returned with a non-2xx status.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorCause,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ErrorCause {
    Detailed {
        #[serde(rename = "type")]
        kind: String,
        #[serde(default)]
        reason: Option<String>,
    },
    Message(String),
}

impl ErrorCause {
    pub fn describe(&self) -> String {
        match self {
            Self::Detailed {
                kind,
                reason: Some(reason),
            } => format!("{}: {}", kind, reason),
            Self::Detailed { kind, reason: None } => kind.clone(),
            Self::Message(message) => message.clone(),
        }
    }
}
