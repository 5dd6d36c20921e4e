//! Core types for the search domain.

use serde::Serialize;
use serde_json::{Map, Value};

use super::query::CompiledQuery;
use super::traits::SearchError;

/// A stored document as returned by the engine.
pub type Document = Map<String, Value>;

/// Multi-valued request parameters.
///
/// Names keep the order of their first appearance and values keep request
/// order. Single-valued parameters read with [`RawParams::first`], so the
/// first occurrence wins and later ones are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawParams {
    entries: Vec<(String, Vec<String>)>,
}

impl RawParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one value for `name`.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((name, vec![value])),
        }
    }

    /// First value given for `name`.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name)?.first().map(String::as_str)
    }

    /// All values given for `name`, in request order.
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }

    /// Remove `name` and return its values.
    pub fn take(&mut self, name: &str) -> Option<Vec<String>> {
        let idx = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }
}

impl<K, V> FromIterator<(K, V)> for RawParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.push(name, value);
        }
        params
    }
}

/// Requested result window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub size: u64,
    pub from: u64,
}

/// Everything the engine needs for one search.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineRequest {
    pub index: &'static str,
    pub doc_type: &'static str,
    pub body: CompiledQuery,
    pub page: Page,
}

/// Raw engine reply before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineResponse {
    pub documents: Vec<Document>,
    /// `None` when the engine reported no hits section at all.
    pub total: Option<u64>,
    /// `None` when the aggregate is missing or null.
    pub total_bytes: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total: u64,
    #[serde(rename = "totalBytes")]
    pub total_bytes: f64,
}

/// Response body of a search call.
///
/// `error` is only set on failure, and then `results` is empty and the
/// summary is zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchOutcome {
    pub results: Vec<Document>,
    pub summary: Summary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchOutcome {
    pub fn failed(err: &SearchError) -> Self {
        Self {
            results: Vec::new(),
            summary: Summary::default(),
            error: Some(err.to_string()),
        }
    }
}
