//! In-memory search engine for testing.
//!
//! Evaluates compiled clauses against stored documents with a simplified
//! scoring model: a `match` scores the number of shared lowercase tokens
//! times its boost, a `bool` sums the scores of its matching parts.

use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, RwLock};

use crate::domain::search::query::{BoolQuery, Clause, SortKey, SortOrder};
use crate::domain::search::traits::{Result, SearchEngine, SearchError};
use crate::domain::search::types::{Document, EngineRequest, EngineResponse};

/// Mock engine holding documents per index.
///
/// # Examples
///
/// ```ignore
/// let engine = MockSearchEngine::new();
/// engine.index("datahub", json!({"name": "a", "datahub": {"findability": "published"}}));
///
/// let failing = MockSearchEngine::new().failing(SearchError::EngineUnavailable("down".into()));
/// ```
#[derive(Clone, Default)]
pub struct MockSearchEngine {
    indices: Arc<RwLock<HashMap<String, Vec<Document>>>>,
    failure: Arc<RwLock<Option<SearchError>>>,
    call_count: Arc<AtomicUsize>,
}

impl MockSearchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `index` without documents.
    pub fn create_index(&self, index: &str) {
        self.indices
            .write()
            .unwrap()
            .entry(index.to_string())
            .or_default();
    }

    /// Store a document in `index`.
    pub fn index(&self, index: &str, document: Value) {
        let Value::Object(document) = document else {
            panic!("documents must be JSON objects");
        };
        self.indices
            .write()
            .unwrap()
            .entry(index.to_string())
            .or_default()
            .push(document);
    }

    /// Make every call fail with `err`.
    pub fn failing(self, err: SearchError) -> Self {
        *self.failure.write().unwrap() = Some(err);
        self
    }

    /// Number of times `search` was called.
    pub fn call_count(&self) -> usize {
        self.call_count.load(AtomicOrdering::SeqCst)
    }
}

#[async_trait]
impl SearchEngine for MockSearchEngine {
    async fn search(&self, request: &EngineRequest) -> Result<EngineResponse> {
        self.call_count.fetch_add(1, AtomicOrdering::SeqCst);

        if let Some(err) = self.failure.read().unwrap().clone() {
            return Err(err);
        }

        let indices = self.indices.read().unwrap();
        let Some(documents) = indices.get(request.index) else {
            return Err(SearchError::IndexNotFound(request.index.to_string()));
        };

        let mut matched: Vec<(f64, &Document)> = documents
            .iter()
            .filter_map(|doc| score(&request.body.query, doc).map(|s| (s, doc)))
            .collect();

        match request.body.sort.first() {
            Some(key) => matched.sort_by(|(_, a), (_, b)| compare_by(key, a, b)),
            None => matched.sort_by(|(a, _), (b, _)| b.partial_cmp(a).unwrap_or(Ordering::Equal)),
        }

        let bytes_field = &request.body.aggregation.field;
        let total_bytes = matched
            .iter()
            .filter_map(|(_, doc)| lookup(doc, bytes_field).and_then(Value::as_f64))
            .sum();

        Ok(EngineResponse {
            total: Some(matched.len() as u64),
            total_bytes: Some(total_bytes),
            documents: matched
                .into_iter()
                .skip(request.page.from as usize)
                .take(request.page.size as usize)
                .map(|(_, doc)| doc.clone())
                .collect(),
        })
    }
}

fn lookup<'a>(doc: &'a Document, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = doc.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Shared token count between analyzed text and the stored value.
fn text_overlap(stored: &Value, query: &str) -> usize {
    let Some(stored) = stored.as_str() else {
        return 0;
    };
    let stored = tokens(stored);
    tokens(query).iter().filter(|t| stored.contains(*t)).count()
}

fn score(clause: &Clause, doc: &Document) -> Option<f64> {
    match clause {
        Clause::MatchAll => Some(1.0),
        Clause::Match {
            field,
            query,
            boost,
        } => {
            let stored = lookup(doc, field)?;
            let boost = boost.unwrap_or(1.0);
            let query = query.to_json();
            let hits = match query.as_str() {
                Some(text) => text_overlap(stored, text),
                None => usize::from(*stored == query),
            };
            (hits > 0).then(|| hits as f64 * boost)
        }
        Clause::Term { field, value } => {
            (lookup(doc, field)? == &value.to_json()).then_some(1.0)
        }
        Clause::MultiMatch { query, fields, .. } => {
            let total: f64 = fields
                .iter()
                .filter_map(|f| {
                    lookup(doc, &f.field).map(|v| text_overlap(v, query) as f64 * f.boost)
                })
                .sum();
            (total > 0.0).then_some(total)
        }
        Clause::Bool(bool_query) => score_bool(bool_query, doc),
    }
}

fn score_bool(query: &BoolQuery, doc: &Document) -> Option<f64> {
    let mut total = 0.0;
    for clause in &query.must {
        total += score(clause, doc)?;
    }

    let should: Vec<f64> = query.should.iter().filter_map(|c| score(c, doc)).collect();
    let required = query.minimum_should_match.unwrap_or_else(|| {
        u32::from(query.must.is_empty() && !query.should.is_empty())
    });
    if (should.len() as u32) < required {
        return None;
    }

    Some(total + should.iter().sum::<f64>())
}

fn compare_by(key: &SortKey, a: &Document, b: &Document) -> Ordering {
    let ordering = match (lookup(a, &key.field), lookup(b, &key.field)) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        _ => Ordering::Equal,
    };
    match key.order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::search::query::{BoostedField, CompiledQuery, MultiMatchType, SumAggregation};
    use crate::domain::search::types::Page;
    use serde_json::json;

    fn request(query: Clause) -> EngineRequest {
        EngineRequest {
            index: "datahub",
            doc_type: "dataset",
            body: CompiledQuery {
                query,
                sort: vec![],
                aggregation: SumAggregation {
                    name: "total_bytes".into(),
                    field: "stats.bytes".into(),
                },
                source_fields: None,
            },
            page: Page { size: 10, from: 0 },
        }
    }

    fn engine() -> MockSearchEngine {
        let engine = MockSearchEngine::new();
        engine.index("datahub", json!({"title": "Cat pictures", "stats": {"bytes": 3}}));
        engine.index("datahub", json!({"title": "Dog and cat", "stats": {"bytes": 4}}));
        engine.index("datahub", json!({"title": "Birds", "stats": {"bytes": 5}}));
        engine
    }

    #[tokio::test]
    async fn match_all_returns_everything() {
        let response = engine().search(&request(Clause::MatchAll)).await.unwrap();
        assert_eq!(response.total, Some(3));
        assert_eq!(response.total_bytes, Some(12.0));
    }

    #[tokio::test]
    async fn multi_match_requires_a_token() {
        let query = Clause::MultiMatch {
            query: "cat".into(),
            fields: vec![BoostedField {
                field: "title".into(),
                boost: 2.0,
            }],
            kind: MultiMatchType::MostFields,
        };

        let response = engine().search(&request(query)).await.unwrap();
        assert_eq!(response.total, Some(2));
        assert_eq!(response.total_bytes, Some(7.0));
    }

    #[tokio::test]
    async fn bool_should_defaults_to_one_without_must() {
        let query = Clause::Bool(BoolQuery {
            should: vec![Clause::matches("title", "birds"), Clause::matches("title", "dog")],
            ..Default::default()
        });

        let response = engine().search(&request(query)).await.unwrap();
        assert_eq!(response.total, Some(2));
    }

    #[tokio::test]
    async fn unknown_index_and_failures() {
        let engine = engine();
        let mut req = request(Clause::MatchAll);
        req.index = "missing";
        assert_eq!(
            engine.search(&req).await.unwrap_err(),
            SearchError::IndexNotFound("missing".into())
        );

        let engine = engine.failing(SearchError::EngineUnavailable("down".into()));
        assert!(engine.search(&request(Clause::MatchAll)).await.is_err());
        assert_eq!(engine.call_count(), 2);
    }
}
