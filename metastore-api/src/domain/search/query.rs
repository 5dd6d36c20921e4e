//! Typed query DSL sent to the engine.
//!
//! Clauses serialize to the engine's JSON query language.

use serde::{Serialize, Serializer};
use serde_json::{json, Map, Number, Value};
use strum::Display;

/// A request value decoded to the scalar type of the stored field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    String(String),
    Number(Number),
    Bool(bool),
}

impl FilterValue {
    pub fn to_json(&self) -> Value {
        match self {
            Self::String(s) => Value::String(s.clone()),
            Self::Number(n) => Value::Number(n.clone()),
            Self::Bool(b) => Value::Bool(*b),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum MultiMatchType {
    /// Each matching field adds to the score.
    #[default]
    MostFields,
}

/// A text field reference with its weight, written `field^boost`.
#[derive(Debug, Clone, PartialEq)]
pub struct BoostedField {
    pub field: String,
    pub boost: f64,
}

impl BoostedField {
    fn render(&self) -> String {
        if self.boost == 1.0 {
            self.field.clone()
        } else {
            format!("{}^{}", self.field, self.boost)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    MatchAll,
    Match {
        field: String,
        query: FilterValue,
        boost: Option<f64>,
    },
    Term {
        field: String,
        value: FilterValue,
    },
    MultiMatch {
        query: String,
        fields: Vec<BoostedField>,
        kind: MultiMatchType,
    },
    Bool(BoolQuery),
}

impl Clause {
    pub fn matches(field: impl Into<String>, query: impl Into<FilterValue>) -> Self {
        Self::Match {
            field: field.into(),
            query: query.into(),
            boost: None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::MatchAll => json!({ "match_all": {} }),
            Self::Match {
                field,
                query,
                boost: None,
            } => json!({ "match": { field: query.to_json() } }),
            Self::Match {
                field,
                query,
                boost: Some(boost),
            } => json!({ "match": { field: { "query": query.to_json(), "boost": boost } } }),
            Self::Term { field, value } => json!({ "term": { field: value.to_json() } }),
            Self::MultiMatch {
                query,
                fields,
                kind,
            } => json!({
                "multi_match": {
                    "query": query,
                    "fields": fields.iter().map(BoostedField::render).collect::<Vec<_>>(),
                    "type": kind.to_string()
                }
            }),
            Self::Bool(bool_query) => json!({ "bool": bool_query.to_json() }),
        }
    }
}

impl Serialize for Clause {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Boolean combination of clauses.
///
/// Empty `must`/`should` lists are left out of the JSON, so a bool query
/// without `must` does not restrict matches beyond its `should` part.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolQuery {
    pub must: Vec<Clause>,
    pub should: Vec<Clause>,
    pub minimum_should_match: Option<u32>,
}

impl BoolQuery {
    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.should.is_empty()
    }

    fn to_json(&self) -> Value {
        let mut body = Map::new();
        if !self.should.is_empty() {
            body.insert("should".into(), json!(self.should));
        }
        if !self.must.is_empty() {
            body.insert("must".into(), json!(self.must));
        }
        if let Some(minimum) = self.minimum_should_match {
            body.insert("minimum_should_match".into(), json!(minimum));
        }
        Value::Object(body)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub field: String,
    pub order: SortOrder,
}

/// Sum of a numeric field over all matched documents.
#[derive(Debug, Clone, PartialEq)]
pub struct SumAggregation {
    pub name: String,
    pub field: String,
}

/// Body of an engine search request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub query: Clause,
    pub sort: Vec<SortKey>,
    pub aggregation: SumAggregation,
    pub source_fields: Option<Vec<String>>,
}

impl CompiledQuery {
    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert("query".into(), self.query.to_json());
        if !self.sort.is_empty() {
            let sort: Vec<Value> = self
                .sort
                .iter()
                .map(|key| json!({ key.field.clone(): { "order": key.order } }))
                .collect();
            body.insert("sort".into(), Value::Array(sort));
        }
        if let Some(fields) = &self.source_fields {
            body.insert("_source".into(), json!(fields));
        }
        let sum = json!({ "sum": { "field": self.aggregation.field } });
        body.insert("aggs".into(), json!({ self.aggregation.name.clone(): sum }));
        Value::Object(body)
    }
}

impl Serialize for CompiledQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
