//! Maps engine replies into the search outcome returned to callers.

use serde_json::{Map, Value};

use super::profile::SearchProfile;
use super::types::{Document, EngineResponse, SearchOutcome, Summary};

/// Build the outcome for a successful engine call.
///
/// Missing totals and aggregates count as zero. The total never drops below
/// the number of returned documents.
pub fn normalize_response(profile: &SearchProfile, response: EngineResponse) -> SearchOutcome {
    let results: Vec<Document> = match &profile.result_fields {
        Some(fields) => response
            .documents
            .iter()
            .map(|doc| project(doc, fields))
            .collect(),
        None => response.documents,
    };

    let total = response.total.unwrap_or(0).max(results.len() as u64);

    SearchOutcome {
        results,
        summary: Summary {
            total,
            total_bytes: response.total_bytes.unwrap_or(0.0),
        },
        error: None,
    }
}

/// Keep only the given dotted paths of `doc`, in the document's own order.
fn project(doc: &Document, paths: &[&str]) -> Document {
    let mut projected = Map::new();
    for (key, value) in doc {
        let nested: Vec<&str> = paths
            .iter()
            .filter_map(|path| match path.split_once('.') {
                None if *path == key.as_str() => Some(""),
                Some((head, rest)) if head == key.as_str() => Some(rest),
                _ => None,
            })
            .collect();

        if nested.is_empty() {
            continue;
        }
        if nested.contains(&"") {
            projected.insert(key.clone(), value.clone());
        } else if let Value::Object(inner) = value {
            projected.insert(key.clone(), Value::Object(project(inner, &nested)));
        }
    }
    projected
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn passes_documents_through() {
        let response = EngineResponse {
            documents: vec![doc(json!({"name": "a"})), doc(json!({"name": "b"}))],
            total: Some(7),
            total_bytes: Some(70.0),
        };

        let outcome = normalize_response(&SearchProfile::dataset(), response);
        assert_eq!(outcome.results.len(), 2);
        assert_eq!(outcome.results[1]["name"], "b");
        assert_eq!(
            outcome.summary,
            Summary {
                total: 7,
                total_bytes: 70.0
            }
        );
        assert!(outcome.error.is_none());
    }

    #[test]
    fn missing_hits_and_aggregate_are_zero() {
        let outcome = normalize_response(&SearchProfile::dataset(), EngineResponse::default());
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.summary, Summary::default());
    }

    #[test]
    fn total_is_never_below_result_count() {
        let response = EngineResponse {
            documents: vec![doc(json!({"name": "a"}))],
            total: None,
            total_bytes: None,
        };

        let outcome = normalize_response(&SearchProfile::dataset(), response);
        assert_eq!(outcome.summary.total, 1);
    }

    #[test]
    fn projects_result_fields() {
        let profile = SearchProfile {
            result_fields: Some(vec!["name", "datahub.owner"]),
            ..SearchProfile::dataset()
        };
        let response = EngineResponse {
            documents: vec![doc(json!({
                "title": "This dataset is number 1",
                "name": "package-id-1",
                "datahub": {"owner": "someone", "ownerid": "owner1", "stats": {"bytes": 10}}
            }))],
            total: Some(1),
            total_bytes: Some(10.0),
        };

        let outcome = normalize_response(&profile, response);
        assert_eq!(
            Value::Object(outcome.results[0].clone()),
            json!({"name": "package-id-1", "datahub": {"owner": "someone"}})
        );
    }
}
