//! Query compiler: turns normalized parameters and visibility rules into the
//! engine request for one search.

use crate::domain::models::CallerId;

use super::params::{self, SearchParams};
use super::profile::{ProfileRegistry, SearchProfile, TOTAL_BYTES_AGGREGATION};
use super::query::{
    BoolQuery, BoostedField, Clause, CompiledQuery, MultiMatchType, SortKey, SumAggregation,
};
use super::traits::Result;
use super::types::{EngineRequest, Page, RawParams};
use super::visibility::visibility_clauses;

/// Resolve the profile, normalize the parameters and compile the query.
///
/// Fails before anything is sent to the engine for an unknown kind or a
/// malformed parameter.
pub fn compile_request(
    registry: &ProfileRegistry,
    kind: &str,
    caller: Option<&CallerId>,
    raw: &RawParams,
) -> Result<EngineRequest> {
    let profile = registry.lookup(kind)?;
    let params = params::normalize(raw, profile)?;
    Ok(compile(profile, caller, &params))
}

pub fn compile(
    profile: &SearchProfile,
    caller: Option<&CallerId>,
    params: &SearchParams,
) -> EngineRequest {
    let mut must = Vec::new();

    if let Some(text) = &params.text {
        must.push(Clause::MultiMatch {
            query: text.clone(),
            fields: profile
                .text_fields
                .iter()
                .map(|f| BoostedField {
                    field: f.path.to_string(),
                    boost: f.boost,
                })
                .collect(),
            kind: MultiMatchType::MostFields,
        });
    }

    // Values of one field are alternatives; separate fields must all match.
    for filter in &params.filters {
        must.push(Clause::Bool(BoolQuery {
            should: filter
                .values
                .iter()
                .map(|value| Clause::Term {
                    field: filter.field.clone(),
                    value: value.clone(),
                })
                .collect(),
            must: vec![],
            minimum_should_match: Some(1),
        }));
    }

    let query = root_clause(visibility_clauses(profile, caller), must);

    let sort = profile
        .timestamp_field
        .map(|field| SortKey {
            field: field.to_string(),
            order: params.sort,
        })
        .into_iter()
        .collect();

    EngineRequest {
        index: profile.index,
        doc_type: profile.doc_type,
        body: CompiledQuery {
            query,
            sort,
            aggregation: SumAggregation {
                name: TOTAL_BYTES_AGGREGATION.to_string(),
                field: profile.bytes_field.to_string(),
            },
            source_fields: profile
                .result_fields
                .as_ref()
                .map(|fields| fields.iter().map(|f| f.to_string()).collect()),
        },
        page: Page {
            size: params.size,
            from: params.from,
        },
    }
}

/// Combine visibility alternatives and restrictions into the top-level clause.
fn root_clause(should: Vec<Clause>, must: Vec<Clause>) -> Clause {
    let root = BoolQuery {
        should,
        must,
        minimum_should_match: Some(1),
    };
    if root.is_empty() {
        Clause::MatchAll
    } else {
        Clause::Bool(root)
    }
}
