//! Parameter normalization: splits raw request parameters into the reserved
//! ones and term filters.
//!
//! Single-valued parameters follow a first-occurrence-wins rule; repeated
//! values after the first are ignored.

use std::str::FromStr;

use serde_json::Value;

use super::profile::SearchProfile;
use super::query::{FilterValue, SortOrder};
use super::traits::{Result, SearchError};
use super::types::RawParams;

pub const PARAM_QUERY: &str = "q";
pub const PARAM_SIZE: &str = "size";
pub const PARAM_FROM: &str = "from";
pub const PARAM_SORT: &str = "sort";

const RESERVED: [&str; 4] = [PARAM_QUERY, PARAM_SIZE, PARAM_FROM, PARAM_SORT];

/// Equality filter on one field; any of the values may match.
#[derive(Debug, Clone, PartialEq)]
pub struct TermFilter {
    pub field: String,
    pub values: Vec<FilterValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    pub text: Option<String>,
    pub size: u64,
    pub from: u64,
    pub sort: SortOrder,
    pub filters: Vec<TermFilter>,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().trim_matches('"').to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err("expected \"asc\" or \"desc\"".to_string()),
        }
    }
}

/// Decode a filter value as a JSON scalar.
///
/// Strings must be quoted (`"str7"`); bare `7` and `true` decode as number
/// and boolean so they match numeric and boolean fields.
pub fn decode_value(param: &str, raw: &str) -> Result<FilterValue> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| SearchError::malformed(param, raw, e))?;

    match value {
        Value::String(s) => Ok(FilterValue::String(s)),
        Value::Number(n) => Ok(FilterValue::Number(n)),
        Value::Bool(b) => Ok(FilterValue::Bool(b)),
        Value::Null => Err(SearchError::malformed(param, raw, "null is not a filter value")),
        Value::Array(_) | Value::Object(_) => Err(SearchError::malformed(
            param,
            raw,
            "expected a string, number or boolean",
        )),
    }
}

fn parse_count(param: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|e| SearchError::malformed(param, raw, e))
}

fn decode_text(raw: &str) -> Result<String> {
    match decode_value(PARAM_QUERY, raw)? {
        FilterValue::String(s) => Ok(s),
        FilterValue::Number(n) => Ok(n.to_string()),
        FilterValue::Bool(b) => Ok(b.to_string()),
    }
}

/// Normalize request parameters against a profile.
pub fn normalize(raw: &RawParams, profile: &SearchProfile) -> Result<SearchParams> {
    let size = match raw.first(PARAM_SIZE) {
        Some(value) => parse_count(PARAM_SIZE, value)?.min(profile.max_size),
        None => profile.default_size,
    };

    let from = raw
        .first(PARAM_FROM)
        .map(|value| parse_count(PARAM_FROM, value))
        .transpose()?
        .unwrap_or(0);

    let sort = raw
        .first(PARAM_SORT)
        .filter(|_| profile.timestamp_field.is_some())
        .map(|value| {
            SortOrder::from_str(value)
                .map_err(|reason| SearchError::malformed(PARAM_SORT, value, reason))
        })
        .transpose()?
        .unwrap_or_default();

    let text = raw.first(PARAM_QUERY).map(decode_text).transpose()?;

    let filters = raw
        .iter()
        .filter(|(name, _)| !RESERVED.contains(name))
        .map(|(field, values)| {
            let values = values
                .iter()
                .map(|value| decode_value(field, value))
                .collect::<Result<Vec<_>>>()?;
            Ok::<_, SearchError>(TermFilter {
                field: field.to_string(),
                values,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(SearchParams {
        text,
        size,
        from,
        sort,
        filters,
    })
}
