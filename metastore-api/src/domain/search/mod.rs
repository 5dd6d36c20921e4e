//! Metastore search over document collections held in Elasticsearch.
//!
//! A request names a search kind, carries untyped parameters and optionally
//! an authenticated caller. It flows through:
//!
//! - [`ProfileRegistry`] - per-kind index, fields, size limits and boosts
//! - [`params`] - reserved parameters and JSON-decoded term filters
//! - [`visibility`] - published documents plus the caller's own
//! - [`compiler`] - the engine's bool query, sort and `total_bytes` sum
//! - `SearchEngine` - one engine call ([`engine::ElasticSearchEngine`])
//! - [`normalizer`] - `{results, summary: {total, totalBytes}}`
//!
//! # Example
//!
//! ```ignore
//! use crate::domain::search::{ProfileRegistry, RawParams, SearchService};
//! use crate::domain::search::engine::ElasticSearchEngine;
//!
//! let engine = ElasticSearchEngine::new("localhost:9200", Duration::from_secs(30));
//! let service = SearchService::new(engine, ProfileRegistry::builtin()?);
//!
//! let params: RawParams = [("q", "\"cat\""), ("license", "\"odc-by\"")].into_iter().collect();
//! let outcome = service.search("dataset", None, &params).await;
//! ```
//!
//! # Parameters
//!
//! - `q` - free text, JSON-encoded (`"cat"`)
//! - `size` - page size, clamped to the profile maximum
//! - `from` - offset of the first result
//! - `sort` - `asc` or `desc` on the profile's timestamp field
//! - anything else - equality filter; repeated values are alternatives
//!
//! Filter values are JSON scalars, so `"str7"` is a string and `7` a number.

pub mod compiler;
pub mod normalizer;
pub mod params;
pub mod query;
pub mod visibility;

mod profile;
mod service;
mod traits;
mod types;

pub mod engine;

pub use profile::{ProfileRegistry, SearchKind};
pub use service::SearchService;
pub use types::{RawParams, SearchOutcome};
