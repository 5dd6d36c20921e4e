//! Visibility rules: which documents a caller may see.
//!
//! The returned clauses are alternatives; a document is visible when it
//! matches at least one of them.

use crate::domain::models::CallerId;

use super::profile::{SearchProfile, PUBLISHED};
use super::query::{BoolQuery, Clause};

/// Build the visibility alternatives for `caller` under `profile`.
///
/// * anyone sees published documents,
/// * published documents of the privileged owner get a ranking boost,
/// * an authenticated caller also sees all of their own documents. The owner
///   field has to equal the caller id exactly.
pub fn visibility_clauses(profile: &SearchProfile, caller: Option<&CallerId>) -> Vec<Clause> {
    let published = || Clause::matches(profile.visibility_field, PUBLISHED);

    let mut alternatives = vec![Clause::Bool(BoolQuery {
        should: vec![published()],
        must: vec![],
        minimum_should_match: Some(1),
    })];

    if let Some(privileged) = profile.privileged_owner {
        alternatives.push(Clause::Bool(BoolQuery {
            should: vec![Clause::Match {
                field: privileged.field.to_string(),
                query: privileged.identity.into(),
                boost: Some(privileged.boost),
            }],
            must: vec![published()],
            minimum_should_match: Some(1),
        }));
    }

    if let Some(caller) = caller {
        alternatives.push(Clause::Bool(BoolQuery {
            must: vec![Clause::Term {
                field: profile.owner_field.to_string(),
                value: caller.as_str().into(),
            }],
            should: vec![],
            minimum_should_match: None,
        }));
    }

    alternatives
}
