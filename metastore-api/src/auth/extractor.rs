use std::{convert::Infallible, sync::Arc};

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Query},
    http::request::Parts,
};

use crate::domain::models::CallerId;

use super::TokenDecoder;

pub const TOKEN_HEADER: &str = "auth-token";
pub const TOKEN_PARAM: &str = "jwt";

/// The caller behind a request, `None` when anonymous.
///
/// The token is read from the `auth-token` header, falling back to the first
/// `jwt` query parameter. Missing or invalid tokens never reject the request;
/// they make the caller anonymous.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caller(pub Option<CallerId>);

impl Caller {
    pub fn id(&self) -> Option<&CallerId> {
        self.0.as_ref()
    }
}

fn token_from_parts(parts: &Parts) -> Option<String> {
    if let Some(header) = parts.headers.get(TOKEN_HEADER) {
        return header.to_str().ok().map(str::to_string);
    }

    let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri).ok()?;
    pairs
        .into_iter()
        .find(|(name, _)| name == TOKEN_PARAM)
        .map(|(_, value)| value)
}

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
    Arc<TokenDecoder>: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let decoder = Arc::<TokenDecoder>::from_ref(state);
        let caller = token_from_parts(parts).and_then(|token| decoder.decode(&token));
        Ok(Caller(caller))
    }
}
