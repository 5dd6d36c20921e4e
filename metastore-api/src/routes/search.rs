use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{Caller, TOKEN_PARAM},
    domain::search::{RawParams, SearchKind, SearchOutcome},
    routes::ApiError,
    AppState,
};

/// Query parameter naming the JSONP callback.
pub const CALLBACK_PARAM: &str = "callback";

type QueryPairs = Result<Query<Vec<(String, String)>>, QueryRejection>;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/search", get(search_default))
        .route("/search/:kind", get(search_kind))
}

#[instrument(name = "GET /search", skip(app_state, caller, query))]
async fn search_default(
    State(app_state): State<AppState>,
    caller: Caller,
    query: QueryPairs,
) -> Result<Response, ApiError> {
    search(app_state, &SearchKind::Dataset.to_string(), caller, query).await
}

#[instrument(name = "GET /search/:kind", skip(app_state, caller, query))]
async fn search_kind(
    State(app_state): State<AppState>,
    Path(kind): Path<String>,
    caller: Caller,
    query: QueryPairs,
) -> Result<Response, ApiError> {
    search(app_state, &kind, caller, query).await
}

async fn search(
    app_state: AppState,
    kind: &str,
    caller: Caller,
    query: QueryPairs,
) -> Result<Response, ApiError> {
    let Query(pairs) = query.map_err(|rejection| {
        tracing::warn!(error = %rejection, "Rejected undecodable query string");
        ApiError::bad_request(rejection.body_text())
    })?;

    let mut params: RawParams = pairs.into_iter().collect();
    params.take(TOKEN_PARAM);
    let callback = params
        .take(CALLBACK_PARAM)
        .and_then(|values| values.into_iter().next());

    let outcome = app_state.search.search(kind, caller.id(), &params).await;
    respond(outcome, callback.as_deref())
}

fn respond(outcome: SearchOutcome, callback: Option<&str>) -> Result<Response, ApiError> {
    let Some(callback) = callback.filter(|name| is_callback_name(name)) else {
        return Ok(Json(outcome).into_response());
    };

    let body = serde_json::to_string(&outcome)
        .map_err(|e| ApiError::internal(format!("Failed to serialize search outcome: {e}")))?;

    Ok((
        [(header::CONTENT_TYPE, "application/javascript")],
        format!("{callback}({body});"),
    )
        .into_response())
}

/// Dotted JavaScript identifier path, e.g. `jQuery123.cb`.
fn is_callback_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.'))
}
