use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::{app_state::AppState, auth::TOKEN_HEADER, config::ApplicationSettings, routes};

pub fn create(app_state: AppState, settings: &ApplicationSettings) -> Router<()> {
    let prefix = settings.route_prefix.trim_matches('/');
    let app = if prefix.is_empty() {
        routes::search::router()
    } else {
        Router::new().nest(&format!("/{prefix}"), routes::search::router())
    };

    app.with_state(app_state)
        .layer(cors_layer(&settings.cors_allowed_origins))
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
}

/// Browsers call the API cross-origin with the token header and cookies.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins = if allowed_origins.is_empty() {
        AllowOrigin::mirror_request()
    } else {
        AllowOrigin::list(allowed_origins.iter().filter_map(|origin| {
            HeaderValue::from_str(origin)
                .inspect_err(|e| {
                    tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin")
                })
                .ok()
        }))
    };

    CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(TOKEN_HEADER)])
        .allow_credentials(true)
        .allow_origin(origins)
}
