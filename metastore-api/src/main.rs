use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt::time::LocalTime, EnvFilter};

use crate::{
    app_state::AppState,
    auth::TokenDecoder,
    domain::search::{engine::ElasticSearchEngine, ProfileRegistry, SearchService},
};

mod app_state;
mod auth;
mod config;
mod domain;
mod router;
mod routes;

const DEFAULT_LOG_FILTER: &str = "metastore_api=info,es_client=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_timer(LocalTime::rfc_3339())
        .init();

    let mut settings = config::read_config().context("Failed to read configuration")?;
    if let Some(port) = std::env::args().nth(1) {
        settings.application.port = port
            .parse()
            .with_context(|| format!("Invalid port argument: {port}"))?;
    }

    let registry = ProfileRegistry::builtin().context("Invalid search profiles")?;
    let engine = ElasticSearchEngine::new(
        settings.elasticsearch.address.clone(),
        settings.elasticsearch.request_timeout(),
    );
    let tokens = TokenDecoder::new(settings.auth.private_key.as_deref());
    if !tokens.is_enabled() {
        tracing::warn!("No private key configured, all callers are anonymous");
    }

    let app_state = AppState::new(SearchService::new(engine, registry), Arc::new(tokens));
    let app = router::create(app_state, &settings.application);

    let addr = format!("{}:{}", settings.application.host, settings.application.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!(
        %addr,
        prefix = %settings.application.route_prefix,
        elasticsearch = %settings.elasticsearch.address,
        "Metastore API listening"
    );
    axum::serve(listener, app).await?;

    Ok(())
}
