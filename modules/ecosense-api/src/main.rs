use std::sync::Arc;

use anyhow::Result;
use axum::{
    http::{header, HeaderValue},
    routing::{get, post},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ecosense_common::{AlertStore, Config};
use sheets_client::SheetsClient;
use weather_client::WeatherClient;

mod aggregate;
mod rest;

pub struct AppState {
    pub sheets: SheetsClient,
    pub weather: WeatherClient,
    pub store: AlertStore,
    pub sheet_range: String,
    pub location_query: String,
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/", get(|| async { "ok" }))
        // Detection ingest + live feed
        .route("/api/alert", post(rest::alert::api_alert))
        .route("/api/live", get(rest::api_live))
        // Aggregated dashboard snapshot
        .route("/api/dashboard", get(rest::api_dashboard))
        .with_state(state)
        // CORS: the dashboard frontend polls from another origin
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        // Poll responses must never be cached
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::PRAGMA,
            HeaderValue::from_static("no-cache"),
        ))
        // Unexpected handler faults surface as a bare 500, never a partial body
        .layer(CatchPanicLayer::new())
        // Logging layer: method + path + status + latency only
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("ecosense=info".parse()?))
        .init();

    let config = Config::from_env();

    let state = Arc::new(AppState {
        sheets: SheetsClient::new(config.sheets_api_key, config.sheet_id),
        weather: WeatherClient::new(config.weather_api_key),
        store: AlertStore::new(),
        sheet_range: config.sheet_range,
        location_query: config.location_query,
    });

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!("EcoSense API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}
