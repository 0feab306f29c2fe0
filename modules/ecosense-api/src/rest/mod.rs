pub mod alert;

use std::sync::Arc;

use axum::{extract::State, response::Json};

use crate::{aggregate, AppState};

/// Current content of the alert slot; all-null if nothing was pushed yet.
pub async fn api_live(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    match state.store.latest().await {
        Some(alert) => Json(serde_json::json!({
            "image": alert.image,
            "label": alert.label,
            "timestamp": alert.timestamp,
        })),
        None => Json(serde_json::json!({
            "image": null,
            "label": null,
            "timestamp": null,
        })),
    }
}

/// The full aggregation: sheet snapshot + weather + alert reconciliation.
pub async fn api_dashboard(State(state): State<Arc<AppState>>) -> Json<ecosense_common::AggregatedView> {
    Json(aggregate::build_dashboard(&state).await)
}
