use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use ecosense_common::{ImageRef, PushAlert};

use crate::AppState;

#[derive(Deserialize)]
pub struct AlertRequest {
    image: Option<String>,
    label: Option<String>,
    confidence: Option<serde_json::Value>,
}

/// Interpret the raw confidence field. Numbers pass through, numeric strings
/// are parsed, anything else becomes NaN and renders as the placeholder.
fn confidence_value(raw: Option<&serde_json::Value>) -> f64 {
    match raw {
        None | Some(serde_json::Value::Null) => 0.0,
        Some(serde_json::Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(serde_json::Value::String(s)) => s.trim().parse().unwrap_or(f64::NAN),
        Some(_) => f64::NAN,
    }
}

pub async fn api_alert(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AlertRequest>,
) -> impl IntoResponse {
    let image = match body.image.filter(|i| !i.trim().is_empty()) {
        Some(i) => i,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": "Missing image payload"})),
            )
                .into_response();
        }
    };

    let label = body
        .label
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| "Unknown".to_string());
    let confidence = confidence_value(body.confidence.as_ref());

    let alert = PushAlert {
        label: label.clone(),
        confidence,
        image: ImageRef::classify(image),
        // Always server-assigned; the detector's own clock is not trusted.
        timestamp: Utc::now(),
    };
    state.store.replace(alert).await;

    // Log the label only, never the image payload
    info!(label, confidence, "Detection alert received");

    Json(serde_json::json!({"success": true})).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::{
        body::Body,
        http::{header, Request},
        routing::{get, post},
        Router,
    };
    use tower::ServiceExt;

    use ecosense_common::AlertStore;
    use sheets_client::SheetsClient;
    use weather_client::WeatherClient;

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState {
            sheets: SheetsClient::new(String::new(), String::new()),
            weather: WeatherClient::new(String::new()),
            store: AlertStore::new(),
            sheet_range: "Sheet1!A1:Z".to_string(),
            location_query: "0,0".to_string(),
        })
    }

    fn test_router(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/api/alert", post(api_alert))
            .route("/api/live", get(crate::rest::api_live))
            .with_state(state)
    }

    fn post_alert(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/alert")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    // --- confidence interpretation ---

    #[test]
    fn confidence_accepts_numbers_and_numeric_strings() {
        assert_eq!(confidence_value(Some(&serde_json::json!(0.87))), 0.87);
        assert_eq!(confidence_value(Some(&serde_json::json!("0.87"))), 0.87);
        assert_eq!(confidence_value(Some(&serde_json::json!(687.98))), 687.98);
    }

    #[test]
    fn confidence_defaults_to_zero_when_absent() {
        assert_eq!(confidence_value(None), 0.0);
        assert_eq!(confidence_value(Some(&serde_json::Value::Null)), 0.0);
    }

    #[test]
    fn confidence_non_numeric_becomes_nan() {
        assert!(confidence_value(Some(&serde_json::json!("high"))).is_nan());
        assert!(confidence_value(Some(&serde_json::json!(true))).is_nan());
        assert!(confidence_value(Some(&serde_json::json!(["x"]))).is_nan());
    }

    // --- push endpoint ---

    #[tokio::test]
    async fn push_without_image_is_rejected_and_store_untouched() {
        let state = test_state();
        let response = test_router(state.clone())
            .oneshot(post_alert(
                serde_json::json!({"label": "Leaf Spot", "confidence": 0.9}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(state.store.latest().await.is_none());
    }

    #[tokio::test]
    async fn push_stores_event_with_server_timestamp() {
        let state = test_state();
        let before = Utc::now();
        let response = test_router(state.clone())
            .oneshot(post_alert(serde_json::json!({
                "image": "iVBORw0KGgoAAAANSUhEUg",
                "label": "Leaf Spot",
                "confidence": 0.95,
                "timestamp": "1999-01-01T00:00:00Z"
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, serde_json::json!({"success": true}));

        let stored = state.store.latest().await.expect("event stored");
        assert_eq!(stored.label, "Leaf Spot");
        assert_eq!(stored.confidence, 0.95);
        assert_eq!(
            stored.image,
            ImageRef::InlinePayload("iVBORw0KGgoAAAANSUhEUg".to_string())
        );
        // Caller-supplied timestamps are ignored
        assert!(stored.timestamp >= before);
    }

    #[tokio::test]
    async fn push_defaults_label_and_confidence() {
        let state = test_state();
        let response = test_router(state.clone())
            .oneshot(post_alert(serde_json::json!({"image": "https://cam.local/f.jpg"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let stored = state.store.latest().await.expect("event stored");
        assert_eq!(stored.label, "Unknown");
        assert_eq!(stored.confidence, 0.0);
        assert_eq!(
            stored.image,
            ImageRef::RemoteUrl("https://cam.local/f.jpg".to_string())
        );
    }

    #[tokio::test]
    async fn second_push_overwrites_the_slot() {
        let state = test_state();
        let router = test_router(state.clone());
        router
            .clone()
            .oneshot(post_alert(
                serde_json::json!({"image": "first", "label": "Blight"}),
            ))
            .await
            .unwrap();
        router
            .oneshot(post_alert(
                serde_json::json!({"image": "second", "label": "Leaf Mold"}),
            ))
            .await
            .unwrap();

        let stored = state.store.latest().await.expect("event stored");
        assert_eq!(stored.label, "Leaf Mold");
        assert_eq!(stored.image.as_str(), "second");
    }

    // --- live endpoint ---

    #[tokio::test]
    async fn live_is_all_null_before_any_push() {
        let response = test_router(test_state())
            .oneshot(Request::builder().uri("/api/live").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            serde_json::json!({"image": null, "label": null, "timestamp": null})
        );
    }

    #[tokio::test]
    async fn live_reflects_the_latest_push() {
        let state = test_state();
        let router = test_router(state);
        router
            .clone()
            .oneshot(post_alert(
                serde_json::json!({"image": "https://cam.local/f.jpg", "label": "Blight"}),
            ))
            .await
            .unwrap();

        let response = router
            .oneshot(Request::builder().uri("/api/live").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["image"], "https://cam.local/f.jpg");
        assert_eq!(body["label"], "Blight");
        assert!(body["timestamp"].is_string());
    }
}
