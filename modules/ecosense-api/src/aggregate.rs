//! Merges the sensor spreadsheet, the weather feed, and the stored push
//! alert into one dashboard snapshot per poll.
//!
//! Every invocation recomputes the view from scratch: the only state read
//! here that survives between polls is the single-slot alert store.

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::warn;

use ecosense_common::{
    AggregatedView, HistoryEntry, ImageRef, PushAlert, SensorSnapshot, WeatherSnapshot,
};
use sheets_client::ValueRange;
use weather_client::{Current, CurrentConditions};

use crate::AppState;

/// Prepended whenever the sheet's fire flag is set. A priority siren: added
/// unconditionally, never deduplicated against existing entries.
pub const FIRE_ALERT: &str = "CRITICAL: Fire detected!";

/// Header names that may carry the daily image column.
const IMAGE_COLUMN_HINTS: &[&str] = &["image", "url", "picture", "photo", "daily"];

const KPH_TO_MS: f64 = 0.277778;

/// Produce one aggregated view. Upstream failures degrade their own
/// contribution only; the call itself always succeeds.
pub async fn build_dashboard(state: &AppState) -> AggregatedView {
    let (sheet, weather) = tokio::join!(
        state.sheets.values(&state.sheet_range),
        state.weather.current(&state.location_query),
    );
    let alert = state.store.latest().await;
    assemble(sheet, weather, alert)
}

/// Merge step proper, separated from the fetches so it stays a pure function
/// of (sheet result, weather result, alert slot).
pub fn assemble(
    sheet: sheets_client::Result<ValueRange>,
    weather: weather_client::Result<CurrentConditions>,
    alert: Option<PushAlert>,
) -> AggregatedView {
    let values = match sheet {
        Ok(range) => range.values,
        Err(e) => {
            warn!(error = %e, "Sheet fetch failed, serving empty sensor fields");
            Vec::new()
        }
    };
    let weather_data = match weather {
        Ok(conditions) => Some(weather_snapshot(&conditions.current)),
        Err(e) => {
            warn!(error = %e, "Weather fetch failed, serving null weather");
            None
        }
    };

    let mut sensor_data = sensor_snapshot(&values);
    let history_log = history_log(&values);
    if let Some(alert) = alert {
        apply_push_alert(&mut sensor_data, &alert);
    }

    AggregatedView {
        sensor_data,
        history_log,
        weather_data,
        timestamp: Utc::now(),
    }
}

/// Schema-map the sheet values: header row becomes normalized keys, the last
/// data row is the current sensor state. Columns that feed derived fields
/// are extracted so they cannot collide with them on the wire.
pub fn sensor_snapshot(values: &[Vec<String>]) -> SensorSnapshot {
    let Some((header, data)) = values.split_first() else {
        return SensorSnapshot::default();
    };
    let Some(last) = data.last() else {
        return SensorSnapshot::default();
    };

    let mut fields: BTreeMap<String, Option<String>> = BTreeMap::new();
    for (i, name) in header.iter().enumerate() {
        fields.insert(normalize_header(name), last.get(i).cloned());
    }

    let alerts_cell = fields.remove("alerts").flatten();
    let realtime_image_url = fields
        .remove("realtime_image_url")
        .flatten()
        .filter(|v| !v.is_empty())
        .map(ImageRef::classify);
    let mut daily_image_url = fields
        .remove("daily_image_url")
        .flatten()
        .filter(|v| !v.is_empty())
        .map(ImageRef::classify);
    let latest_detection_time = fields
        .remove("latest_detection_time")
        .flatten()
        .filter(|v| !v.is_empty());

    if daily_image_url.is_none() {
        daily_image_url = discover_daily_image(header, data);
    }

    let mut alerts = parse_alerts_cell(alerts_cell.as_deref());
    let fire = fields
        .get("fire")
        .and_then(|v| v.as_deref())
        .is_some_and(fire_flag_set);
    if fire {
        alerts.insert(0, FIRE_ALERT.to_string());
    }

    SensorSnapshot {
        fields,
        realtime_image_url,
        daily_image_url,
        alerts,
        latest_detection_time,
    }
}

/// Lowercase, internal whitespace runs collapsed to a single underscore.
fn normalize_header(raw: &str) -> String {
    raw.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Find the first header that looks like it names an image column.
fn image_column(header: &[String]) -> Option<usize> {
    header.iter().position(|h| {
        let h = h.to_lowercase();
        IMAGE_COLUMN_HINTS.iter().any(|hint| h.contains(hint))
    })
}

/// Scan the image column bottom-to-top and take the first cell that holds a
/// URL or a large schemeless payload (assumed base64).
fn discover_daily_image(header: &[String], data: &[Vec<String>]) -> Option<ImageRef> {
    let col = image_column(header)?;
    data.iter()
        .rev()
        .filter_map(|row| row.get(col))
        .find(|v| looks_like_image_cell(v))
        .map(|v| ImageRef::classify(v.clone()))
}

// TODO: the >100-chars rule misclassifies any long text cell; revisit once
// the sheet schema grows a dedicated image column.
fn looks_like_image_cell(value: &str) -> bool {
    value.starts_with("http") || value.len() > 100
}

/// The alerts cell may hold a JSON-encoded list or a bare alert string;
/// malformed JSON falls back to treating the raw value as a single alert.
fn parse_alerts_cell(cell: Option<&str>) -> Vec<String> {
    let Some(raw) = cell else {
        return Vec::new();
    };
    if raw.is_empty() {
        return Vec::new();
    }
    serde_json::from_str::<Vec<String>>(raw).unwrap_or_else(|_| vec![raw.to_string()])
}

fn fire_flag_set(value: &str) -> bool {
    let value = value.trim();
    value == "1" || value.eq_ignore_ascii_case("true")
}

/// Fold the stored push event into the snapshot: its frame replaces any
/// sheet-derived realtime image, and its display string is prepended unless
/// an identical entry is already present (exact string match).
pub fn apply_push_alert(sensor: &mut SensorSnapshot, alert: &PushAlert) {
    sensor.realtime_image_url = Some(alert.image.clone());

    let entry = format!("{} ({})", alert.label, format_confidence(alert.confidence));
    if !sensor.alerts.contains(&entry) {
        sensor.alerts.insert(0, entry);
    }
    sensor.latest_detection_time = Some(alert.timestamp.to_rfc3339());
}

/// Resolve the confidence unit by magnitude: values in [0, 1] are a ratio
/// rendered as a whole percentage, values above 1 are an already-scaled
/// score rendered with two decimals. Non-numeric input renders as "??".
pub fn format_confidence(confidence: f64) -> String {
    if !confidence.is_finite() {
        return "??".to_string();
    }
    if (0.0..=1.0).contains(&confidence) {
        format!("{:.0}%", confidence * 100.0)
    } else {
        format!("{confidence:.2}")
    }
}

/// One entry per historical row that carried an image, newest first.
pub fn history_log(values: &[Vec<String>]) -> Vec<HistoryEntry> {
    let Some((header, data)) = values.split_first() else {
        return Vec::new();
    };
    let Some(image_col) = image_column(header) else {
        return Vec::new();
    };

    let normalized: Vec<String> = header.iter().map(|h| normalize_header(h)).collect();
    let date_col = normalized
        .iter()
        .position(|h| h == "date" || h == "timestamp");
    let status_col = normalized.iter().position(|h| h.contains("status"));

    data.iter()
        .rev()
        .filter_map(|row| {
            let image = row.get(image_col).filter(|v| !v.is_empty())?;
            let cell = |col: Option<usize>| {
                col.and_then(|c| row.get(c))
                    .filter(|v| !v.is_empty())
                    .cloned()
            };
            Some(HistoryEntry {
                date: cell(date_col),
                image: ImageRef::classify(image.clone()),
                status: cell(status_col),
            })
        })
        .collect()
}

/// Canonicalize the upstream reading: km/h to m/s at one decimal, icon
/// reference made absolute.
pub fn weather_snapshot(current: &Current) -> WeatherSnapshot {
    WeatherSnapshot {
        temperature_c: current.temp_c,
        humidity: current.humidity,
        wind_speed_ms: (current.wind_kph * KPH_TO_MS * 10.0).round() / 10.0,
        description: current.condition.text.clone(),
        icon_url: absolute_icon_url(&current.condition.icon),
    }
}

fn absolute_icon_url(icon: &str) -> String {
    if icon.starts_with("http") {
        icon.to_string()
    } else if let Some(rest) = icon.strip_prefix("//") {
        format!("https://{rest}")
    } else {
        format!("https://{icon}")
    }
}
