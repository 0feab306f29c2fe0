use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// --- Image References ---

/// A reference to an image, classified once at ingestion.
///
/// Upstreams deliver images either as an http(s) URL or as a raw base64
/// payload with no scheme prefix. The variant is decided when the value
/// enters the system and carried through the data model from there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    RemoteUrl(String),
    InlinePayload(String),
}

impl ImageRef {
    pub fn classify(raw: String) -> Self {
        if raw.starts_with("http") {
            ImageRef::RemoteUrl(raw)
        } else {
            ImageRef::InlinePayload(raw)
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ImageRef::RemoteUrl(s) | ImageRef::InlinePayload(s) => s,
        }
    }
}

// On the wire an image reference is the raw string either way.
impl Serialize for ImageRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ImageRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(ImageRef::classify(raw))
    }
}

// --- Detection Events ---

/// The most recent detection event pushed by the external vision process.
#[derive(Debug, Clone, Serialize)]
pub struct PushAlert {
    pub label: String,
    /// Raw confidence as delivered. The unit is ambiguous (ratio vs. scaled
    /// score) and resolved by magnitude at formatting time; non-numeric
    /// input is stored as NaN.
    pub confidence: f64,
    pub image: ImageRef,
    /// Server-assigned at ingest, never taken from the caller.
    pub timestamp: DateTime<Utc>,
}

// --- Sensor Snapshot ---

/// Schema-mapped view of the latest spreadsheet row, plus the fields the
/// aggregation derives on top of it.
///
/// `fields` holds every normalized column that is not extracted into a
/// typed field and flattens into the response object, so the dashboard can
/// address gauges by column name (`temperature`, `humidity_air`, ...).
/// Columns that would collide with a derived key are extracted during
/// schema mapping, never left in the map.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SensorSnapshot {
    #[serde(flatten)]
    pub fields: BTreeMap<String, Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realtime_image_url: Option<ImageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_image_url: Option<ImageRef>,
    pub alerts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_detection_time: Option<String>,
}

/// One historical sheet row that carried an image.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub date: Option<String>,
    pub image: ImageRef,
    pub status: Option<String>,
}

// --- Weather ---

/// Canonical current-conditions shape served to the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSnapshot {
    pub temperature_c: f64,
    pub humidity: i64,
    /// Converted from the upstream km/h reading, rounded to one decimal.
    pub wind_speed_ms: f64,
    pub description: String,
    pub icon_url: String,
}

// --- Aggregated View ---

/// Wire response of the aggregation endpoint. Recomputed from scratch on
/// every poll; nothing carries forward across responses except through the
/// upstreams or the alert store.
#[derive(Debug, Clone, Serialize)]
pub struct AggregatedView {
    pub sensor_data: SensorSnapshot,
    pub history_log: Vec<HistoryEntry>,
    pub weather_data: Option<WeatherSnapshot>,
    pub timestamp: DateTime<Utc>,
}
