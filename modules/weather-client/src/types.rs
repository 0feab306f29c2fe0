use serde::Deserialize;

/// Subset of the weatherapi.com `current.json` response the dashboard uses.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentConditions {
    pub current: Current,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Current {
    pub temp_c: f64,
    pub humidity: i64,
    pub wind_kph: f64,
    pub condition: Condition,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Condition {
    pub text: String,
    /// Delivered protocol-relative (`//cdn.weatherapi.com/...`).
    pub icon: String,
}
