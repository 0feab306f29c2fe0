pub mod error;
pub mod types;

pub use error::{Result, WeatherError};
pub use types::{Condition, Current, CurrentConditions};

const BASE_URL: &str = "https://api.weatherapi.com/v1";

pub struct WeatherClient {
    client: reqwest::Client,
    api_key: String,
}

impl WeatherClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
        }
    }

    /// Current conditions for a location query (`"lat,lng"` or a place name).
    pub async fn current(&self, query: &str) -> Result<CurrentConditions> {
        let url = format!("{BASE_URL}/current.json");
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", query),
                ("aqi", "no"),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(WeatherError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let conditions: CurrentConditions = resp.json().await?;
        tracing::debug!(
            query,
            temp_c = conditions.current.temp_c,
            "Fetched current weather"
        );
        Ok(conditions)
    }
}
