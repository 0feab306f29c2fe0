pub mod error;
pub mod types;

pub use error::{Result, SheetsError};
pub use types::ValueRange;

const BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Minimal client for the Google Sheets `values.get` endpoint, which is the
/// only Sheets surface the sensor log needs.
pub struct SheetsClient {
    client: reqwest::Client,
    api_key: String,
    sheet_id: String,
}

impl SheetsClient {
    pub fn new(api_key: String, sheet_id: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            sheet_id,
        }
    }

    /// Fetch a value range in A1 notation, e.g. `Sheet1!A1:Z`.
    pub async fn values(&self, range: &str) -> Result<ValueRange> {
        let url = format!("{}/{}/values/{}", BASE_URL, self.sheet_id, range);
        let resp = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SheetsError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        let values: ValueRange = serde_json::from_str(&body)?;
        tracing::debug!(range, rows = values.values.len(), "Fetched sheet values");
        Ok(values)
    }
}
