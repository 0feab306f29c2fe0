use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Google Sheets (sensor log)
    pub sheets_api_key: String,
    pub sheet_id: String,
    pub sheet_range: String,

    // Weather
    pub weather_api_key: String,
    pub location_query: String,

    // Web server
    pub web_host: String,
    pub web_port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            sheets_api_key: required_env("GOOGLE_SHEETS_API_KEY"),
            sheet_id: required_env("GOOGLE_SHEET_ID"),
            sheet_range: env::var("SHEET_RANGE").unwrap_or_else(|_| "Sheet1!A1:Z".to_string()),
            weather_api_key: required_env("WEATHERAPI_KEY"),
            location_query: env::var("LOCATION_QUERY")
                .unwrap_or_else(|_| "13.7563,100.5018".to_string()),
            web_host: env::var("WEB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            web_port: env::var("WEB_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("WEB_PORT must be a number"),
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
