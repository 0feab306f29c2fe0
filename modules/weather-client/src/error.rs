use thiserror::Error;

pub type Result<T> = std::result::Result<T, WeatherError>;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        WeatherError::Network(err.to_string())
    }
}
