// In crates/api-client/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to build the API client: {0}")]
    ClientBuildError(String),
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(#[from] serde_json::Error),
    /// Any non-2xx answer from the exchange, with the raw body for diagnosis.
    #[error("Binance API error: {status} - {body}")]
    ApiError { status: u16, body: String },
}

pub type Result<T> = std::result::Result<T, Error>;
