// In crates/signals/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Signal provider request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Signal provider error: {status} - {body}")]
    ApiError { status: u16, body: String },

    #[error("Signal provider returned an unusable answer: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, Error>;
