// In crates/web-server/src/error.rs

use crate::types::ErrorBody;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Engine(#[from] engine::Error),

    #[error("Invalid request body: {0}")]
    BadRequest(String),

    #[error("Failed to bind server: {0}")]
    ServerBindError(std::io::Error),

    #[error("Server error: {0}")]
    ServeError(std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::Engine(engine::Error::Connectivity { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Engine(engine::Error::Configuration(_) | engine::Error::UnknownAction(_))
            | Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::ServerBindError(_) | Error::ServeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Control request failed.");
        } else {
            tracing::warn!(error = %self, "Control request rejected.");
        }

        let body = ErrorBody {
            success: false,
            error: "Failed to process trading executor request".to_string(),
            details: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
