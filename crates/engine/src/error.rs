// In crates/engine/src/error.rs

use thiserror::Error;

/// Failures surfaced to whoever drives the executor.
///
/// Per-symbol and per-cycle problems never show up here; they are logged inside the loop.
#[derive(Error, Debug)]
pub enum Error {
    /// A collaborator did not answer the start-time connectivity check.
    #[error("Failed to connect to {service}")]
    Connectivity { service: &'static str },

    /// A control command was missing a required document.
    #[error("{0}")]
    Configuration(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),
}

pub type Result<T> = std::result::Result<T, Error>;
