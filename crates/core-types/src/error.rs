// In crates/core-types/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown trade action: {0}")]
    UnknownAction(String),
}

pub type Result<T> = std::result::Result<T, Error>;
