//! Shared error types for the analyzer service

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Missing required configuration: {key}")]
    MissingConfig { key: String },

    #[error("Invalid configuration: {field} = {value}")]
    InvalidConfig { field: String, value: String },
}

pub type SharedResult<T> = Result<T, SharedError>;
