pub mod client;
pub mod session;

pub use client::{Ingredient, NewRecipe, RestStore};
pub use session::Session;

use std::error::Error;
use std::fmt;

/// Failure talking to the external store. Propagated to the caller as-is:
/// the core never retries and never partially applies a save.
#[derive(Debug)]
pub enum StoreError {
    MissingCredential(String),
    NetworkError(reqwest::Error),
    SerializationError(serde_json::Error),
    ApiError {
        status: reqwest::StatusCode,
        error_body: String,
    },
    /// The store answered success but without the expected row.
    EmptyResponse(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::MissingCredential(var_name) => {
                write!(f, "Store credential not found in environment: {}", var_name)
            }
            StoreError::NetworkError(err) => write!(f, "Network error: {}", err),
            StoreError::SerializationError(err) => {
                write!(f, "Serialization error: {}", err)
            }
            StoreError::ApiError { status, error_body } => {
                write!(f, "Store error {}: {}", status, error_body)
            }
            StoreError::EmptyResponse(operation) => {
                write!(f, "Store returned no row for {}", operation)
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StoreError::NetworkError(err) => Some(err),
            StoreError::SerializationError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::NetworkError(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::SerializationError(err)
    }
}
