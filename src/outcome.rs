//! Result taxonomy surfaced to callers of a fetch.

use thiserror::Error;

use crate::fetcher::{ApiResponse, CallFault};
use crate::models::PageResult;

/// State of a fetch as seen by subscribers of a feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Loading,
    Success(T),
    Error(String),
}

impl<T> Outcome<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Outcome::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Outcome::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Outcome::Error(message) => Some(message),
            _ => None,
        }
    }
}

impl<T> From<Result<T, FetchError>> for Outcome<T> {
    fn from(result: Result<T, FetchError>) -> Self {
        match result {
            Ok(data) => Outcome::Success(data),
            Err(e) => Outcome::Error(e.to_string()),
        }
    }
}

/// Why a fetch did not produce a page.
/// None of these are retried automatically; retrying is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Connectivity check failed before any request was made
    #[error("No Internet Connection")]
    NoConnectivity,

    /// Connect, timeout or read failure while talking to the service
    #[error("Network Failure")]
    NetworkFailure,

    /// The response could not be turned into a page
    #[error("Conversion Error")]
    ConversionError,

    /// Unsuccessful status, or a successful one without a body
    #[error("{0}")]
    Server(String),
}

/// Maps the raw result of a remote call onto the fetch taxonomy.
pub fn classify(result: Result<ApiResponse, CallFault>) -> Result<PageResult, FetchError> {
    match result {
        Err(CallFault::Transport(_)) => Err(FetchError::NetworkFailure),
        Err(CallFault::Conversion(_)) => Err(FetchError::ConversionError),
        Ok(response) => {
            if !response.is_successful() {
                return Err(FetchError::Server(response.message));
            }
            response.body.ok_or(FetchError::Server(response.message))
        }
    }
}
