//! Error types for ad generation and record persistence.
//!
//! # Design
//! `AdError` is what callers of `AdClient` and `AdService` see. Transport
//! failures and non-2xx statuses both land in `RequestFailed`; anything wrong
//! with the body itself is `MalformedResponse`.
//!
//! `StoreError` never leaves the store. It exists so the failure can be
//! logged with a category before the store degrades to its safe default.

use thiserror::Error;

use crate::http::TransportError;

/// Errors returned by `AdClient` parse methods and `AdService` requests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AdError {
    /// The request did not complete, or the server answered outside 2xx.
    /// `status` is `None` when no response was received at all.
    #[error("request failed: {cause}")]
    RequestFailed { status: Option<u16>, cause: String },

    /// The body is not a JSON object or lacks a string `adCopy`.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl From<TransportError> for AdError {
    fn from(err: TransportError) -> Self {
        AdError::RequestFailed {
            status: None,
            cause: err.0,
        }
    }
}

/// Errors from a `KeyValueStorage` provider.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage key is not usable: {0:?}")]
    InvalidKey(String),

    #[error("storage is unavailable: {0}")]
    Unavailable(String),
}

/// Persistence failures inside `ProductRecordStore`. Logged, never propagated.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to persist product record: {0}")]
    PersistenceWriteFailed(String),

    #[error("failed to load product record: {0}")]
    PersistenceLoadFailed(String),
}
