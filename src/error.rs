//! Error types for slice construction and registration.

use thiserror::Error;

/// Main error type for slice operations.
///
/// Every variant is a programmer error surfaced at the call that broke the
/// contract. Reducers never produce one.
#[derive(Debug, Error)]
pub enum SliceError {
    #[error("Slice key already exists: {0}")]
    DuplicateKey(String),

    #[error("Invalid slice key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("Operation already registered: {0}")]
    DuplicateRegistration(String),

    #[error("Invalid handler for '{name}': {reason}")]
    InvalidHandler { name: String, reason: String },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Slice kind mismatch: expected {expected}, got {got}")]
    KindMismatch { expected: String, got: String },

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl From<serde_json::Error> for SliceError {
    fn from(e: serde_json::Error) -> Self {
        SliceError::Serialization(e.to_string())
    }
}

impl From<rmp_serde::encode::Error> for SliceError {
    fn from(e: rmp_serde::encode::Error) -> Self {
        SliceError::Serialization(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for SliceError {
    fn from(e: rmp_serde::decode::Error) -> Self {
        SliceError::Deserialization(e.to_string())
    }
}

/// Result type for slice operations.
pub type Result<T> = std::result::Result<T, SliceError>;
