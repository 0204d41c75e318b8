//! Error types for format conversion and record storage

use std::fmt;

/// Errors raised by format implementations and the registry
#[derive(Debug, Clone, PartialEq)]
pub enum FormatError {
    /// The format does not implement the requested direction
    NotSupported(String),
    /// Source text could not be turned into a document
    ParseError(String),
    /// A document could not be written out
    SerializationError(String),
    /// No format registered under this name
    FormatNotFound(String),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::NotSupported(msg) => write!(f, "Not supported: {}", msg),
            FormatError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            FormatError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            FormatError::FormatNotFound(name) => write!(f, "Format '{}' not found", name),
        }
    }
}

impl std::error::Error for FormatError {}

impl From<serde_json::Error> for FormatError {
    fn from(err: serde_json::Error) -> Self {
        FormatError::ParseError(err.to_string())
    }
}

/// Errors raised by a [`RecordStore`](crate::record::RecordStore)
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// No record with this id
    NotFound(String),
    /// The backing store rejected the operation
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound(id) => write!(f, "Template '{}' not found", id),
            StoreError::Backend(msg) => write!(f, "Store error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}
