//! Error types for Dagflow.
//!
//! All errors in Dagflow are represented by the `DagflowError` enum,
//! which provides specific variants for different error categories.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for all Dagflow operations.
///
/// Each variant represents a specific category of error that can occur
/// while editing, validating, or persisting a graph.
#[derive(Deserialize, Serialize, Error, Debug, Clone, PartialEq)]
pub enum DagflowError {
    /// Editor-level errors (lifecycle, gating, orchestration).
    #[error("{0}")]
    Editor(String),

    /// Configuration parsing or validation errors.
    #[error("{0}")]
    Config(String),

    /// Data conversion errors (JSON encode/decode).
    #[error("{0}")]
    Convert(String),

    /// Graph storage errors.
    #[error("{0}")]
    Graph(String),

    /// Node definition or payload errors.
    #[error("{0}")]
    Node(String),

    /// Edge definition errors.
    #[error("{0}")]
    Edge(String),

    /// WebSocket gateway errors.
    #[error("{0}")]
    Gateway(String),

    /// REST persistence errors, carrying the backend's human-readable detail.
    #[error("{0}")]
    Client(String),

    /// Session identity errors.
    #[error("{0}")]
    Session(String),

    /// Message queue errors.
    #[error("{0}")]
    Queue(String),
}

impl From<DagflowError> for String {
    fn from(val: DagflowError) -> Self {
        val.to_string()
    }
}

impl From<serde_json::Error> for DagflowError {
    fn from(error: serde_json::Error) -> Self {
        DagflowError::Convert(error.to_string())
    }
}

impl From<jsonschema::ValidationError<'_>> for DagflowError {
    fn from(error: jsonschema::ValidationError<'_>) -> Self {
        DagflowError::Node(error.to_string())
    }
}

impl From<reqwest::Error> for DagflowError {
    fn from(error: reqwest::Error) -> Self {
        DagflowError::Client(error.to_string())
    }
}
