//! Errors from the persistence edges (settings and high scores)
//!
//! The simulation itself never fails: every in-game anomaly is a policy
//! decision. Only loading and saving JSON can go wrong.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    /// JSON parsing or serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// File I/O error (native only)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// No LocalStorage available (wasm only)
    #[error("storage unavailable")]
    Unavailable,
}
