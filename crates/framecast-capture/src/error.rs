//! Error types for the capture module.

use thiserror::Error;

/// Errors that can occur during capture operations.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Error reported by the native capture backend.
    #[error("native capturer error: {message}")]
    Native { message: String },

    /// The fallback worker thread could not be spawned.
    #[error("failed to spawn capture worker: {0}")]
    WorkerSpawn(#[from] std::io::Error),
}
