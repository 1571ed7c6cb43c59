//! # Error Types
//!
//! This module defines error types used throughout the cartolina library.

use thiserror::Error;

/// Main error type for cartolina operations
#[derive(Debug, Error)]
pub enum CartolinaError {
    /// QR payload could not be encoded (oversized input for the EC level)
    #[error("QR encoding error: {0}")]
    Encoding(String),

    /// An asset failed to load or decode
    #[error("Asset load error: {0}")]
    AssetLoad(String),

    /// A drawing step failed
    #[error("Draw error: {0}")]
    Draw(String),

    /// Image processing or encoding error
    #[error("Image error: {0}")]
    Image(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
