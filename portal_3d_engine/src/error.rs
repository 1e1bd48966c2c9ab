//! Error types for the Portal3D engine
//!
//! This module defines the error types used throughout the engine,
//! including portal configuration, rendering backend and resource errors.

use std::fmt;

/// Result type for Portal3D engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Portal3D engine errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (texture allocation, scene render, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (unknown portal, unknown traveller, etc.)
    InvalidResource(String),

    /// Initialization failed (engine, renderer, subsystems)
    InitializationFailed(String),

    /// Portal setup is inconsistent (missing or asymmetric link, bad config values)
    InvalidConfiguration(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::InvalidConfiguration(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
