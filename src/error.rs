//! # Error Types
//!
//! This module defines error types used throughout the lucero library.
//!
//! Two layers exist: [`LuceroError`] is the internal error type that
//! operations propagate with `?`; [`ClassifiedError`] is the terminal,
//! caller-facing form produced by the service layer, carrying one of the
//! four classification codes from the call surface.

use std::fmt;

use thiserror::Error;

/// Main error type for lucero operations
#[derive(Debug, Error)]
pub enum LuceroError {
    /// Transport-level errors (port open, write, status read, release)
    #[error("Transport error: {0}")]
    Transport(String),

    /// A required call argument was absent
    #[error("Missing required argument: {0}")]
    MissingArgument(&'static str),

    /// A call argument was present but not usable
    #[error("Invalid argument {0}: {1}")]
    InvalidArgument(&'static str, String),

    /// Image acquisition or decoding error
    ///
    /// Inside the compiler these are swallowed (the one operation is
    /// skipped); they only surface from the [`crate::raster`] API itself.
    #[error("Image error: {0}")]
    Image(String),

    /// The driver reports the target port already holds a live connection.
    ///
    /// Treated as success by the session layer.
    #[error("Already connected")]
    AlreadyConnected,

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// CALLER-FACING CLASSIFICATION
// ============================================================================

/// Classification codes surfaced to callers, one per call-surface operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    PortDiscovery,
    CheckStatus,
    Connect,
    Print,
}

impl ErrorCode {
    /// The wire-format code string for this classification.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::PortDiscovery => "PORT_DISCOVERY_ERROR",
            ErrorCode::CheckStatus => "CHECK_STATUS_ERROR",
            ErrorCode::Connect => "CONNECT_ERROR",
            ErrorCode::Print => "PRINT_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A terminal, classified error returned from the call surface.
#[derive(Debug, Error)]
#[error("{code}: {message}")]
pub struct ClassifiedError {
    pub code: ErrorCode,
    pub message: String,
}

impl ClassifiedError {
    pub fn new(code: ErrorCode, error: impl fmt::Display) -> Self {
        Self {
            code,
            message: error.to_string(),
        }
    }
}
