//! Error types for telemetry processing.
//!
//! All errors implement the `std::error::Error` trait and carry structured
//! context for debugging.
//!
//! ## Error Categories
//!
//! - **Bind Errors**: The listener, recorder, or player socket could not be set up
//! - **Socket Errors**: A previously working socket failed mid-task
//! - **File Errors**: Problems reading or writing sample recordings
//! - **Datagram Errors**: A buffer of the wrong size reached the decoder
//!
//! Transport and file errors are fatal to the task that owns the resource and
//! propagate to the caller. Datagram-size errors are a decode guard: the live
//! listener drops such packets instead of propagating, while direct codec
//! callers receive them as hard errors.
//!
//! ```rust
//! use datasport::TelemetryError;
//!
//! let error = TelemetryError::datagram_size(120);
//! assert!(!error.is_retryable());
//! ```

use std::path::PathBuf;
use thiserror::Error;

use crate::packet::DATAGRAM_LEN;

/// Result type alias for telemetry operations.
pub type Result<T, E = TelemetryError> = std::result::Result<T, E>;

/// Main error type for telemetry operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TelemetryError {
    #[error("Failed to bind UDP socket on {addr}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Socket error during {operation}")]
    Socket {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Sample file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Datagram size mismatch: expected {expected} bytes, got {actual}")]
    DatagramSize { expected: usize, actual: usize },
}

impl TelemetryError {
    /// Returns whether this error is potentially recoverable through retry.
    ///
    /// Transport failures can succeed on a later attempt (a contended port
    /// freeing up, a transient send failure). Wrong-size datagrams and file
    /// errors will fail the same way every time.
    pub fn is_retryable(&self) -> bool {
        match self {
            TelemetryError::Bind { .. } => true,
            TelemetryError::Socket { .. } => true,
            TelemetryError::File { .. } => false,
            TelemetryError::DatagramSize { .. } => false,
        }
    }

    /// Helper constructor for bind errors with address context.
    pub fn bind_failed(addr: impl ToString, source: std::io::Error) -> Self {
        TelemetryError::Bind { addr: addr.to_string(), source }
    }

    /// Helper constructor for socket errors naming the failed operation.
    pub fn socket_error(operation: impl Into<String>, source: std::io::Error) -> Self {
        TelemetryError::Socket { operation: operation.into(), source }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TelemetryError::File { path: path.into(), source }
    }

    /// Helper constructor for wrong-size datagram errors.
    pub fn datagram_size(actual: usize) -> Self {
        TelemetryError::DatagramSize { expected: DATAGRAM_LEN, actual }
    }
}
