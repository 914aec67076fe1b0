//! Error types for socketz
//!
//! Provides a unified error type for all operations.

use std::io;

use thiserror::Error;

/// Result type alias using SocketzError
pub type Result<T> = std::result::Result<T, SocketzError>;

/// Unified error type for socketz operations
#[derive(Debug, Error)]
pub enum SocketzError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // -------------------------------------------------------------------------
    // Startup Errors (fatal)
    // -------------------------------------------------------------------------
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Failed to bind listener on {addr}: {source}")]
    ListenerBind {
        addr: String,
        #[source]
        source: io::Error,
    },

    // -------------------------------------------------------------------------
    // Per-connection Errors (contained to one connection)
    // -------------------------------------------------------------------------
    #[error("Connection error with {peer}: {source}")]
    ConnectionIo {
        peer: String,
        #[source]
        source: io::Error,
    },

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Per-request Errors (answered on the wire)
    // -------------------------------------------------------------------------
    #[error("method not found: {requested_method}")]
    MethodNotFound { requested_method: String },
}

impl SocketzError {
    /// Whether this error means the peer went away rather than a real failure
    ///
    /// Covers EOF, resets, aborts and broken pipes, including when wrapped
    /// in `ConnectionIo`.
    pub fn is_disconnect(&self) -> bool {
        let kind = match self {
            SocketzError::Io(e) => e.kind(),
            SocketzError::ConnectionIo { source, .. } => source.kind(),
            _ => return false,
        };

        matches!(
            kind,
            io::ErrorKind::UnexpectedEof
                | io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionAborted
                | io::ErrorKind::BrokenPipe
        )
    }

    /// Whether this error is a read/write timeout
    pub fn is_timeout(&self) -> bool {
        let kind = match self {
            SocketzError::Io(e) => e.kind(),
            SocketzError::ConnectionIo { source, .. } => source.kind(),
            _ => return false,
        };

        // Unix reports WouldBlock for SO_RCVTIMEO, Windows reports TimedOut
        matches!(kind, io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
    }
}
