//! # socketz
//!
//! Small blocking TCP servers built around one line-oriented
//! request/response engine:
//! - Echo server (every line written back verbatim)
//! - "method value" server with a static method registry
//! - Single-threaded HTTP/1.0 responder serving a fixed greeting page
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Server Loop                             │
//! │        (accept → handle → repeat, or worker pool)            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ one TcpStream
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  Connection Handler                          │
//! │         READING → DISPATCHING → WRITING → ...                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Parser    │ ───────▶ │  Registry   │
//!   │ (line→req)  │          │ (method→fn) │
//!   └─────────────┘          └──────┬──────┘
//!                                   │
//!                                   ▼
//!                           ┌─────────────┐
//!                           │  Builders   │
//!                           │ (req→resp)  │
//!                           └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod registry;
pub mod network;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{SocketzError, Result};
pub use config::{Config, ConnectionMode, Protocol};
pub use network::{Server, ShutdownSignal};
pub use registry::Registry;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of socketz
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
