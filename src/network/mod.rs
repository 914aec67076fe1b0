//! Network Module
//!
//! TCP server and client connection handling.
//!
//! ## Architecture
//! - Single acceptor (the Server Loop)
//! - Connections served inline, or by a fixed worker pool
//! - Cooperative cancellation through `ShutdownSignal`

mod server;
mod connection;
mod shutdown;

pub use server::Server;
pub use connection::{Connection, ConnectionState};
pub use shutdown::ShutdownSignal;
