//! Configuration for socketz
//!
//! Centralized configuration with sensible defaults. The port is validated
//! when the config is built, before any socket exists.

use crate::error::{Result, SocketzError};

/// Default port of the line-protocol servers
pub const DEFAULT_LINE_PORT: u16 = 8888;

/// Default port of the HTTP responder
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Which server a listener speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Protocol {
    /// Write every received line back verbatim
    Echo,

    /// Parse `<method> <value>` lines and dispatch through the registry
    Method,

    /// Read an HTTP request head, answer with the fixed greeting page, close
    Http,
}

impl Protocol {
    /// Port used when none is configured
    pub fn default_port(self) -> u16 {
        match self {
            Protocol::Echo | Protocol::Method => DEFAULT_LINE_PORT,
            Protocol::Http => DEFAULT_HTTP_PORT,
        }
    }
}

/// How the Server Loop services accepted connections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    /// Accept one connection, serve it to completion, accept the next
    Iterative,

    /// Hand each connection to one of `workers` threads
    WorkerPool { workers: usize },
}

/// How the HTTP encoder writes the `Content-Length` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentLengthStyle {
    /// `Content-Length:<N> \r\n` (byte-compatible with the classic responder)
    Legacy,

    /// `Content-Length: <N>\r\n`
    Strict,
}

/// Main configuration for a socketz server
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Host/interface to bind
    pub host: String,

    /// TCP port, never 0 once built
    pub port: u16,

    /// Connection read timeout (milliseconds, 0 = block forever)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = block forever)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Protocol Configuration
    // -------------------------------------------------------------------------
    /// Wire protocol served on every connection
    pub protocol: Protocol,

    /// Keep line-protocol connections open for further requests
    pub persistent: bool,

    /// Content-Length formatting for HTTP responses
    pub content_length_style: ContentLengthStyle,

    // -------------------------------------------------------------------------
    // Concurrency Configuration
    // -------------------------------------------------------------------------
    /// Accept loop fan-out
    pub mode: ConnectionMode,

    /// Accepted connections allowed to queue for a busy worker pool
    pub max_pending: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_LINE_PORT,
            read_timeout_ms: 0,
            write_timeout_ms: 0,
            protocol: Protocol::Echo,
            persistent: true,
            content_length_style: ContentLengthStyle::Legacy,
            mode: ConnectionMode::Iterative,
            max_pending: 128,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Listen address in `host:port` form
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check invariants that the field types alone cannot express
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(SocketzError::InvalidConfiguration(
                "port range check: 0".to_string(),
            ));
        }
        if let ConnectionMode::WorkerPool { workers: 0 } = self.mode {
            return Err(SocketzError::InvalidConfiguration(
                "worker pool needs at least one worker".to_string(),
            ));
        }
        if self.max_pending == 0 {
            return Err(SocketzError::InvalidConfiguration(
                "max_pending must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
///
/// The port is held as a signed integer so that negative input from a
/// caller surfaces as `InvalidConfiguration` instead of wrapping.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
    port: Option<i64>,
}

impl ConfigBuilder {
    /// Set the host/interface to bind
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the TCP port (must be in 1..=65535)
    pub fn port(mut self, port: i64) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the wire protocol
    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.config.protocol = protocol;
        self
    }

    /// Keep line-protocol connections open between requests
    pub fn persistent(mut self, persistent: bool) -> Self {
        self.config.persistent = persistent;
        self
    }

    /// Set the HTTP Content-Length formatting
    pub fn content_length_style(mut self, style: ContentLengthStyle) -> Self {
        self.config.content_length_style = style;
        self
    }

    /// Set the accept loop fan-out
    pub fn mode(mut self, mode: ConnectionMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Set how many accepted connections may wait for a worker
    pub fn max_pending(mut self, count: usize) -> Self {
        self.config.max_pending = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Validate and produce the config
    ///
    /// Fails with `InvalidConfiguration` for a port outside 1..=65535.
    pub fn build(self) -> Result<Config> {
        let mut config = self.config;

        config.port = match self.port {
            None => config.protocol.default_port(),
            Some(port) if port > 0 && port <= i64::from(u16::MAX) => port as u16,
            Some(port) => {
                return Err(SocketzError::InvalidConfiguration(format!(
                    "port range check: {}",
                    port
                )))
            }
        };

        config.validate()?;
        Ok(config)
    }
}
