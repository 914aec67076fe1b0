//! Tests for Config
//!
//! These tests verify:
//! - Port validation at build time
//! - Protocol-dependent default ports
//! - Server::bind refusing invalid configs before opening a socket

use socketz::config::{
    Config, ConnectionMode, ContentLengthStyle, Protocol, DEFAULT_HTTP_PORT, DEFAULT_LINE_PORT,
};
use socketz::{Registry, Server, SocketzError};

// =============================================================================
// Port Validation Tests
// =============================================================================

#[test]
fn test_port_zero_rejected() {
    let result = Config::builder().port(0).build();
    assert!(matches!(result, Err(SocketzError::InvalidConfiguration(_))));
}

#[test]
fn test_negative_port_rejected() {
    for port in [-1, -8888, i64::MIN] {
        let result = Config::builder().port(port).build();
        assert!(
            matches!(result, Err(SocketzError::InvalidConfiguration(_))),
            "port {} should be rejected",
            port
        );
    }
}

#[test]
fn test_port_above_range_rejected() {
    let result = Config::builder().port(65_536).build();
    assert!(matches!(result, Err(SocketzError::InvalidConfiguration(_))));
}

#[test]
fn test_port_bounds_accepted() {
    assert_eq!(Config::builder().port(1).build().unwrap().port, 1);
    assert_eq!(Config::builder().port(65_535).build().unwrap().port, 65_535);
}

#[test]
fn test_error_mentions_port() {
    let err = Config::builder().port(-5).build().unwrap_err();
    assert!(err.to_string().contains("-5"));
}

// =============================================================================
// Defaults Tests
// =============================================================================

#[test]
fn test_default_ports_follow_protocol() {
    let echo = Config::builder().protocol(Protocol::Echo).build().unwrap();
    let method = Config::builder().protocol(Protocol::Method).build().unwrap();
    let http = Config::builder().protocol(Protocol::Http).build().unwrap();

    assert_eq!(echo.port, DEFAULT_LINE_PORT);
    assert_eq!(method.port, DEFAULT_LINE_PORT);
    assert_eq!(http.port, DEFAULT_HTTP_PORT);
}

#[test]
fn test_defaults() {
    let config = Config::default();

    assert_eq!(config.protocol, Protocol::Echo);
    assert_eq!(config.mode, ConnectionMode::Iterative);
    assert_eq!(config.content_length_style, ContentLengthStyle::Legacy);
    assert!(config.persistent);
    assert_eq!(config.read_timeout_ms, 0);
    assert_eq!(config.listen_addr(), "127.0.0.1:8888");
}

#[test]
fn test_builder_sets_fields() {
    let config = Config::builder()
        .host("0.0.0.0")
        .port(9000)
        .protocol(Protocol::Method)
        .persistent(false)
        .mode(ConnectionMode::WorkerPool { workers: 4 })
        .max_pending(8)
        .content_length_style(ContentLengthStyle::Strict)
        .read_timeout_ms(100)
        .write_timeout_ms(200)
        .build()
        .unwrap();

    assert_eq!(config.listen_addr(), "0.0.0.0:9000");
    assert_eq!(config.protocol, Protocol::Method);
    assert!(!config.persistent);
    assert_eq!(config.mode, ConnectionMode::WorkerPool { workers: 4 });
    assert_eq!(config.max_pending, 8);
    assert_eq!(config.content_length_style, ContentLengthStyle::Strict);
    assert_eq!(config.read_timeout_ms, 100);
    assert_eq!(config.write_timeout_ms, 200);
}

#[test]
fn test_empty_worker_pool_rejected() {
    let result = Config::builder()
        .mode(ConnectionMode::WorkerPool { workers: 0 })
        .build();
    assert!(matches!(result, Err(SocketzError::InvalidConfiguration(_))));
}

#[test]
fn test_zero_max_pending_rejected() {
    let result = Config::builder().max_pending(0).build();
    assert!(matches!(result, Err(SocketzError::InvalidConfiguration(_))));
}

// =============================================================================
// Server Construction Tests
// =============================================================================

#[test]
fn test_bind_rejects_port_zero() {
    let config = Config {
        port: 0,
        ..Config::default()
    };

    let result = Server::bind(config, Registry::with_defaults());
    assert!(matches!(result, Err(SocketzError::InvalidConfiguration(_))));
}

#[test]
fn test_bind_reports_listener_error() {
    // Occupy a port, then ask the server for the same one
    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = taken.local_addr().unwrap().port();

    let config = Config::builder().port(i64::from(port)).build().unwrap();
    let result = Server::bind(config, Registry::with_defaults());

    match result {
        Err(SocketzError::ListenerBind { addr, .. }) => {
            assert_eq!(addr, format!("127.0.0.1:{}", port));
        }
        other => panic!("Expected ListenerBind, got {:?}", other.map(|_| ())),
    }
}
