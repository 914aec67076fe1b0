//! Cancellation token
//!
//! A blocked `accept` or `read` cannot be interrupted directly, so
//! triggering the signal also shuts down the read half of every tracked
//! connection and pokes the listener with a loopback connection.

use std::collections::HashMap;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, Shutdown, SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

const WAKE_TIMEOUT: Duration = Duration::from_millis(500);

/// Shared stop flag for a server and its connections
#[derive(Clone, Default)]
pub struct ShutdownSignal {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    triggered: AtomicBool,

    /// Address that reaches the listener, used to unblock `accept`
    wake_addr: Mutex<Option<SocketAddr>>,

    /// Read handles of connections currently being served
    active: Mutex<HashMap<u64, TcpStream>>,

    next_id: AtomicU64,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a stop was requested
    pub fn is_triggered(&self) -> bool {
        self.inner.triggered.load(Ordering::SeqCst)
    }

    /// Request a stop
    ///
    /// Idempotent. In-flight writes complete; blocked reads observe
    /// end-of-stream; a blocked accept returns.
    pub fn trigger(&self) {
        if self.inner.triggered.swap(true, Ordering::SeqCst) {
            return;
        }

        let active = std::mem::take(&mut *self.inner.active.lock());
        tracing::debug!("Shutdown requested, closing {} active connection(s)", active.len());
        for stream in active.into_values() {
            // NotConnected just means the peer is already gone
            let _ = stream.shutdown(Shutdown::Read);
        }

        let wake_addr = *self.inner.wake_addr.lock();
        if let Some(addr) = wake_addr {
            if let Err(e) = TcpStream::connect_timeout(&addr, WAKE_TIMEOUT) {
                tracing::debug!("Could not wake listener at {}: {}", addr, e);
            }
        }
    }

    /// Remember where the listener can be reached
    ///
    /// Wildcard addresses are rewritten to loopback.
    pub(crate) fn set_wake_addr(&self, addr: SocketAddr) {
        let mut addr = addr;
        if addr.ip().is_unspecified() {
            match addr {
                SocketAddr::V4(_) => addr.set_ip(Ipv4Addr::LOCALHOST.into()),
                SocketAddr::V6(_) => addr.set_ip(Ipv6Addr::LOCALHOST.into()),
            }
        }
        *self.inner.wake_addr.lock() = Some(addr);
    }

    /// Track a connection so `trigger` can unblock its reads
    pub(crate) fn track(&self, stream: &TcpStream) -> io::Result<ActiveConnection> {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let handle = stream.try_clone()?;
        self.inner.active.lock().insert(id, handle);

        // trigger() may already have swept the table; cut this one off too
        if self.is_triggered() {
            if let Some(late) = self.inner.active.lock().remove(&id) {
                let _ = late.shutdown(Shutdown::Read);
            }
        }

        Ok(ActiveConnection {
            signal: self.clone(),
            id,
        })
    }

    /// Number of connections currently tracked
    pub fn active_connections(&self) -> usize {
        self.inner.active.lock().len()
    }
}

impl std::fmt::Debug for ShutdownSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownSignal")
            .field("triggered", &self.is_triggered())
            .field("active", &self.active_connections())
            .finish()
    }
}

/// Untracks its connection when dropped
pub(crate) struct ActiveConnection {
    signal: ShutdownSignal,
    id: u64,
}

impl Drop for ActiveConnection {
    fn drop(&mut self) {
        self.signal.inner.active.lock().remove(&self.id);
    }
}
