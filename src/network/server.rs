//! TCP Server
//!
//! Owns the listening socket and runs the accept loop. Connections are
//! served inline (iterative mode) or handed to a fixed pool of worker
//! threads.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use crossbeam::channel;

use super::connection::Connection;
use super::shutdown::ShutdownSignal;
use crate::config::{Config, ConnectionMode};
use crate::error::{Result, SocketzError};
use crate::registry::Registry;

/// TCP server for socketz
pub struct Server {
    config: Config,
    listener: TcpListener,
    registry: Arc<Registry>,
    shutdown: ShutdownSignal,
}

impl Server {
    /// Validate `config` and bind its listen address
    ///
    /// Nothing is opened when the config is invalid.
    pub fn bind(config: Config, registry: Registry) -> Result<Self> {
        config.validate()?;

        let addr = config.listen_addr();
        let listener =
            TcpListener::bind(&addr).map_err(|source| SocketzError::ListenerBind { addr, source })?;

        Self::from_listener(listener, config, registry)
    }

    /// Serve on an already bound listener
    ///
    /// The listen address in `config` is ignored.
    pub fn from_listener(
        listener: TcpListener,
        config: Config,
        registry: Registry,
    ) -> Result<Self> {
        let shutdown = ShutdownSignal::new();
        shutdown.set_wake_addr(listener.local_addr()?);

        Ok(Self {
            config,
            listener,
            registry: Arc::new(registry),
            shutdown,
        })
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle for stopping the server from another thread
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Start the server (blocking)
    ///
    /// Returns `Ok(())` once the shutdown signal fires, or the listener
    /// error that made accepting impossible. The listener is released when
    /// this returns.
    pub fn run(self) -> Result<()> {
        tracing::info!(
            "Listening on {} (protocol={:?}, mode={:?})",
            self.local_addr()?,
            self.config.protocol,
            self.config.mode
        );

        let result = match self.config.mode {
            ConnectionMode::Iterative => self.run_iterative(),
            ConnectionMode::WorkerPool { workers } => self.run_pool(workers),
        };

        match &result {
            Ok(()) => tracing::info!("Server stopped"),
            Err(e) => tracing::error!("Server stopped on listener error: {}", e),
        }
        result
    }

    /// Accept, serve to completion, repeat
    fn run_iterative(&self) -> Result<()> {
        while let Some(stream) = self.next_connection()? {
            serve_connection(stream, &self.config, &self.registry, &self.shutdown);
        }
        Ok(())
    }

    /// Accept on this thread, serve on `workers` threads
    fn run_pool(&self, workers: usize) -> Result<()> {
        let (tx, rx) = channel::bounded::<TcpStream>(self.config.max_pending);

        let mut handles = Vec::with_capacity(workers);
        for id in 0..workers {
            let rx = rx.clone();
            let config = self.config.clone();
            let registry = Arc::clone(&self.registry);
            let shutdown = self.shutdown.clone();

            let handle = thread::Builder::new()
                .name(format!("socketz-worker-{}", id))
                .spawn(move || {
                    for stream in rx.iter() {
                        serve_connection(stream, &config, &registry, &shutdown);
                    }
                })?;
            handles.push(handle);
        }
        drop(rx);

        let result = loop {
            match self.next_connection() {
                Ok(Some(stream)) => {
                    if tx.send(stream).is_err() {
                        break Ok(());
                    }
                }
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            }
        };

        // Closing the channel lets workers drain the queue and exit
        drop(tx);
        for handle in handles {
            if handle.join().is_err() {
                tracing::error!("Worker thread panicked");
            }
        }

        result
    }

    /// Block until the next client connects
    ///
    /// `Ok(None)` once shutdown was requested. Errors that only concern the
    /// half-open connection are logged and skipped.
    fn next_connection(&self) -> Result<Option<TcpStream>> {
        loop {
            if self.shutdown.is_triggered() {
                return Ok(None);
            }

            match self.listener.accept() {
                Ok((stream, addr)) => {
                    if self.shutdown.is_triggered() {
                        // Most likely the wake-up connection from trigger()
                        return Ok(None);
                    }
                    tracing::debug!("Accepted connection from {}", addr);
                    return Ok(Some(stream));
                }
                Err(e) if is_transient_accept_error(&e) => {
                    tracing::warn!("Accept failed, continuing: {}", e);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .field("listener", &self.listener)
            .field("registry", &self.registry)
            .finish()
    }
}

/// Run one connection to completion, containing every failure
fn serve_connection(
    stream: TcpStream,
    config: &Config,
    registry: &Arc<Registry>,
    shutdown: &ShutdownSignal,
) {
    let mut connection = match Connection::new(stream, Arc::clone(registry), shutdown.clone()) {
        Ok(connection) => connection,
        Err(e) => {
            tracing::warn!("Failed to set up connection: {}", e);
            return;
        }
    };

    if let Err(e) = connection.set_timeouts(config.read_timeout_ms, config.write_timeout_ms) {
        tracing::warn!("Failed to set timeouts for {}: {}", connection.peer_addr(), e);
        return;
    }

    if let Err(e) = connection.handle(config) {
        tracing::warn!("Connection {} closed with error: {}", connection.peer_addr(), e);
    }

    tracing::debug!(
        "Connection {} closed after {} response(s)",
        connection.peer_addr(),
        connection.responses_sent()
    );
}

fn is_transient_accept_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::TimedOut
    )
}
