//! Connection Handler
//!
//! Owns one accepted socket for its whole lifetime and runs the
//! read → dispatch → write cycle on it.
//!
//! ## States
//! ```text
//! ACCEPTED → READING → DISPATCHING → WRITING ─┬─▶ OPEN_FOR_NEXT_READ ─▶ READING
//!                                             └─▶ CLOSED
//! ```
//! Any I/O failure, end-of-stream or cancellation leads to `CLOSED`.

use std::io::{self, BufReader, BufWriter, Read};
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use super::shutdown::{ActiveConnection, ShutdownSignal};
use crate::config::{Config, ContentLengthStyle, Protocol};
use crate::error::{Result, SocketzError};
use crate::protocol::{
    encode_http_response, encode_line_response, parse, read_http_head, read_line,
    write_all_flush, LineEnding, Request, Response,
};
use crate::registry::{HtmlGreeting, Registry, ResponseBuilder};

/// How long a finished HTTP exchange waits for leftover request bytes
const DRAIN_TIMEOUT: Duration = Duration::from_millis(100);

/// Most leftover request bytes read before closing anyway
const DRAIN_LIMIT: u64 = 64 * 1024;

/// Where a connection is in its read/dispatch/write cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Accepted,
    Reading,
    Dispatching,
    Writing,
    OpenForNextRead,
    Closed,
}

/// How line-protocol input turns into responses
#[derive(Debug, Clone, Copy)]
enum LineMode {
    /// Answer every line with itself
    Verbatim,
    /// Parse and dispatch through the registry
    Dispatch,
}

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Method registry shared by all connections
    registry: Arc<Registry>,

    /// Server-wide stop flag
    shutdown: ShutdownSignal,

    /// Keeps this socket reachable from `ShutdownSignal::trigger`
    _active: ActiveConnection,

    /// Peer address for logging
    peer_addr: String,

    state: ConnectionState,

    /// Responses written so far
    responses_sent: u64,
}

impl Connection {
    /// Create a new connection handler
    ///
    /// Sets up buffered I/O and registers the socket with `shutdown`.
    pub fn new(
        stream: TcpStream,
        registry: Arc<Registry>,
        shutdown: ShutdownSignal,
    ) -> Result<Self> {
        // Get peer address for logging before we split the stream
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        let active = shutdown.track(&stream)?;

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            registry,
            shutdown,
            _active: active,
            peer_addr,
            state: ConnectionState::Accepted,
            responses_sent: 0,
        })
    }

    /// Configure connection timeouts (0 leaves that direction blocking)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        let read_stream = self.reader.get_ref();
        let write_stream = self.writer.get_ref();

        if read_ms > 0 {
            read_stream.set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            write_stream.set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }

        Ok(())
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Peer disconnects, timeouts and cancellation end the connection with
    /// `Ok(())`. Other I/O failures come back as `ConnectionIo`; the socket
    /// is closed either way.
    pub fn handle(&mut self, config: &Config) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        match config.protocol {
            Protocol::Echo => self.serve_lines(LineMode::Verbatim, config.persistent),
            Protocol::Method => self.serve_lines(LineMode::Dispatch, config.persistent),
            Protocol::Http => self.serve_http(config.content_length_style),
        }
    }

    /// Line-protocol loop: one request line in, at most one response line out
    fn serve_lines(&mut self, mode: LineMode, persistent: bool) -> Result<()> {
        loop {
            if self.shutdown.is_triggered() {
                tracing::debug!("Server stopping, closing {}", self.peer_addr);
                break;
            }

            self.transition(ConnectionState::Reading);
            let line = match read_line(&mut self.reader) {
                Ok(Some(line)) => line,
                Ok(None) => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    break;
                }
                Err(SocketzError::Protocol(message)) => {
                    tracing::warn!("Protocol error from {}: {}", self.peer_addr, message);
                    // Best effort, the connection is closing regardless
                    let reply = format!("ERROR {}\n", message);
                    let _ = write_all_flush(&mut self.writer, reply.as_bytes());
                    return self.fail(SocketzError::Protocol(message));
                }
                Err(e) => return self.fail(e),
            };

            tracing::trace!("recv-message from {}: {}", self.peer_addr, line.text);

            self.transition(ConnectionState::Dispatching);
            let response = match mode {
                LineMode::Verbatim => Some(Response::ok(line.text.as_bytes())),
                LineMode::Dispatch => parse(&line.text).map(|request| self.dispatch(&request)),
            };

            let Some(response) = response else {
                tracing::trace!("Blank line from {}, nothing to dispatch", self.peer_addr);
                continue;
            };

            self.transition(ConnectionState::Writing);
            if let Err(e) = self.send_line(&response, line.ending) {
                return self.fail(e);
            }

            if !persistent {
                break;
            }
            self.transition(ConnectionState::OpenForNextRead);
        }

        self.close();
        Ok(())
    }

    /// HTTP exchange: read the head, answer with the greeting page, close
    fn serve_http(&mut self, style: ContentLengthStyle) -> Result<()> {
        if self.shutdown.is_triggered() {
            tracing::debug!("Server stopping, closing {}", self.peer_addr);
            self.close();
            return Ok(());
        }

        self.transition(ConnectionState::Reading);
        let head = match read_http_head(&mut self.reader) {
            Ok(head) => head,
            Err(e) => return self.fail(e),
        };

        // A read cut short by cancellation is not a request
        if !head.complete && self.shutdown.is_triggered() {
            tracing::debug!("Server stopping, dropping partial request from {}", self.peer_addr);
            self.close();
            return Ok(());
        }

        tracing::debug!(
            "HTTP request from {}: {:?} ({} line(s), complete={})",
            self.peer_addr,
            head.request_line().unwrap_or(""),
            head.lines.len(),
            head.complete
        );
        tracing::trace!("HTTP head: {}", head.concatenated());

        self.transition(ConnectionState::Dispatching);
        // Content is never inspected; the page is the same for every request
        let request = head
            .request_line()
            .and_then(parse)
            .unwrap_or_else(|| Request::new("GET", "/"));
        let response = HtmlGreeting.build(&request);

        self.transition(ConnectionState::Writing);
        let bytes = encode_http_response(&response, style);
        if let Err(e) = write_all_flush(&mut self.writer, &bytes) {
            return self.fail(e);
        }
        self.responses_sent += 1;

        tracing::trace!("HTTP response to {}: {}", self.peer_addr, String::from_utf8_lossy(&bytes));

        self.drain_and_close();
        Ok(())
    }

    /// Close after a response without discarding it
    ///
    /// Unread request bytes (a POST body) at close time make the kernel send
    /// RST, which can destroy the response before the client reads it. The
    /// write side is shut first, then leftover input is drained briefly.
    fn drain_and_close(&mut self) {
        let _ = self.writer.get_ref().shutdown(Shutdown::Write);

        let read_stream = self.reader.get_ref();
        if read_stream.set_read_timeout(Some(DRAIN_TIMEOUT)).is_ok() {
            let mut leftover = (&mut self.reader).take(DRAIN_LIMIT);
            if let Ok(n) = io::copy(&mut leftover, &mut io::sink()) {
                if n > 0 {
                    tracing::trace!("Drained {} unread byte(s) from {}", n, self.peer_addr);
                }
            }
        }

        self.close();
    }

    /// Resolve and run the builder for a parsed request
    fn dispatch(&self, request: &Request) -> Response {
        let response = self.registry.dispatch(request);
        if let Response::NotFound { requested_method } = &response {
            tracing::debug!("Unknown method {:?} from {}", requested_method, self.peer_addr);
        }
        response
    }

    /// Send a line-protocol response to the client
    fn send_line(&mut self, response: &Response, ending: LineEnding) -> Result<()> {
        let bytes = encode_line_response(response, ending);
        write_all_flush(&mut self.writer, &bytes)?;
        self.responses_sent += 1;
        Ok(())
    }

    /// Close after an error, deciding whether it is worth reporting
    fn fail(&mut self, err: SocketzError) -> Result<()> {
        self.close();

        if err.is_disconnect() {
            tracing::debug!("Client {} went away: {}", self.peer_addr, err);
            return Ok(());
        }
        if err.is_timeout() {
            tracing::debug!("Timeout for client {}", self.peer_addr);
            return Ok(());
        }

        Err(match err {
            SocketzError::Io(source) => SocketzError::ConnectionIo {
                peer: self.peer_addr.clone(),
                source,
            },
            other => other,
        })
    }

    /// Release the socket; safe to call more than once
    fn close(&mut self) {
        if self.state == ConnectionState::Closed {
            return;
        }
        // NotConnected here only means the peer closed first
        let _ = self.writer.get_ref().shutdown(Shutdown::Both);
        self.transition(ConnectionState::Closed);
    }

    fn transition(&mut self, next: ConnectionState) {
        tracing::trace!("{}: {:?} -> {:?}", self.peer_addr, self.state, next);
        self.state = next;
    }

    /// Current state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Number of responses written on this connection
    pub fn responses_sent(&self) -> u64 {
        self.responses_sent
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("peer_addr", &self.peer_addr)
            .field("state", &self.state)
            .field("responses_sent", &self.responses_sent)
            .finish()
    }
}
