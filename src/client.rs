//! Blocking client
//!
//! Talks to any of the servers: one request line at a time for the line
//! protocols, or a single HTTP/1.0 exchange.

use std::io::{BufReader, BufWriter, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::error::{Result, SocketzError};
use crate::protocol::{read_line, write_all_flush};

/// A connected client
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    /// Connect to a server
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
        })
    }

    /// Fail reads that take longer than `timeout`
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.reader.get_ref().set_read_timeout(timeout)?;
        Ok(())
    }

    /// Send one line (a `\n` is appended)
    pub fn write_line(&mut self, line: &str) -> Result<()> {
        let mut bytes = Vec::with_capacity(line.len() + 1);
        bytes.extend_from_slice(line.as_bytes());
        bytes.push(b'\n');
        write_all_flush(&mut self.writer, &bytes)
    }

    /// Read one response line, `None` if the server closed the connection
    pub fn read_line(&mut self) -> Result<Option<String>> {
        Ok(read_line(&mut self.reader)?.map(|line| line.text))
    }

    /// Send `line` and wait for the reply line
    pub fn send_line(&mut self, line: &str) -> Result<String> {
        self.write_line(line)?;
        self.read_line()?.ok_or_else(|| {
            SocketzError::Protocol("server closed the connection before replying".to_string())
        })
    }

    /// Send a minimal HTTP/1.0 GET and return the raw response
    ///
    /// Reads until the server closes the connection.
    pub fn http_get(mut self, path: &str) -> Result<Vec<u8>> {
        let request = format!("GET {} HTTP/1.0\r\n\r\n", path);
        write_all_flush(&mut self.writer, request.as_bytes())?;

        let mut response = Vec::new();
        self.reader.read_to_end(&mut response)?;
        Ok(response)
    }

    /// Half-close the sending side, signalling end-of-stream to the server
    pub fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().shutdown(std::net::Shutdown::Write)?;
        Ok(())
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("peer_addr", &self.reader.get_ref().peer_addr().ok())
            .finish()
    }
}
