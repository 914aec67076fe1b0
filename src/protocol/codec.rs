//! Protocol codec
//!
//! Framing helpers for both wire formats: reading request lines or an HTTP
//! request head from a buffered stream, and encoding a `Response` for the
//! line protocol or for HTTP/1.0.

use std::io::{BufRead, Read, Write};

use bytes::{BufMut, Bytes, BytesMut};

use super::Response;
use super::response::STATUS_NOT_FOUND;
use crate::config::ContentLengthStyle;
use crate::error::{Result, SocketzError};

/// Longest accepted line, excluding its terminator (64 KiB)
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Most lines accepted in one HTTP request head
pub const MAX_HEAD_LINES: usize = 100;

const CRLF: &[u8] = b"\r\n";

// =============================================================================
// Lines
// =============================================================================

/// How a received line was terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
    /// Stream ended before a terminator
    Eof,
}

impl LineEnding {
    /// Terminator used when answering a line that ended this way
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            LineEnding::Lf | LineEnding::Eof => b"\n",
            LineEnding::CrLf => CRLF,
        }
    }
}

/// One received line with its terminator stripped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    pub ending: LineEnding,
}

/// Read one line
///
/// Returns `Ok(None)` at end-of-stream. Invalid UTF-8 is replaced with
/// U+FFFD. A line longer than `MAX_LINE_LEN` is a protocol error.
pub fn read_line<R: BufRead>(reader: &mut R) -> Result<Option<Line>> {
    let limit = MAX_LINE_LEN + CRLF.len();
    let mut buf = Vec::with_capacity(128);

    let n = reader.by_ref().take(limit as u64).read_until(b'\n', &mut buf)?;
    if n == 0 {
        return Ok(None);
    }

    let ending = if buf.ends_with(CRLF) {
        buf.truncate(buf.len() - 2);
        LineEnding::CrLf
    } else if buf.ends_with(b"\n") {
        buf.truncate(buf.len() - 1);
        LineEnding::Lf
    } else if n == limit {
        return Err(line_too_long());
    } else {
        LineEnding::Eof
    };

    if buf.len() > MAX_LINE_LEN {
        return Err(line_too_long());
    }

    let text = match String::from_utf8(buf) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    };

    Ok(Some(Line { text, ending }))
}

fn line_too_long() -> SocketzError {
    SocketzError::Protocol(format!("line exceeds {} bytes", MAX_LINE_LEN))
}

// =============================================================================
// HTTP request head
// =============================================================================

/// The lines of an HTTP request head, up to the blank line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpHead {
    /// Request line followed by header lines, terminators stripped
    pub lines: Vec<String>,

    /// False when the stream ended before the blank line
    pub complete: bool,
}

impl HttpHead {
    /// First line of the head (`GET / HTTP/1.0`), if any arrived
    pub fn request_line(&self) -> Option<&str> {
        self.lines.first().map(String::as_str)
    }

    /// All lines appended back to back, without separators
    pub fn concatenated(&self) -> String {
        self.lines.concat()
    }
}

/// Read request lines until an empty line or end-of-stream
///
/// The content is not interpreted; the head is only collected so it can be
/// logged.
pub fn read_http_head<R: BufRead>(reader: &mut R) -> Result<HttpHead> {
    let mut head = HttpHead::default();

    while let Some(line) = read_line(reader)? {
        if line.text.is_empty() {
            head.complete = true;
            return Ok(head);
        }

        if head.lines.len() == MAX_HEAD_LINES {
            return Err(SocketzError::Protocol(format!(
                "request head exceeds {} lines",
                MAX_HEAD_LINES
            )));
        }

        tracing::trace!("{}", line.text);
        head.lines.push(line.text);
    }

    Ok(head)
}

// =============================================================================
// Response encoding
// =============================================================================

/// Encode a response as a single line-protocol reply
///
/// Only the body of a `Success` goes on the wire; `NotFound` becomes an
/// `ERROR method not found: <method>` line.
pub fn encode_line_response(response: &Response, ending: LineEnding) -> Bytes {
    let terminator = ending.as_bytes();

    match response {
        Response::Success { body, .. } => {
            let mut buf = BytesMut::with_capacity(body.len() + terminator.len());
            buf.put_slice(body);
            buf.put_slice(terminator);
            buf.freeze()
        }
        Response::NotFound { requested_method } => {
            let mut buf = BytesMut::with_capacity(32 + requested_method.len());
            buf.put_slice(b"ERROR method not found: ");
            buf.put_slice(requested_method.as_bytes());
            buf.put_slice(terminator);
            buf.freeze()
        }
    }
}

/// Encode a response as a full HTTP/1.0 message
///
/// `Content-Length` is always appended last and computed from the body.
pub fn encode_http_response(response: &Response, style: ContentLengthStyle) -> Bytes {
    match response {
        Response::Success {
            status_line,
            headers,
            body,
        } => {
            let mut buf = BytesMut::with_capacity(256 + body.len());
            buf.put_slice(status_line.as_bytes());
            buf.put_slice(CRLF);
            for header in headers {
                buf.put_slice(header.name.as_bytes());
                buf.put_slice(b": ");
                buf.put_slice(header.value.as_bytes());
                buf.put_slice(CRLF);
            }
            put_content_length(&mut buf, body.len(), style);
            buf.put_slice(CRLF);
            buf.put_slice(body);
            buf.freeze()
        }
        Response::NotFound { requested_method } => {
            let body = format!("method not found: {}", requested_method);
            let mut buf = BytesMut::with_capacity(128 + body.len());
            buf.put_slice(STATUS_NOT_FOUND.as_bytes());
            buf.put_slice(CRLF);
            buf.put_slice(b"Content-type: text/plain; charset=UTF-8\r\n");
            buf.put_slice(b"Connection: Closed\r\n");
            put_content_length(&mut buf, body.len(), style);
            buf.put_slice(CRLF);
            buf.put_slice(body.as_bytes());
            buf.freeze()
        }
    }
}

fn put_content_length(buf: &mut BytesMut, len: usize, style: ContentLengthStyle) {
    let line = match style {
        // No space after the colon, one stray space before CRLF
        ContentLengthStyle::Legacy => format!("Content-Length:{} \r\n", len),
        ContentLengthStyle::Strict => format!("Content-Length: {}\r\n", len),
    };
    buf.put_slice(line.as_bytes());
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Write bytes and flush; the response only counts as delivered after the flush
pub fn write_all_flush<W: Write>(writer: &mut W, bytes: &[u8]) -> Result<()> {
    writer.write_all(bytes)?;
    writer.flush()?;
    Ok(())
}
