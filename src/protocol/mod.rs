//! Protocol Module
//!
//! Defines the wire formats spoken by the servers.
//!
//! ## Line Protocol
//!
//! ```text
//! <method> SP <value> LF        (CR LF accepted as well)
//! ```
//!
//! - The method is the first token, the value the second token only
//! - Further tokens are ignored
//! - Empty or whitespace-only lines carry no request
//! - The reply is one line, terminated the way the request was
//!
//! ## HTTP/1.0 Response
//!
//! ```text
//! HTTP/1.0 200 OK\r\n
//! Server: HTTP server/0.1\r\n
//! Content-type: text/html; charset=UTF-8\r\n
//! Connection: Closed\r\n
//! Content-Length:<N> \r\n
//! \r\n
//! <body>
//! ```

mod request;
mod response;
mod codec;

pub use request::{parse, Request};
pub use response::{Header, Response, STATUS_NOT_FOUND, STATUS_OK};
pub use codec::{
    encode_http_response, encode_line_response, read_http_head, read_line, write_all_flush,
    HttpHead, Line, LineEnding, MAX_HEAD_LINES, MAX_LINE_LEN,
};
