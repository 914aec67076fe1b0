//! Response definitions
//!
//! Represents responses to clients.

/// Status line of a successful response
pub const STATUS_OK: &str = "HTTP/1.0 200 OK";

/// Status line used when a not-found response goes out over HTTP
pub const STATUS_NOT_FOUND: &str = "HTTP/1.0 404 Not Found";

/// A single response header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A response to send to the client
///
/// Built by a response builder and consumed right away by the connection
/// handler. Both encoders match on every variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// The method ran and produced a payload
    Success {
        /// Status line (only written by the HTTP encoder)
        status_line: String,

        /// Headers in wire order (only written by the HTTP encoder)
        headers: Vec<Header>,

        /// Payload bytes
        body: Vec<u8>,
    },

    /// No builder is registered for the requested method
    NotFound { requested_method: String },
}

impl Response {
    /// Create a headerless OK response carrying `body`
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Response::Success {
            status_line: STATUS_OK.to_string(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Create a NOT_FOUND response for `method`
    pub fn not_found(method: impl Into<String>) -> Self {
        Response::NotFound {
            requested_method: method.into(),
        }
    }

    /// Append a header, keeping insertion order
    ///
    /// Has no effect on `NotFound`.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let Response::Success { headers, .. } = &mut self {
            headers.push(Header::new(name, value));
        }
        self
    }

    /// Payload bytes, empty for `NotFound`
    pub fn body(&self) -> &[u8] {
        match self {
            Response::Success { body, .. } => body,
            Response::NotFound { .. } => &[],
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success { .. })
    }
}
