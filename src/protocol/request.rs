//! Request definitions
//!
//! Represents one parsed request line.

/// A parsed `<method> <value>` request
///
/// Transient: built per input line and dropped after dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// First token, never empty
    pub method: String,

    /// Second token, or empty when absent
    pub value: String,
}

impl Request {
    /// Create a request from its parts
    pub fn new(method: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            value: value.into(),
        }
    }
}

/// Parse a request line
///
/// Splits on single spaces. Returns `None` for an empty or whitespace-only
/// line, which callers must not dispatch. Only the second token becomes the
/// value; anything after it is discarded.
pub fn parse(line: &str) -> Option<Request> {
    if line.trim().is_empty() {
        return None;
    }

    // Leading spaces produce empty tokens; the first non-empty one is the method
    let mut tokens = line.split(' ').skip_while(|token| token.is_empty());

    let method = tokens.next()?;
    let value = tokens.next().unwrap_or("");

    Some(Request::new(method, value))
}
