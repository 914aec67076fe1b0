//! Response builders
//!
//! Each builder turns a parsed request into a `Response::Success`.

use std::fmt::Write as _;

use chrono::Local;

use crate::protocol::{Request, Response};

/// Body of the HTTP greeting page, tags back to back
pub const GREETING_HTML: &str = "<html><body><h1>hello java</h1></body></html>";

/// Value of the `Server` header
pub const SERVER_NAME: &str = "HTTP server/0.1";

const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Produces the response for one method
pub trait ResponseBuilder: Send + Sync {
    /// Method name this builder is registered under
    fn method(&self) -> &'static str;

    /// Build the response for `request`
    fn build(&self, request: &Request) -> Response;
}

/// `echo <value>` → `<value>`
#[derive(Debug, Clone, Copy, Default)]
pub struct Echo;

impl ResponseBuilder for Echo {
    fn method(&self) -> &'static str {
        "echo"
    }

    fn build(&self, request: &Request) -> Response {
        Response::ok(request.value.as_bytes())
    }
}

/// `time [pattern]` → current local time
///
/// The value, when present, is a strftime pattern. An unusable pattern
/// falls back to `%Y-%m-%d %H:%M:%S`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Time;

impl Time {
    fn render(pattern: &str) -> Option<String> {
        let mut out = String::new();
        // DelayedFormat reports bad specifiers as fmt::Error instead of panicking here
        write!(out, "{}", Local::now().format(pattern)).ok()?;
        Some(out)
    }
}

impl ResponseBuilder for Time {
    fn method(&self) -> &'static str {
        "time"
    }

    fn build(&self, request: &Request) -> Response {
        let pattern = if request.value.is_empty() {
            DEFAULT_TIME_FORMAT
        } else {
            request.value.as_str()
        };

        let now = Self::render(pattern)
            .or_else(|| Self::render(DEFAULT_TIME_FORMAT))
            .unwrap_or_default();

        Response::ok(now)
    }
}

/// The fixed HTML page served by the HTTP responder
///
/// Ignores the request entirely.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlGreeting;

impl ResponseBuilder for HtmlGreeting {
    fn method(&self) -> &'static str {
        "GET"
    }

    fn build(&self, _request: &Request) -> Response {
        Response::ok(GREETING_HTML)
            .with_header("Server", SERVER_NAME)
            .with_header("Content-type", "text/html; charset=UTF-8")
            .with_header("Connection", "Closed")
    }
}
