//! Codec Tests
//!
//! Tests for line framing, HTTP head reading and response encoding.

use std::io::Cursor;

use socketz::config::ContentLengthStyle;
use socketz::protocol::{
    encode_http_response, encode_line_response, read_http_head, read_line, write_all_flush,
    LineEnding, Request, Response, MAX_HEAD_LINES, MAX_LINE_LEN,
};
use socketz::registry::{HtmlGreeting, ResponseBuilder, GREETING_HTML};
use socketz::SocketzError;

// =============================================================================
// Helper Functions
// =============================================================================

fn cursor(bytes: &[u8]) -> Cursor<Vec<u8>> {
    Cursor::new(bytes.to_vec())
}

fn greeting() -> Response {
    HtmlGreeting.build(&Request::new("GET", "/"))
}

// =============================================================================
// Line Reading Tests
// =============================================================================

#[test]
fn test_read_line_lf() {
    let mut input = cursor(b"hello\n");
    let line = read_line(&mut input).unwrap().unwrap();

    assert_eq!(line.text, "hello");
    assert_eq!(line.ending, LineEnding::Lf);
}

#[test]
fn test_read_line_crlf() {
    let mut input = cursor(b"echo hi\r\n");
    let line = read_line(&mut input).unwrap().unwrap();

    assert_eq!(line.text, "echo hi");
    assert_eq!(line.ending, LineEnding::CrLf);
}

#[test]
fn test_read_line_sequence_then_eof() {
    let mut input = cursor(b"one\r\ntwo\nthree");

    assert_eq!(read_line(&mut input).unwrap().unwrap().text, "one");
    assert_eq!(read_line(&mut input).unwrap().unwrap().text, "two");

    let last = read_line(&mut input).unwrap().unwrap();
    assert_eq!(last.text, "three");
    assert_eq!(last.ending, LineEnding::Eof);

    assert!(read_line(&mut input).unwrap().is_none());
}

#[test]
fn test_read_line_empty_stream() {
    let mut input = cursor(b"");
    assert!(read_line(&mut input).unwrap().is_none());
}

#[test]
fn test_read_line_blank_line() {
    let mut input = cursor(b"\r\n");
    let line = read_line(&mut input).unwrap().unwrap();

    assert_eq!(line.text, "");
    assert_eq!(line.ending, LineEnding::CrLf);
}

#[test]
fn test_read_line_non_ascii() {
    let mut input = cursor("echo 엔에이치엔아카데미\n".as_bytes());
    let line = read_line(&mut input).unwrap().unwrap();

    assert_eq!(line.text, "echo 엔에이치엔아카데미");
}

#[test]
fn test_read_line_invalid_utf8_is_replaced() {
    let mut input = cursor(b"\xffabc\n");
    let line = read_line(&mut input).unwrap().unwrap();

    assert_eq!(line.text, "\u{FFFD}abc");
}

#[test]
fn test_read_line_at_limit() {
    let mut bytes = vec![b'a'; MAX_LINE_LEN];
    bytes.extend_from_slice(b"\r\n");
    let mut input = Cursor::new(bytes);

    let line = read_line(&mut input).unwrap().unwrap();
    assert_eq!(line.text.len(), MAX_LINE_LEN);
}

#[test]
fn test_read_line_too_long() {
    let mut input = Cursor::new(vec![b'a'; MAX_LINE_LEN + 10]);

    match read_line(&mut input) {
        Err(SocketzError::Protocol(msg)) => assert!(msg.contains("exceeds")),
        other => panic!("Expected protocol error, got {:?}", other),
    }
}

#[test]
fn test_read_line_too_long_with_terminator() {
    let mut bytes = vec![b'a'; MAX_LINE_LEN + 1];
    bytes.push(b'\n');
    let mut input = Cursor::new(bytes);

    assert!(matches!(read_line(&mut input), Err(SocketzError::Protocol(_))));
}

// =============================================================================
// HTTP Head Tests
// =============================================================================

#[test]
fn test_read_http_head_complete() {
    let mut input = cursor(b"GET / HTTP/1.0\r\nHost: localhost\r\nAccept: */*\r\n\r\nbody");
    let head = read_http_head(&mut input).unwrap();

    assert!(head.complete);
    assert_eq!(head.request_line(), Some("GET / HTTP/1.0"));
    assert_eq!(head.lines.len(), 3);
    assert_eq!(
        head.concatenated(),
        "GET / HTTP/1.0Host: localhostAccept: */*"
    );
}

#[test]
fn test_read_http_head_minimal() {
    let mut input = cursor(b"GET / HTTP/1.0\r\n\r\n");
    let head = read_http_head(&mut input).unwrap();

    assert!(head.complete);
    assert_eq!(head.lines, vec!["GET / HTTP/1.0".to_string()]);
}

#[test]
fn test_read_http_head_eof_before_blank_line() {
    let mut input = cursor(b"GET / HTTP/1.0\r\n");
    let head = read_http_head(&mut input).unwrap();

    assert!(!head.complete);
    assert_eq!(head.request_line(), Some("GET / HTTP/1.0"));
}

#[test]
fn test_read_http_head_empty_stream() {
    let mut input = cursor(b"");
    let head = read_http_head(&mut input).unwrap();

    assert!(!head.complete);
    assert!(head.request_line().is_none());
}

#[test]
fn test_read_http_head_too_many_lines() {
    let mut raw = String::from("GET / HTTP/1.0\r\n");
    for i in 0..MAX_HEAD_LINES {
        raw.push_str(&format!("X-Header-{}: v\r\n", i));
    }
    raw.push_str("\r\n");
    let mut input = Cursor::new(raw.into_bytes());

    assert!(matches!(read_http_head(&mut input), Err(SocketzError::Protocol(_))));
}

// =============================================================================
// Line Response Encoding Tests
// =============================================================================

#[test]
fn test_encode_line_success_mirrors_ending() {
    let response = Response::ok("hello");

    assert_eq!(&encode_line_response(&response, LineEnding::Lf)[..], b"hello\n");
    assert_eq!(&encode_line_response(&response, LineEnding::CrLf)[..], b"hello\r\n");
    assert_eq!(&encode_line_response(&response, LineEnding::Eof)[..], b"hello\n");
}

#[test]
fn test_encode_line_ignores_headers() {
    let encoded = encode_line_response(&greeting(), LineEnding::Lf);

    assert_eq!(&encoded[..], format!("{}\n", GREETING_HTML).as_bytes());
}

#[test]
fn test_encode_line_empty_body() {
    let encoded = encode_line_response(&Response::ok(""), LineEnding::Lf);
    assert_eq!(&encoded[..], b"\n");
}

#[test]
fn test_encode_line_not_found() {
    let encoded = encode_line_response(&Response::not_found("nope"), LineEnding::CrLf);
    assert_eq!(&encoded[..], b"ERROR method not found: nope\r\n");
}

// =============================================================================
// HTTP Response Encoding Tests
// =============================================================================

#[test]
fn test_encode_http_greeting_legacy_exact_bytes() {
    let encoded = encode_http_response(&greeting(), ContentLengthStyle::Legacy);

    // Known deviation from HTTP/1.0 grammar: no space after the colon,
    // stray space before CRLF in Content-Length
    let expected = "HTTP/1.0 200 OK\r\n\
                    Server: HTTP server/0.1\r\n\
                    Content-type: text/html; charset=UTF-8\r\n\
                    Connection: Closed\r\n\
                    Content-Length:45 \r\n\
                    \r\n\
                    <html><body><h1>hello java</h1></body></html>";

    assert_eq!(String::from_utf8(encoded.to_vec()).unwrap(), expected);
}

#[test]
fn test_encode_http_greeting_strict() {
    let encoded = encode_http_response(&greeting(), ContentLengthStyle::Strict);
    let text = String::from_utf8(encoded.to_vec()).unwrap();

    assert!(text.contains("\r\nContent-Length: 45\r\n\r\n"));
    assert!(!text.contains("Content-Length:45 "));
}

#[test]
fn test_encode_http_content_length_counts_bytes() {
    let body = "엔에이치엔";
    let encoded = encode_http_response(&Response::ok(body), ContentLengthStyle::Legacy);
    let text = String::from_utf8(encoded.to_vec()).unwrap();

    assert!(text.contains(&format!("Content-Length:{} \r\n", body.len())));
    assert!(text.ends_with(body));
}

#[test]
fn test_encode_http_preserves_header_order() {
    let response = Response::ok("x")
        .with_header("B", "2")
        .with_header("A", "1")
        .with_header("C", "3");
    let encoded = encode_http_response(&response, ContentLengthStyle::Strict);
    let text = String::from_utf8(encoded.to_vec()).unwrap();

    let b = text.find("B: 2").unwrap();
    let a = text.find("A: 1").unwrap();
    let c = text.find("C: 3").unwrap();
    assert!(b < a && a < c);
}

#[test]
fn test_encode_http_not_found() {
    let encoded = encode_http_response(&Response::not_found("PUT"), ContentLengthStyle::Legacy);
    let text = String::from_utf8(encoded.to_vec()).unwrap();

    assert!(text.starts_with("HTTP/1.0 404 Not Found\r\n"));
    assert!(text.ends_with("\r\n\r\nmethod not found: PUT"));
}

// =============================================================================
// Stream Helper Tests
// =============================================================================

#[test]
fn test_write_all_flush() {
    let mut out = Vec::new();
    write_all_flush(&mut out, b"abc\n").unwrap();

    assert_eq!(out, b"abc\n");
}
