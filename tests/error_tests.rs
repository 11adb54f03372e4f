// Error handling tests - verify failures are answered, never left hanging

use switchyard::application::handler::RequestContext;
use switchyard::application::server::Server;
use switchyard::core::net::{Outcome, TransportOptions};
use switchyard::http::StatusCode;

mod common;
use common::{baseline_server, body_of, send_raw, send_request, start, status_line};

#[test]
fn test_panicking_handler_answers_500() {
    let mut server = baseline_server();
    server
        .route("/boom", "GET", |_: &RequestContext<'_>| -> Outcome { panic!("handler exploded") })
        .unwrap();
    let addr = start(&mut server);

    let response = send_request(addr, "GET", "/boom");
    assert_eq!(status_line(&response), "HTTP/1.1 500 Internal Server Error");
    assert_eq!(body_of(&response), "internal server error");

    // Later requests are still served
    assert_eq!(status_line(&send_request(addr, "GET", "/health")), "HTTP/1.1 200 OK");
}

#[test]
fn test_handler_without_response_answers_500() {
    let mut server = Server::new();
    server
        .route("/quiet", "GET", |_: &RequestContext<'_>| Outcome::Proceed)
        .unwrap();
    let addr = start(&mut server);

    let response = send_request(addr, "GET", "/quiet");
    assert_eq!(status_line(&response), "HTTP/1.1 500 Internal Server Error");
}

#[test]
fn test_abort_closes_without_response() {
    let mut server = Server::new();
    server
        .route("/drop", "GET", |_: &RequestContext<'_>| Outcome::Abort)
        .unwrap();
    let addr = start(&mut server);

    assert_eq!(send_request(addr, "GET", "/drop"), "");
}

#[test]
fn test_malformed_request_line() {
    let mut server = baseline_server();
    let addr = start(&mut server);

    let response = send_raw(addr, b"INVALID\r\n\r\n");
    assert_eq!(status_line(&response), "HTTP/1.1 400 Bad Request");
}

#[test]
fn test_invalid_content_length() {
    let mut server = baseline_server();
    let addr = start(&mut server);

    let response = send_raw(addr, b"POST /health HTTP/1.1\r\nContent-Length: abc\r\n\r\n");
    assert_eq!(status_line(&response), "HTTP/1.1 400 Bad Request");
}

#[test]
fn test_unsupported_transfer_encoding_rejected() {
    let mut server = baseline_server();
    let addr = start(&mut server);

    let response = send_raw(
        addr,
        b"POST /health HTTP/1.1\r\nTransfer-Encoding: gzip\r\n\r\n",
    );
    assert_eq!(status_line(&response), "HTTP/1.1 400 Bad Request");
    assert_eq!(response.matches("HTTP/1.1").count(), 1);
}

#[test]
fn test_oversized_body_rejected() {
    let mut server = Server::with_options(TransportOptions {
        max_body_size: 16,
        ..TransportOptions::default()
    });
    server
        .route("/upload", "POST", |ctx: &RequestContext<'_>| ctx.respond(StatusCode::OK, "stored"))
        .unwrap();
    let addr = start(&mut server);

    let response = send_raw(addr, b"POST /upload HTTP/1.1\r\nContent-Length: 1000\r\n\r\n");
    assert_eq!(status_line(&response), "HTTP/1.1 413 Payload Too Large");
}

#[test]
fn test_oversized_headers_rejected() {
    let mut server = Server::with_options(TransportOptions {
        max_header_size: 64,
        ..TransportOptions::default()
    });
    let addr = start(&mut server);

    let request = format!("GET / HTTP/1.1\r\nX-Filler: {}\r\n\r\n", "a".repeat(128));
    let response = send_raw(addr, request.as_bytes());
    assert_eq!(status_line(&response), "HTTP/1.1 431 Request Header Fields Too Large");
}
