// Common test utilities to reduce code duplication

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use switchyard::application::handler::health_handler::HEALTH_PATH;
use switchyard::application::handler::{ErrorPageHandler, HealthHandler};
use switchyard::application::server::Server;

/// Server with the health route and the "unknown request" fallback
pub fn baseline_server() -> Server {
    let mut server = Server::new();
    server.route(HEALTH_PATH, "GET", HealthHandler::handler()).unwrap();
    server.not_found(ErrorPageHandler::handler()).unwrap();
    server
}

/// Start `server` on an OS-assigned loopback port and return its address
#[allow(dead_code)]
pub fn start(server: &mut Server) -> SocketAddr {
    server.start("127.0.0.1", 0, 2).unwrap();
    server.local_addr().unwrap()
}

/// Send raw bytes and read until the server closes the connection
pub fn send_raw(addr: SocketAddr, request: &[u8]) -> String {
    let mut stream = TcpStream::connect(addr).expect("Failed to connect to server");
    stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();

    stream.write_all(request).unwrap();
    stream.flush().unwrap();

    let mut response = Vec::new();
    let _ = stream.read_to_end(&mut response);
    String::from_utf8_lossy(&response).into_owned()
}

/// Send a bodyless request with `Connection: close`
#[allow(dead_code)] // Not every test binary issues plain requests
pub fn send_request(addr: SocketAddr, method: &str, path: &str) -> String {
    let request = format!(
        "{} {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        method, path
    );
    send_raw(addr, request.as_bytes())
}

/// Part of a response after the blank line
#[allow(dead_code)]
pub fn body_of(response: &str) -> &str {
    response.split_once("\r\n\r\n").map(|(_, body)| body).unwrap_or("")
}

#[allow(dead_code)]
pub fn status_line(response: &str) -> &str {
    response.lines().next().unwrap_or("")
}
