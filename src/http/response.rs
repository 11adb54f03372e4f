use crate::common::constants::SERVER_NAME;
use crate::http::headers::{names as header_names, Headers};
use crate::http::status::StatusCode;
use crate::http::version::Version;

/// HTTP response queued on a connection
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,

    pub headers: Headers,

    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: StatusCode) -> Self {
        let mut headers = Headers::new();
        headers.set(header_names::SERVER, SERVER_NAME);

        Self {
            status,
            headers,
            body: Vec::new(),
        }
    }

    pub fn with_body(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        let mut response = Self::new(status);
        response.set_body(body);
        response
    }

    pub fn ok() -> Self {
        Self::new(StatusCode::OK)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND)
    }

    pub fn internal_error() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn set_content_type(&mut self, content_type: &str) {
        self.headers.set(header_names::CONTENT_TYPE, content_type);
    }

    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
    }

    /// Whether the body bytes go on the wire
    pub fn has_body(&self) -> bool {
        self.status.allows_body() && !self.body.is_empty()
    }

    /// Stamp the framing headers right before serialization
    pub fn finalize(&mut self, version: Version, keep_alive: bool) {
        if self.status.allows_body() {
            self.headers
                .set(header_names::CONTENT_LENGTH, self.body.len().to_string());
        } else {
            self.headers.remove(header_names::CONTENT_LENGTH);
        }

        match (version, keep_alive) {
            (_, false) => self.headers.set(header_names::CONNECTION, "close"),
            (Version::Http10, true) => self.headers.set(header_names::CONNECTION, "keep-alive"),
            (Version::Http11, true) => self.headers.remove(header_names::CONNECTION),
        }
    }
}
