use crate::http::headers::{names as header_names, Headers};
use crate::http::parser::ParseError;
use crate::http::version::Version;

/// Request line and headers of an HTTP request.
///
/// The body is not part of the head; the connection worker streams it to the
/// request callback chunk by chunk.
#[derive(Debug, Clone)]
pub struct RequestHead {
    /// Method token exactly as received
    pub method: String,

    /// Request target (path + query string)
    pub target: String,

    /// Target path without the query string, percent-escapes decoded
    pub path: String,

    pub version: Version,

    pub headers: Headers,
}

impl RequestHead {
    /// Head for `target`; a path whose escapes do not decode to UTF-8 is
    /// kept as received
    pub fn new(method: impl Into<String>, target: impl Into<String>, version: Version) -> Self {
        let target = target.into();
        let path = decode_path(&target).unwrap_or_else(|_| raw_path(&target).to_string());

        Self {
            method: method.into(),
            target,
            path,
            version,
            headers: Headers::new(),
        }
    }

    /// Decoded path the request is routed on
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_string(&self) -> Option<&str> {
        self.target.split_once('?').map(|(_, query)| query)
    }

    /// Raw Content-Length value, if present
    pub fn content_length(&self) -> Option<&str> {
        self.headers.get(header_names::CONTENT_LENGTH)
    }

    pub fn is_chunked(&self) -> bool {
        self.headers
            .get(header_names::TRANSFER_ENCODING)
            .and_then(|v| v.rsplit(',').next())
            .map(|last| last.trim().eq_ignore_ascii_case("chunked"))
            .unwrap_or(false)
    }

    /// HEAD responses carry headers only
    pub fn is_head(&self) -> bool {
        self.method.eq_ignore_ascii_case("HEAD")
    }

    pub fn should_keep_alive(&self) -> bool {
        match self.headers.get(header_names::CONNECTION) {
            Some(conn) if conn.eq_ignore_ascii_case("close") => false,
            Some(conn) if conn.eq_ignore_ascii_case("keep-alive") => true,
            _ => self.version.keeps_alive_by_default(),
        }
    }
}

fn raw_path(target: &str) -> &str {
    match target.split_once('?') {
        Some((path, _)) => path,
        None => target,
    }
}

/// Path part of `target` with percent-escapes decoded
pub fn decode_path(target: &str) -> Result<String, ParseError> {
    let raw = raw_path(target);
    urlencoding::decode(raw)
        .map(|path| path.into_owned())
        .map_err(|_| ParseError::Malformed(format!("path does not decode to UTF-8: {}", raw)))
}
