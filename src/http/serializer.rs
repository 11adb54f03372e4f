use crate::common::constants::CRLF;
use crate::http::response::Response;
use crate::http::version::Version;

/// Serialize HTTP responses to wire bytes
pub struct ResponseSerializer;

impl ResponseSerializer {
    fn status_line(version: Version, response: &Response) -> String {
        format!(
            "{} {} {}{}",
            version,
            response.status,
            response.status.reason_phrase(),
            CRLF
        )
    }

    /// Serialize a finalized response: status line, headers, blank line, body
    pub fn serialize(version: Version, response: &Response) -> Vec<u8> {
        let mut buffer = Self::serialize_head(version, response);
        if response.has_body() {
            buffer.extend_from_slice(&response.body);
        }
        buffer
    }

    /// Status line and headers only, as sent in answer to a HEAD request.
    /// `Content-Length` still describes the omitted body.
    pub fn serialize_head(version: Version, response: &Response) -> Vec<u8> {
        format!(
            "{}{}{}",
            Self::status_line(version, response),
            response.headers,
            CRLF
        )
        .into_bytes()
    }

    /// Interim response sent to clients waiting on `Expect: 100-continue`
    pub fn continue_interim(version: Version) -> Vec<u8> {
        format!("{} 100 Continue{}{}", version, CRLF, CRLF).into_bytes()
    }
}
