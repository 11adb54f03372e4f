use crate::common::buffer::Buffer;
use crate::common::constants::{CRLF_BYTES, HEAD_TERMINATOR};
use crate::http::headers::Headers;
use crate::http::headers::names as header_names;
use crate::http::request::{decode_path, RequestHead};
use crate::http::status::StatusCode;
use crate::http::version::Version;
use std::str;
use std::str::FromStr;

// Chunk-size lines longer than this are treated as garbage
const MAX_CHUNK_LINE: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Malformed request: {0}")]
    Malformed(String),

    #[error("Request head exceeds {0} bytes")]
    HeadTooLarge(usize),

    #[error("Request body exceeds {0} bytes")]
    BodyTooLarge(usize),
}

impl ParseError {
    /// Status the connection answers with before closing
    pub fn status(&self) -> StatusCode {
        match self {
            ParseError::Malformed(_) => StatusCode::BAD_REQUEST,
            ParseError::HeadTooLarge(_) => StatusCode::HEADER_FIELDS_TOO_LARGE,
            ParseError::BodyTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }
}

/// How the body following a request head is delimited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFraming {
    Empty,
    Length(usize),
    Chunked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyEvent {
    Data(Vec<u8>),
    NeedMore,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    Head,
    Length { remaining: usize },
    ChunkSize,
    ChunkData { remaining: usize },
    ChunkDataEnd,
    Trailers,
    Done,
}

/// Incremental HTTP/1.x request parser.
///
/// `parse_head` yields the request line and headers; the body is then pulled
/// piecewise through `next_body_chunk` so it can be handed on as it arrives.
pub struct RequestParser {
    state: ParseState,
    buffer: Buffer,
    max_header_size: usize,
    max_body_size: usize,
    body_received: usize,
}

impl RequestParser {
    pub fn new(max_header_size: usize, max_body_size: usize) -> Self {
        Self {
            state: ParseState::Head,
            buffer: Buffer::new(),
            max_header_size,
            max_body_size,
            body_received: 0,
        }
    }

    pub fn add_data(&mut self, data: &[u8]) {
        self.buffer.extend(data);
    }

    /// Bytes received but not yet consumed
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Parse the request head once it is fully buffered
    pub fn parse_head(&mut self) -> Result<Option<(RequestHead, BodyFraming)>, ParseError> {
        if self.state != ParseState::Head {
            return Ok(None);
        }

        // Stray CRLFs between pipelined requests are ignored
        while self.buffer.find(CRLF_BYTES) == Some(0) {
            self.buffer.skip(CRLF_BYTES.len());
        }

        let end = match self.buffer.find(HEAD_TERMINATOR) {
            Some(pos) => pos,
            None if self.buffer.len() > self.max_header_size => {
                return Err(ParseError::HeadTooLarge(self.max_header_size));
            }
            None => return Ok(None),
        };

        if end + HEAD_TERMINATOR.len() > self.max_header_size {
            return Err(ParseError::HeadTooLarge(self.max_header_size));
        }

        let raw = self.buffer.drain(end + HEAD_TERMINATOR.len());
        let text = str::from_utf8(&raw[..end])
            .map_err(|e| ParseError::Malformed(format!("invalid UTF-8 in request head: {}", e)))?;

        let mut lines = text.split("\r\n");
        let mut head = parse_request_line(lines.next().unwrap_or_default())?;
        head.headers = Headers::from_lines(lines).map_err(|e| ParseError::Malformed(e.to_string()))?;

        let framing = self.framing_for(&head)?;
        self.body_received = 0;
        self.state = match framing {
            BodyFraming::Empty => ParseState::Done,
            BodyFraming::Length(remaining) => ParseState::Length { remaining },
            BodyFraming::Chunked => ParseState::ChunkSize,
        };

        Ok(Some((head, framing)))
    }

    fn framing_for(&self, head: &RequestHead) -> Result<BodyFraming, ParseError> {
        if head.is_chunked() {
            return Ok(BodyFraming::Chunked);
        }

        // Without chunked as the final coding the body length is unknowable
        if let Some(codings) = head.headers.get(header_names::TRANSFER_ENCODING) {
            return Err(ParseError::Malformed(format!(
                "unsupported Transfer-Encoding: {}",
                codings
            )));
        }

        let mut lengths = head.headers.get_all("Content-Length");
        let length = match lengths.next() {
            Some(value) => value
                .parse::<usize>()
                .map_err(|_| ParseError::Malformed(format!("invalid Content-Length: {}", value)))?,
            None => return Ok(BodyFraming::Empty),
        };

        if lengths.any(|other| other.parse::<usize>() != Ok(length)) {
            return Err(ParseError::Malformed("conflicting Content-Length headers".to_string()));
        }

        if length > self.max_body_size {
            return Err(ParseError::BodyTooLarge(self.max_body_size));
        }

        Ok(match length {
            0 => BodyFraming::Empty,
            n => BodyFraming::Length(n),
        })
    }

    /// Pull the next piece of body data out of the buffer
    pub fn next_body_chunk(&mut self) -> Result<BodyEvent, ParseError> {
        loop {
            match self.state {
                ParseState::Head | ParseState::Done => return Ok(BodyEvent::Complete),

                ParseState::Length { remaining } => {
                    if self.buffer.is_empty() {
                        return Ok(BodyEvent::NeedMore);
                    }
                    let data = self.buffer.drain(remaining);
                    self.body_received += data.len();
                    let remaining = remaining - data.len();
                    self.state = if remaining == 0 {
                        ParseState::Done
                    } else {
                        ParseState::Length { remaining }
                    };
                    return Ok(BodyEvent::Data(data));
                }

                ParseState::ChunkSize => {
                    let line = match self.take_line()? {
                        Some(line) => line,
                        None => return Ok(BodyEvent::NeedMore),
                    };
                    let size_str = line.split(';').next().unwrap_or_default().trim();
                    let size = usize::from_str_radix(size_str, 16)
                        .map_err(|_| ParseError::Malformed(format!("invalid chunk size: {}", size_str)))?;

                    if size == 0 {
                        self.state = ParseState::Trailers;
                    } else if self.body_received.saturating_add(size) > self.max_body_size {
                        return Err(ParseError::BodyTooLarge(self.max_body_size));
                    } else {
                        self.state = ParseState::ChunkData { remaining: size };
                    }
                }

                ParseState::ChunkData { remaining } => {
                    if self.buffer.is_empty() {
                        return Ok(BodyEvent::NeedMore);
                    }
                    let data = self.buffer.drain(remaining);
                    self.body_received += data.len();
                    let remaining = remaining - data.len();
                    self.state = if remaining == 0 {
                        ParseState::ChunkDataEnd
                    } else {
                        ParseState::ChunkData { remaining }
                    };
                    return Ok(BodyEvent::Data(data));
                }

                ParseState::ChunkDataEnd => {
                    if self.buffer.len() < CRLF_BYTES.len() {
                        return Ok(BodyEvent::NeedMore);
                    }
                    if self.buffer.drain(CRLF_BYTES.len()) != CRLF_BYTES {
                        return Err(ParseError::Malformed("missing CRLF after chunk data".to_string()));
                    }
                    self.state = ParseState::ChunkSize;
                }

                ParseState::Trailers => match self.take_line()? {
                    Some(line) if line.is_empty() => self.state = ParseState::Done,
                    Some(_) => {}
                    None => return Ok(BodyEvent::NeedMore),
                },
            }
        }
    }

    fn take_line(&mut self) -> Result<Option<String>, ParseError> {
        match self.buffer.find(CRLF_BYTES) {
            Some(pos) => {
                let bytes = self.buffer.drain(pos + CRLF_BYTES.len());
                let line = str::from_utf8(&bytes[..pos])
                    .map_err(|_| ParseError::Malformed("invalid UTF-8 in chunk framing".to_string()))?;
                Ok(Some(line.to_string()))
            }
            None if self.buffer.len() > MAX_CHUNK_LINE => {
                Err(ParseError::Malformed("chunk framing line too long".to_string()))
            }
            None => Ok(None),
        }
    }

    /// Whether the current request's body has been fully consumed
    pub fn is_body_complete(&self) -> bool {
        matches!(self.state, ParseState::Done)
    }

    /// Prepare for the next request on the same connection, keeping any
    /// pipelined bytes already buffered
    pub fn next_request(&mut self) {
        self.state = ParseState::Head;
        self.body_received = 0;
    }
}

/// Parse request line: "METHOD /path HTTP/1.1"
fn parse_request_line(line: &str) -> Result<RequestHead, ParseError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(ParseError::Malformed(format!("invalid request line: {:?}", line)));
    }

    let method = parts[0];
    if !method.bytes().all(is_token_byte) {
        return Err(ParseError::Malformed(format!("invalid method: {}", method)));
    }

    let version = match parts.get(2) {
        Some(v) => Version::from_str(v).map_err(|e| ParseError::Malformed(e.to_string()))?,
        None => Version::Http11,
    };

    let target = parts[1];
    Ok(RequestHead {
        method: method.to_string(),
        target: target.to_string(),
        path: decode_path(target)?,
        version,
        headers: Headers::new(),
    })
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_parser() -> RequestParser {
        RequestParser::new(8192, 1024)
    }

    fn collect_body(parser: &mut RequestParser) -> Vec<u8> {
        let mut body = Vec::new();
        loop {
            match parser.next_body_chunk().unwrap() {
                BodyEvent::Data(data) => body.extend(data),
                BodyEvent::NeedMore => panic!("body incomplete"),
                BodyEvent::Complete => return body,
            }
        }
    }

    #[test]
    fn test_parse_simple_request() {
        let mut parser = new_parser();
        parser.add_data(b"GET /health?x=1 HTTP/1.1\r\nHost: localhost\r\n\r\n");
        let (head, framing) = parser.parse_head().unwrap().unwrap();
        assert_eq!(head.method, "GET");
        assert_eq!(head.path(), "/health");
        assert_eq!(head.headers.get("host"), Some("localhost"));
        assert_eq!(framing, BodyFraming::Empty);
        assert!(parser.is_body_complete());
    }

    #[test]
    fn test_partial_head_needs_more() {
        let mut parser = new_parser();
        parser.add_data(b"GET / HTTP/1.1\r\nHost: loc");
        assert!(parser.parse_head().unwrap().is_none());
        parser.add_data(b"alhost\r\n\r\n");
        assert!(parser.parse_head().unwrap().is_some());
    }

    #[test]
    fn test_lowercase_method_kept_verbatim() {
        let mut parser = new_parser();
        parser.add_data(b"get /x HTTP/1.0\r\n\r\n");
        let (head, _) = parser.parse_head().unwrap().unwrap();
        assert_eq!(head.method, "get");
        assert_eq!(head.version, Version::Http10);
    }

    #[test]
    fn test_content_length_body_in_pieces() {
        let mut parser = new_parser();
        parser.add_data(b"POST /upload HTTP/1.1\r\nContent-Length: 10\r\n\r\nhello");
        let (_, framing) = parser.parse_head().unwrap().unwrap();
        assert_eq!(framing, BodyFraming::Length(10));

        assert_eq!(parser.next_body_chunk().unwrap(), BodyEvent::Data(b"hello".to_vec()));
        assert_eq!(parser.next_body_chunk().unwrap(), BodyEvent::NeedMore);

        parser.add_data(b"worldGET");
        assert_eq!(parser.next_body_chunk().unwrap(), BodyEvent::Data(b"world".to_vec()));
        assert_eq!(parser.next_body_chunk().unwrap(), BodyEvent::Complete);
        assert_eq!(parser.buffered(), 3);
    }

    #[test]
    fn test_chunked_body() {
        let mut parser = new_parser();
        parser.add_data(
            b"POST /upload HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n\
              5\r\nhello\r\n6;ext=1\r\n world\r\n0\r\nX-Trailer: yes\r\n\r\n",
        );
        let (_, framing) = parser.parse_head().unwrap().unwrap();
        assert_eq!(framing, BodyFraming::Chunked);
        assert_eq!(collect_body(&mut parser), b"hello world".to_vec());
        assert_eq!(parser.buffered(), 0);
    }

    #[test]
    fn test_invalid_requests() {
        let mut parser = new_parser();
        parser.add_data(b"INVALID\r\n\r\n");
        assert!(matches!(parser.parse_head(), Err(ParseError::Malformed(_))));

        let mut parser = new_parser();
        parser.add_data(b"GET / HTTP/2.0\r\n\r\n");
        assert!(matches!(parser.parse_head(), Err(ParseError::Malformed(_))));

        let mut parser = new_parser();
        parser.add_data(b"G(T / HTTP/1.1\r\n\r\n");
        assert!(matches!(parser.parse_head(), Err(ParseError::Malformed(_))));

        let mut parser = new_parser();
        parser.add_data(b"POST / HTTP/1.1\r\nContent-Length: abc\r\n\r\n");
        assert!(matches!(parser.parse_head(), Err(ParseError::Malformed(_))));
    }

    #[test]
    fn test_size_limits() {
        let mut parser = RequestParser::new(32, 4);
        parser.add_data(b"GET /a-very-long-path-that-does-not-fit HTTP/1.1\r\n");
        let err = parser.parse_head().unwrap_err();
        assert_eq!(err.status(), StatusCode::HEADER_FIELDS_TOO_LARGE);

        let mut parser = RequestParser::new(8192, 4);
        parser.add_data(b"POST / HTTP/1.1\r\nContent-Length: 5\r\n\r\n");
        let err = parser.parse_head().unwrap_err();
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let mut parser = RequestParser::new(8192, 4);
        parser.add_data(b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n5\r\n");
        parser.parse_head().unwrap();
        assert_eq!(parser.next_body_chunk(), Err(ParseError::BodyTooLarge(4)));
    }

    #[test]
    fn test_pipelined_requests() {
        let mut parser = new_parser();
        parser.add_data(b"GET /a HTTP/1.1\r\n\r\n\r\nGET /b HTTP/1.1\r\n\r\n");
        let (first, _) = parser.parse_head().unwrap().unwrap();
        assert_eq!(first.path(), "/a");
        assert!(parser.parse_head().unwrap().is_none());

        parser.next_request();
        let (second, _) = parser.parse_head().unwrap().unwrap();
        assert_eq!(second.path(), "/b");
    }

    #[test]
    fn test_non_chunked_transfer_encoding_rejected() {
        let mut parser = new_parser();
        parser.add_data(b"POST / HTTP/1.1\r\nTransfer-Encoding: gzip\r\n\r\nGET /smuggled HTTP/1.1\r\n\r\n");
        let err = parser.parse_head().unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        // Chunked must come last, even alongside a Content-Length
        let mut parser = new_parser();
        parser.add_data(b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked, gzip\r\nContent-Length: 3\r\n\r\n");
        assert!(matches!(parser.parse_head(), Err(ParseError::Malformed(_))));
    }

    #[test]
    fn test_path_decoded_at_parse() {
        let mut parser = new_parser();
        parser.add_data(b"GET /%68ealth?x=1 HTTP/1.1\r\n\r\n");
        let (head, _) = parser.parse_head().unwrap().unwrap();
        assert_eq!(head.path(), "/health");
        assert_eq!(head.target, "/%68ealth?x=1");

        let mut parser = new_parser();
        parser.add_data(b"GET /%c3%28 HTTP/1.1\r\n\r\n");
        assert!(matches!(parser.parse_head(), Err(ParseError::Malformed(_))));
    }
}
