use crate::core::net::callback::{Outcome, RawRequest, UploadCursor};
use crate::core::net::connection::Connection;
use crate::http::headers::Headers;
use crate::http::response::Response;
use crate::http::status::StatusCode;
use crate::http::version::Version;

/// Everything a handler sees for one invocation.
///
/// Built fresh by the dispatcher for every callback and dropped as soon as the
/// handler returns; nothing in it outlives the request.
#[derive(Clone, Copy)]
pub struct RequestContext<'a> {
    connection: &'a Connection,
    request: RawRequest<'a>,
}

impl<'a> RequestContext<'a> {
    pub fn new(connection: &'a Connection, request: RawRequest<'a>) -> Self {
        Self { connection, request }
    }

    pub fn connection(&self) -> &'a Connection {
        self.connection
    }

    pub fn path(&self) -> &'a str {
        self.request.path
    }

    pub fn method(&self) -> &'a str {
        self.request.method
    }

    pub fn version(&self) -> Version {
        self.request.version
    }

    pub fn headers(&self) -> &'a Headers {
        self.request.headers
    }

    pub fn upload(&self) -> UploadCursor<'a> {
        self.request.upload
    }

    pub fn is_final(&self) -> bool {
        self.request.is_final
    }

    pub fn respond(&self, status: StatusCode, body: impl Into<Vec<u8>>) -> Outcome {
        self.connection.queue_response(status, body)
    }

    pub fn respond_with(&self, response: Response) -> Outcome {
        self.connection.queue(response)
    }
}
