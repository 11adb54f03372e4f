use crate::common::constants::DEFAULT_BUFFER_SIZE;
use crate::common::error::{Result, ServerError};
use crate::core::net::callback::{Outcome, RawRequest, RequestCallback, UploadCursor};
use crate::core::net::daemon::TransportOptions;
use crate::http::parser::{BodyEvent, BodyFraming, ParseError, RequestParser};
use crate::http::request::RequestHead;
use crate::http::response::Response;
use crate::http::serializer::ResponseSerializer;
use crate::http::status::StatusCode;
use crate::http::version::Version;
use std::cell::{Cell, RefCell};
use std::io::{ErrorKind, Read, Write};
use std::net::{Ipv4Addr, Shutdown, SocketAddr, TcpStream};
use tracing::{debug, warn};

/// Handle for the connection a request arrived on.
///
/// Lives on the connection's worker thread; handlers reach it through the
/// request context and queue their response here.
pub struct Connection {
    id: u64,
    peer_addr: SocketAddr,
    queued: RefCell<Option<Response>>,
}

impl Connection {
    pub fn new(id: u64, peer_addr: SocketAddr) -> Self {
        Self {
            id,
            peer_addr,
            queued: RefCell::new(None),
        }
    }

    /// A handle with no socket behind it, for driving callbacks directly
    pub fn detached() -> Self {
        Self::new(0, SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)))
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Queue a status and body as the response to the current request
    pub fn queue_response(&self, status: StatusCode, body: impl Into<Vec<u8>>) -> Outcome {
        self.queue(Response::with_body(status, body))
    }

    /// Queue a fully built response. Only one response per request is
    /// accepted; later attempts return `Abort`.
    pub fn queue(&self, response: Response) -> Outcome {
        let mut queued = self.queued.borrow_mut();
        if queued.is_some() {
            warn!(connection = self.id, "response already queued for this request");
            return Outcome::Abort;
        }
        *queued = Some(response);
        Outcome::Proceed
    }

    pub fn has_queued_response(&self) -> bool {
        self.queued.borrow().is_some()
    }

    pub fn take_response(&self) -> Option<Response> {
        self.queued.borrow_mut().take()
    }
}

/// Body bytes delivered to the callback but not yet consumed by it
struct UploadWindow {
    pending: Vec<u8>,
    /// Body position of `pending[0]`
    offset: usize,
    total: Option<usize>,
}

impl UploadWindow {
    fn new(total: Option<usize>) -> Self {
        Self {
            pending: Vec::new(),
            offset: 0,
            total,
        }
    }

    fn push(&mut self, data: &[u8]) {
        self.pending.extend_from_slice(data);
    }

    fn advance(&mut self, consumed: usize) {
        let consumed = consumed.min(self.pending.len());
        self.pending.drain(..consumed);
        self.offset += consumed;
    }
}

/// Serves one accepted socket: parses requests in arrival order, feeds them
/// to the callback and writes the queued responses back.
pub(crate) struct ConnectionWorker<'a> {
    stream: TcpStream,
    connection: Connection,
    parser: RequestParser,
    callback: &'a dyn RequestCallback,
    read_buf: Vec<u8>,
}

impl<'a> ConnectionWorker<'a> {
    pub(crate) fn new(
        stream: TcpStream,
        connection: Connection,
        callback: &'a dyn RequestCallback,
        options: &TransportOptions,
    ) -> Result<Self> {
        stream.set_read_timeout(options.read_timeout)?;
        stream.set_write_timeout(options.write_timeout)?;
        stream.set_nodelay(true)?;

        Ok(Self {
            stream,
            connection,
            parser: RequestParser::new(options.max_header_size, options.max_body_size),
            callback,
            read_buf: vec![0u8; DEFAULT_BUFFER_SIZE],
        })
    }

    pub(crate) fn run(mut self) -> Result<()> {
        loop {
            let (head, framing) = match self.read_head() {
                Ok(Some(parsed)) => parsed,
                Ok(None) => return Ok(()),
                Err(ServerError::Http(e)) => return self.reject(Version::Http11, &e),
                Err(e) => return Err(e),
            };

            if !self.serve(&head, framing)? {
                let _ = self.stream.shutdown(Shutdown::Both);
                return Ok(());
            }
            self.parser.next_request();
        }
    }

    /// Handle one request; returns whether the connection stays open
    fn serve(&mut self, head: &RequestHead, framing: BodyFraming) -> Result<bool> {
        let total = match framing {
            BodyFraming::Empty => Some(0),
            BodyFraming::Length(n) => Some(n),
            BodyFraming::Chunked => None,
        };
        let expects_continue = head
            .headers
            .get("Expect")
            .map(|v| v.eq_ignore_ascii_case("100-continue"))
            .unwrap_or(false);
        let mut sent_continue = false;
        let mut window = UploadWindow::new(total);

        if framing != BodyFraming::Empty {
            // First call carries only what is already buffered
            match self.parser.next_body_chunk() {
                Ok(BodyEvent::Data(data)) => window.push(&data),
                Ok(_) => {}
                Err(e) => return self.reject(head.version, &e).map(|_| false),
            }
            if !self.deliver(head, &mut window, false) {
                return Ok(false);
            }

            while !self.connection.has_queued_response() && !self.parser.is_body_complete() {
                if expects_continue && !sent_continue {
                    self.stream
                        .write_all(&ResponseSerializer::continue_interim(head.version))?;
                    sent_continue = true;
                }

                let data = match self.read_body_chunk() {
                    Ok(Some(data)) => data,
                    Ok(None) => return Ok(false),
                    Err(ServerError::Http(e)) => return self.reject(head.version, &e).map(|_| false),
                    Err(e) => return Err(e),
                };
                if data.is_empty() {
                    break;
                }
                window.push(&data);
                if !self.deliver(head, &mut window, false) {
                    return Ok(false);
                }
            }
        }

        // The final call carries whatever the handler left unconsumed
        if !self.connection.has_queued_response() && !self.deliver(head, &mut window, true) {
            return Ok(false);
        }

        let mut response = match self.connection.take_response() {
            Some(response) => response,
            None => {
                warn!(
                    connection = self.connection.id(),
                    path = head.path(),
                    "request callback queued no response"
                );
                Response::internal_error()
            }
        };

        // A client still waiting for 100-continue will never send the body
        let mut keep_alive = head.should_keep_alive();
        if !self.parser.is_body_complete() {
            keep_alive = keep_alive && !(expects_continue && !sent_continue) && self.discard_body()?;
        }

        response.finalize(head.version, keep_alive);
        let bytes = if head.is_head() {
            ResponseSerializer::serialize_head(head.version, &response)
        } else {
            ResponseSerializer::serialize(head.version, &response)
        };
        self.stream.write_all(&bytes)?;
        self.stream.flush()?;

        Ok(keep_alive)
    }

    /// Invoke the callback over the pending upload bytes and drop the ones it
    /// consumed; false means it asked for the connection to drop
    fn deliver(&self, head: &RequestHead, window: &mut UploadWindow, is_final: bool) -> bool {
        let counter = Cell::new(None);
        let cursor = UploadCursor::tracked(&window.pending, window.offset, window.total, &counter);
        if !self.invoke(head, cursor, is_final) {
            return false;
        }
        let consumed = cursor.consumed();
        window.advance(consumed);
        true
    }

    /// Run the callback once; false means it asked for the connection to drop
    fn invoke(&self, head: &RequestHead, upload: UploadCursor<'_>, is_final: bool) -> bool {
        let request = RawRequest {
            path: head.path(),
            method: &head.method,
            version: head.version,
            headers: &head.headers,
            upload,
            is_final,
        };

        match self.callback.on_request(&self.connection, &request) {
            Outcome::Proceed => true,
            Outcome::Abort => {
                debug!(connection = self.connection.id(), "callback aborted connection");
                false
            }
        }
    }

    fn read_head(&mut self) -> Result<Option<(RequestHead, BodyFraming)>> {
        loop {
            if let Some(parsed) = self.parser.parse_head()? {
                return Ok(Some(parsed));
            }
            if !self.fill()? {
                return Ok(None);
            }
        }
    }

    /// Next body chunk, blocking for more bytes. `Some(empty)` marks the end
    /// of the body, `None` a peer that went away mid-body.
    fn read_body_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        loop {
            match self.parser.next_body_chunk()? {
                BodyEvent::Data(data) => return Ok(Some(data)),
                BodyEvent::Complete => return Ok(Some(Vec::new())),
                BodyEvent::NeedMore => {
                    if !self.fill()? {
                        return Ok(None);
                    }
                }
            }
        }
    }

    /// Consume the unread rest of the body; false if it could not be finished
    fn discard_body(&mut self) -> Result<bool> {
        loop {
            match self.read_body_chunk() {
                Ok(Some(data)) if data.is_empty() => return Ok(true),
                Ok(Some(_)) => {}
                Ok(None) | Err(ServerError::Http(_)) => return Ok(false),
                Err(e) => return Err(e),
            }
        }
    }

    /// Read more bytes into the parser; false on end of stream or idle timeout
    fn fill(&mut self) -> Result<bool> {
        loop {
            match self.stream.read(&mut self.read_buf) {
                Ok(0) => return Ok(false),
                Ok(n) => {
                    self.parser.add_data(&self.read_buf[..n]);
                    return Ok(true);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    debug!(connection = self.connection.id(), "read timed out");
                    return Ok(false);
                }
                Err(e) => return Err(ServerError::Io(e)),
            }
        }
    }

    /// Answer a protocol error and close
    fn reject(&mut self, version: Version, err: &ParseError) -> Result<()> {
        debug!(connection = self.connection.id(), error = %err, "rejecting request");
        let mut response = Response::with_body(err.status(), err.to_string());
        response.finalize(version, false);
        self.stream
            .write_all(&ResponseSerializer::serialize(version, &response))?;
        let _ = self.stream.shutdown(Shutdown::Both);
        Ok(())
    }
}
