use crate::core::net::connection::Connection;
use std::cell::Cell;
use crate::http::headers::Headers;
use crate::http::version::Version;

/// Result code a request callback hands back to the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Invocation succeeded; carry on serving the connection
    Proceed,
    /// Drop the connection without writing anything further
    Abort,
}

/// Window onto the request body bytes delivered in one invocation.
///
/// A handler that calls [`consume`](Self::consume) claims only that many
/// bytes; the rest is handed back, ahead of any new data, on the next
/// invocation. A handler that never calls it consumes the whole window.
#[derive(Debug, Clone, Copy)]
pub struct UploadCursor<'a> {
    data: &'a [u8],
    offset: usize,
    total: Option<usize>,
    consumed: Option<&'a Cell<Option<usize>>>,
}

impl<'a> UploadCursor<'a> {
    /// Cursor without a consumption counter; `consume` has no effect
    pub fn new(data: &'a [u8], offset: usize, total: Option<usize>) -> Self {
        Self {
            data,
            offset,
            total,
            consumed: None,
        }
    }

    /// Cursor whose consumption is recorded in `counter`, which must start
    /// as `None`
    pub fn tracked(
        data: &'a [u8],
        offset: usize,
        total: Option<usize>,
        counter: &'a Cell<Option<usize>>,
    ) -> Self {
        Self {
            consumed: Some(counter),
            ..Self::new(data, offset, total)
        }
    }

    pub fn empty(offset: usize, total: Option<usize>) -> Self {
        Self::new(&[], offset, total)
    }

    /// Bytes delivered in this invocation
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Position of `data` within the whole body
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Declared body length; `None` for chunked uploads
    pub fn total(&self) -> Option<usize> {
        self.total
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Mark `n` more bytes from the front of `data` as processed
    pub fn consume(&self, n: usize) {
        if let Some(counter) = self.consumed {
            let so_far = counter.get().unwrap_or(0);
            counter.set(Some(so_far.saturating_add(n).min(self.data.len())));
        }
    }

    /// Bytes the transport will treat as processed once the handler returns
    pub fn consumed(&self) -> usize {
        self.consumed.and_then(Cell::get).unwrap_or(self.data.len())
    }

    /// Bytes that will be delivered again on the next invocation
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.consumed()..]
    }
}

/// Per-invocation request descriptor built by the connection worker
#[derive(Debug, Clone, Copy)]
pub struct RawRequest<'a> {
    pub path: &'a str,
    pub method: &'a str,
    pub version: Version,
    pub headers: &'a Headers,
    pub upload: UploadCursor<'a>,
    /// Set on the last invocation for this request, after the whole body
    pub is_final: bool,
}

/// Target of the transport's per-request callback.
///
/// Called on the connection's own worker thread, possibly several times per
/// request while a body streams in. A response must be queued on the
/// connection no later than the final invocation.
pub trait RequestCallback: Send + Sync {
    fn on_request(&self, connection: &Connection, request: &RawRequest<'_>) -> Outcome;
}

impl<F> RequestCallback for F
where
    F: Fn(&Connection, &RawRequest<'_>) -> Outcome + Send + Sync,
{
    fn on_request(&self, connection: &Connection, request: &RawRequest<'_>) -> Outcome {
        self(connection, request)
    }
}
