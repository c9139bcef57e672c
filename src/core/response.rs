//! Deferred-head response buffer
//!
//! Status and headers stay mutable until the first body byte is written;
//! the first `write` (or `end`) irrevocably freezes them. Any later attempt
//! to touch the head is a programming error and fails with a 500-class
//! `HttpError` rather than silently doing nothing.

use bytes::{Bytes, BytesMut};
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode};

use super::error::{HttpError, HttpResult};

pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: BytesMut,
    head_sent: bool,
    finished: bool,
}

impl Response {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: BytesMut::new(),
            head_sent: false,
            finished: false,
        }
    }

    fn ensure_head_open(&self) -> HttpResult<()> {
        if self.head_sent {
            return Err(HttpError::server_error()
                .with_message("response head modified after first body write"));
        }
        Ok(())
    }

    pub fn set_status(&mut self, status: u16) -> HttpResult<()> {
        self.ensure_head_open()?;
        self.status = StatusCode::from_u16(status)
            .map_err(|_| HttpError::server_error().with_message(format!("invalid status code {status}")))?;
        Ok(())
    }

    pub fn insert_header(&mut self, name: &str, value: &str) -> HttpResult<()> {
        self.ensure_head_open()?;
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| HttpError::server_error().with_message(format!("invalid header name {name:?}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| HttpError::server_error().with_message(format!("invalid header value for {name}")))?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// Append a body chunk. The first call flushes the buffered head.
    pub fn write(&mut self, chunk: &[u8]) {
        self.head_sent = true;
        self.body.extend_from_slice(chunk);
    }

    /// Mark the response finished. Also flushes the head, so an empty-body
    /// response still commits its status and headers.
    pub fn end(&mut self) {
        self.head_sent = true;
        self.finished = true;
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn head_sent(&self) -> bool {
        self.head_sent
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn into_parts(self) -> (StatusCode, HeaderMap, Bytes) {
        (self.status, self.headers, self.body.freeze())
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}
