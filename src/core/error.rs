//! Unified error handling for weft
//!
//! Errors are plain data tagged with an HTTP status code. They travel up the
//! controller tree through `HttpResult` until a composing controller absorbs
//! them or the transport driver renders them as a terminal error page.

use std::fmt;

/// An HTTP-status-tagged error.
///
/// The description defaults from a static code-to-reason table when a
/// constructor like [`HttpError::from_status`] is used. `headers` are extra
/// response headers to emit when the error is rendered (e.g. `Allow` for a
/// 405), `message` is an internal detail that is logged but never shown to
/// the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    status: u16,
    description: String,
    headers: Vec<(String, String)>,
    message: Option<String>,
}

impl HttpError {
    pub fn new(status: u16, description: impl Into<String>) -> Self {
        Self {
            status,
            description: description.into(),
            headers: Vec::new(),
            message: None,
        }
    }

    /// Build an error with the canonical description for `status`.
    pub fn from_status(status: u16) -> Self {
        Self::new(status, canonical_description(status))
    }

    pub fn unauthorized() -> Self {
        Self::from_status(401)
    }

    pub fn forbidden() -> Self {
        Self::from_status(403)
    }

    pub fn not_found() -> Self {
        Self::from_status(404)
    }

    pub fn method_not_allowed() -> Self {
        Self::from_status(405)
    }

    pub fn server_error() -> Self {
        Self::from_status(500)
    }

    /// Synthesized by the driver when a controller reports success without
    /// ever finishing the response.
    pub fn upstream_incomplete() -> Self {
        Self::from_status(504)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status, self.description)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for HttpError {}

/// Result type alias for controller operations
pub type HttpResult<T> = std::result::Result<T, HttpError>;

/// Canonical reason phrase for an HTTP status code.
///
/// Falls back to `"Error"` for codes outside the table so that every error
/// always carries a human-readable description.
pub fn canonical_description(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        409 => "Conflict",
        410 => "Gone",
        411 => "Length Required",
        413 => "Payload Too Large",
        415 => "Unsupported Media Type",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "Error",
    }
}

/// Helper trait for converting foreign errors into server errors with context
pub trait ErrorContext<T> {
    fn or_server_error(self, context: &str) -> HttpResult<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: fmt::Display,
{
    fn or_server_error(self, context: &str) -> HttpResult<T> {
        self.map_err(|e| HttpError::server_error().with_message(format!("{context}: {e}")))
    }
}
