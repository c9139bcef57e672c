//! Inbound request abstraction
//!
//! A thin, owned view over the transport's request: method, path, headers
//! and a fully buffered body. Controllers read from it; only the routing
//! components consume path state, and they do that through the context's
//! `remaining_path`, never by mutating the request itself.

use bytes::Bytes;
use http::{HeaderMap, Method, Version};

pub struct Request {
    method: Method,
    path: String,
    version: Version,
    headers: HeaderMap,
    body: Bytes,
}

impl Request {
    pub fn new(
        method: Method,
        path: impl Into<String>,
        version: Version,
        headers: HeaderMap,
        body: Bytes,
    ) -> Self {
        Self {
            method,
            path: path.into(),
            version,
            headers,
            body,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The original request path, untouched by routing.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a header value as a string slice, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup() {
        let mut headers = HeaderMap::new();
        headers.insert("host", "example.com".parse().unwrap());

        let req = Request::new(
            Method::GET,
            "/foo",
            Version::HTTP_11,
            headers,
            Bytes::new(),
        );
        assert_eq!(req.header("host"), Some("example.com"));
        assert_eq!(req.header("x-missing"), None);
        assert_eq!(req.path(), "/foo");
    }
}
