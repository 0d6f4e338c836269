//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use serde_json::Value;

use crate::method::Method;
use crate::validate::Validated;

/// An incoming HTTP request with its body fully buffered.
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
    pub(crate) validated: Option<Validated>,
}

impl Request {
    /// Builds a request for in-process dispatch through
    /// [`Router::handle`](crate::Router::handle).
    ///
    /// ```rust
    /// use vetted::{Method, Request};
    ///
    /// let req = Request::new(Method::Post, "/user", br#"{"name":"Ann"}"#.to_vec())
    ///     .with_header("content-type", "application/json");
    /// assert_eq!(req.header("Content-Type"), Some("application/json"));
    /// ```
    pub fn new(method: Method, path: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: body.into(),
            params: HashMap::new(),
            validated: None,
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub(crate) fn from_parts(
        method: Method,
        path: String,
        headers: Vec<(String, String)>,
        body: Bytes,
    ) -> Self {
        Self { method, path, headers, body, params: HashMap::new(), validated: None }
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/user/{id}`, `req.param("id")` on `/user/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Decodes the body as untyped JSON.
    pub fn json(&self) -> serde_json::Result<Value> {
        serde_json::from_slice(&self.body)
    }

    /// The inbound payload after request-schema validation.
    ///
    /// `Some` only inside a handler wrapped by
    /// [`validate_schema`](crate::middleware::validate_schema) with a request
    /// schema configured; values are already coerced to their declared types.
    pub fn validated(&self) -> Option<&Validated> {
        self.validated.as_ref()
    }
}
