//! HTTP request/response types described as plain data.
//!
//! # Design
//! `Endpoint` is what callers hand to the client: a path relative to the base
//! URL, a method, an optional body and header overrides. The client resolves
//! it into an `HttpRequest` (absolute URL, final header list) which a
//! `Transport` executes, producing an `HttpResponse`. Keeping both ends as
//! plain data lets the client's build and parse halves be tested without a
//! network.

use std::fmt;

use crate::multipart::FormData;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Serialized JSON text.
    Json(String),
    /// Fields and files encoded by the transport as multipart/form-data.
    Form(FormData),
}

/// A caller-supplied change to the default header set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderOverride {
    /// Set `name` to `value`, replacing any default.
    Set(String, String),
    /// Remove `name` from the outgoing headers.
    Clear(String),
}

/// A call against the API, before base URL and auth are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub method: HttpMethod,
    pub path: String,
    pub body: Option<RequestBody>,
    pub headers: Vec<HeaderOverride>,
}

impl Endpoint {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(HeaderOverride::Set(name.into(), value.into()));
        self
    }

    pub fn clear_header(mut self, name: impl Into<String>) -> Self {
        self.headers.push(HeaderOverride::Clear(name.into()));
        self
    }
}

/// A fully resolved HTTP request, ready for a `Transport`.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response described as plain data.
///
/// `body` holds the raw bytes as received; nothing guarantees UTF-8.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub(crate) fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Replace (or append) `name` in `headers`, matching case-insensitively.
pub(crate) fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    remove_header(headers, name);
    headers.push((name.to_string(), value.to_string()));
}

pub(crate) fn remove_header(headers: &mut Vec<(String, String)>, name: &str) {
    headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
}
