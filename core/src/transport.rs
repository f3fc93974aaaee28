//! Execution of resolved `HttpRequest`s.
//!
//! # Design
//! `ApiClient` never touches sockets directly; it hands each request to a
//! `Transport`. `HttpTransport` is the production implementation. Tests and
//! embedders can substitute their own to observe outgoing requests or script
//! responses.
//!
//! A transport must return every completed response as data, whatever its
//! status code or body encoding. Only failures where no response was
//! received are errors.

use std::time::Duration;

use reqwest::blocking::{multipart, Client};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use thiserror::Error;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, RequestBody};
use crate::multipart::{FormData, Part};

/// Failure to obtain any response.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("{0}")]
    Timeout(String),
    #[error("{0}")]
    Failed(String),
    /// The request could not be put on the wire (bad header, bad part).
    #[error("{0}")]
    Invalid(String),
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout(msg) => ApiError::timeout(msg),
            TransportError::Failed(msg) => ApiError::transport(msg),
            TransportError::Invalid(msg) => ApiError::request(msg),
        }
    }
}

pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Blocking transport backed by a `reqwest::blocking::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    inner: Client,
}

impl HttpTransport {
    /// Build a client whose whole-call timeout is `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let inner = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Invalid(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { inner })
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self.inner.request(method(request.method), request.url.as_str());
        match &request.body {
            None => {}
            Some(RequestBody::Json(json)) => builder = builder.body(json.clone()),
            Some(RequestBody::Form(form)) => builder = builder.multipart(to_multipart(form)?),
        }
        // Applied after the body so an explicit Content-Type replaces the
        // multipart one instead of duplicating it.
        builder = builder.headers(header_map(&request.headers)?);

        let response = builder.send().map_err(map_error)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = response.bytes().map_err(map_error)?.to_vec();

        Ok(HttpResponse { status, headers, body })
    }
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn header_map(headers: &[(String, String)]) -> Result<HeaderMap, TransportError> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| TransportError::Invalid(format!("invalid header name {name:?}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| TransportError::Invalid(format!("invalid value for header {name}: {e}")))?;
        map.insert(name, value);
    }
    Ok(map)
}

fn to_multipart(form: &FormData) -> Result<multipart::Form, TransportError> {
    let mut out = multipart::Form::new();
    for part in form.parts() {
        out = match part {
            Part::Text { name, value } => out.text(name.clone(), value.clone()),
            Part::File {
                name,
                filename,
                content_type,
                bytes,
            } => {
                let file = multipart::Part::bytes(bytes.clone())
                    .file_name(filename.clone())
                    .mime_str(content_type)
                    .map_err(|e| TransportError::Invalid(format!("invalid content type {content_type:?}: {e}")))?;
                out.part(name.clone(), file)
            }
        };
    }
    Ok(out)
}

fn map_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(err.to_string())
    } else if err.is_builder() {
        TransportError::Invalid(err.to_string())
    } else {
        TransportError::Failed(err.to_string())
    }
}
