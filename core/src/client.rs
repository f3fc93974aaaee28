//! Typed, authenticated HTTP client for the facilities API.
//!
//! # Design
//! Every call goes through three steps:
//! 1. `build_request` turns an `Endpoint` into an `HttpRequest`: base URL +
//!    path, default JSON content type, bearer token from the provider, then
//!    the caller's header overrides.
//! 2. The `Transport` executes it.
//! 3. `parse_response` maps the `HttpResponse` to `ApiResponse<T>` or an
//!    `ApiError`.
//!
//! Steps 1 and 3 are pure, so they are tested without a network. The client
//! holds no mutable state; the token is looked up on every call.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::auth::{Anonymous, TokenProvider};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{remove_header, set_header, Endpoint, HeaderOverride, HttpMethod, HttpRequest, HttpResponse, RequestBody};
use crate::multipart::FormData;
use crate::transport::{HttpTransport, Transport};

/// Successful outcome of a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiResponse<T> {
    /// Decoded JSON body.
    Content(T),
    /// The server answered 204 No Content.
    NoContent,
}

impl<T> ApiResponse<T> {
    pub fn is_no_content(&self) -> bool {
        matches!(self, ApiResponse::NoContent)
    }

    pub fn content(self) -> Option<T> {
        match self {
            ApiResponse::Content(value) => Some(value),
            ApiResponse::NoContent => None,
        }
    }

    /// The decoded body, or a `Decode` error when the server sent 204.
    pub fn into_content(self) -> Result<T, ApiError> {
        self.content()
            .ok_or_else(|| ApiError::decode(204, "expected a response body, got 204 No Content"))
    }
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient").field("base_url", &self.base_url).finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Client using `HttpTransport` with the configured timeout.
    ///
    /// Fails with a `Request` error only if the HTTP client cannot be built.
    pub fn new(config: ClientConfig, tokens: impl TokenProvider + 'static) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(config.timeout)?;
        Ok(Self::with_transport(config, tokens, transport))
    }

    /// Client that never sends an Authorization header.
    pub fn anonymous(config: ClientConfig) -> Result<Self, ApiError> {
        Self::new(config, Anonymous)
    }

    pub fn with_transport(
        config: ClientConfig,
        tokens: impl TokenProvider + 'static,
        transport: impl Transport + 'static,
    ) -> Self {
        Self {
            base_url: config.base_url,
            tokens: Arc::new(tokens),
            transport: Arc::new(transport),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn get<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>, ApiError> {
        self.send(Endpoint::new(HttpMethod::Get, path))
    }

    pub fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<ApiResponse<T>, ApiError> {
        self.send(Endpoint::new(HttpMethod::Post, path).with_body(json_body(body)?))
    }

    pub fn put<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<ApiResponse<T>, ApiError> {
        self.send(Endpoint::new(HttpMethod::Put, path).with_body(json_body(body)?))
    }

    pub fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<ApiResponse<T>, ApiError> {
        self.send(Endpoint::new(HttpMethod::Patch, path).with_body(json_body(body)?))
    }

    pub fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>, ApiError> {
        self.send(Endpoint::new(HttpMethod::Delete, path))
    }

    /// POST a multipart form. The JSON content type is cleared so the
    /// transport can announce its own boundary.
    pub fn post_form<T: DeserializeOwned>(&self, path: &str, form: FormData) -> Result<ApiResponse<T>, ApiError> {
        self.send(
            Endpoint::new(HttpMethod::Post, path)
                .with_body(RequestBody::Form(form))
                .clear_header("Content-Type"),
        )
    }

    pub fn send<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<ApiResponse<T>, ApiError> {
        let request = self.build_request(endpoint)?;
        debug!(method = %request.method, url = %request.url, "sending request");

        let response = self.transport.execute(&request).map_err(|e| {
            warn!(method = %request.method, url = %request.url, error = %e, "request failed");
            ApiError::from(e)
        })?;

        if !response.is_success() {
            warn!(method = %request.method, url = %request.url, status = response.status, "unsuccessful response");
        }
        parse_response(response)
    }

    /// Resolve an `Endpoint` against the base URL and current token.
    pub fn build_request(&self, endpoint: Endpoint) -> Result<HttpRequest, ApiError> {
        if !endpoint.path.starts_with('/') {
            return Err(ApiError::request(format!("path must start with '/': {:?}", endpoint.path)));
        }

        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if let Some(token) = self.tokens.token() {
            set_header(&mut headers, "Authorization", &format!("Bearer {token}"));
        }
        for over in &endpoint.headers {
            match over {
                HeaderOverride::Set(name, value) => set_header(&mut headers, name, value),
                HeaderOverride::Clear(name) => remove_header(&mut headers, name),
            }
        }

        Ok(HttpRequest {
            method: endpoint.method,
            url: format!("{}{}", self.base_url, endpoint.path),
            headers,
            body: endpoint.body,
        })
    }
}

/// Map a completed response to the call's outcome.
///
/// 204 short-circuits before the body is looked at; other 2xx bodies are
/// decoded as JSON; everything else becomes a `Status` error.
pub fn parse_response<T: DeserializeOwned>(response: HttpResponse) -> Result<ApiResponse<T>, ApiError> {
    if response.status == 204 {
        return Ok(ApiResponse::NoContent);
    }
    if !response.is_success() {
        return Err(ApiError::from_status(response.status, &response.body));
    }
    serde_json::from_slice(&response.body)
        .map(ApiResponse::Content)
        .map_err(|e| ApiError::decode(response.status, format!("invalid response body: {e}")))
}

fn json_body<B: Serialize + ?Sized>(body: &B) -> Result<RequestBody, ApiError> {
    serde_json::to_string(body)
        .map(RequestBody::Json)
        .map_err(|e| ApiError::request(format!("failed to serialize request body: {e}")))
}
