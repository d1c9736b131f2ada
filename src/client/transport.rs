//! The HTTP transport the client sends requests through.

use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use url::Url;

use super::config::ClientConfig;
use crate::Result;

/// A fully built request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP verb actually used on the wire
    pub method: Method,
    /// Absolute URL
    pub url: Url,
    /// Headers from [`build_headers`](crate::auth::build_headers)
    pub headers: HeaderMap,
    /// JSON body, if any
    pub body: Option<Value>,
}

/// A raw response: status, headers and undecoded body text.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status
    pub status: StatusCode,
    /// Response headers (carry the session tokens on login)
    pub headers: HeaderMap,
    /// Body text
    pub body: String,
}

impl ApiResponse {
    /// A response with no headers.
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Returns `true` for HTTP 200.
    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK
    }
}

/// Sends one request and returns the response, whatever its status.
///
/// Implementations do not retry; see
/// [`RetryConfig`](crate::RetryConfig) for rate-limit retries.
pub trait Transport: Send + Sync {
    /// Send `request` and wait for the full response.
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse>;
}

/// Blocking `reqwest` transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Build a transport with the configured timeout and user agent.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;
        Ok(Self { http })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let mut builder = self
            .http
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send()?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text()?;

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}
