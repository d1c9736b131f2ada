//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Once};

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use ig_dealing_rs::client::{ApiRequest, ApiResponse, Transport};
use ig_dealing_rs::{ClientConfig, Error, IgClient, Result};

pub const BASE_URL: &str = "https://demo-api.ig.com/gateway/deal";
pub const API_KEY: &str = "test-api-key";
pub const CLIENT_TOKEN: &str = "cst-token-1";
pub const SECURITY_TOKEN: &str = "security-token-1";

static INIT: Once = Once::new();

/// Initialize logging for tests
pub fn init_logging() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// A transport that replays queued responses and records every request.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    responses: Arc<Mutex<VecDeque<Result<ApiResponse>>>>,
    requests: Arc<Mutex<Vec<ApiRequest>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response.
    pub fn push(&self, response: ApiResponse) -> &Self {
        self.responses.lock().unwrap().push_back(Ok(response));
        self
    }

    /// Queue a 200 response with a JSON body.
    pub fn push_json(&self, body: Value) -> &Self {
        self.push(ApiResponse::new(StatusCode::OK, body.to_string()))
    }

    /// Queue a transport failure.
    pub fn push_error(&self, error: Error) -> &Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    /// Every request sent so far.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The most recent request.
    pub fn last_request(&self) -> ApiRequest {
        self.requests().pop().expect("no request was sent")
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Protocol(format!("Unscripted request to {}", request.url))))
    }
}

/// Session headers as the broker returns them on login.
pub fn token_headers(client_token: Option<&'static str>, security_token: Option<&'static str>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Some(token) = client_token {
        headers.insert("cst", HeaderValue::from_static(token));
    }
    if let Some(token) = security_token {
        headers.insert("x-security-token", HeaderValue::from_static(token));
    }
    headers
}

pub fn session_body(account_id: &str) -> Value {
    json!({
        "accountType": "SPREADBET",
        "currencyIsoCode": "GBP",
        "currentAccountId": account_id,
        "lightstreamerEndpoint": "https://demo-apd.marketdatasystems.com",
        "accounts": [
            {"accountId": account_id, "accountName": "Spread bet", "preferred": true},
            {"accountId": "XYZ789", "accountName": "CFD", "preferred": false}
        ]
    })
}

/// A successful login response.
pub fn login_response(account_id: &str) -> ApiResponse {
    let mut response = ApiResponse::new(StatusCode::OK, session_body(account_id).to_string());
    response.headers = token_headers(Some(CLIENT_TOKEN), Some(SECURITY_TOKEN));
    response
}

/// A client over `transport` with retries disabled.
pub fn client(transport: &ScriptedTransport) -> IgClient {
    client_with_config(transport, ClientConfig::default().without_retry())
}

pub fn client_with_config(transport: &ScriptedTransport, config: ClientConfig) -> IgClient {
    init_logging();
    IgClient::with_transport(API_KEY, BASE_URL, transport.clone(), config)
        .expect("client should build")
}

/// A client that has already logged in to `ABC123`.
pub fn logged_in_client(transport: &ScriptedTransport) -> IgClient {
    let mut client = client(transport);
    transport.push(login_response("ABC123"));
    client.login("user", "secret").expect("login should succeed");
    client
}

/// Header value of a recorded request as text.
pub fn header<'a>(request: &'a ApiRequest, name: &str) -> Option<&'a str> {
    request.headers.get(name).and_then(|v| v.to_str().ok())
}
