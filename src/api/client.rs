//! HTTP transport for the Storage Crab API.
//!
//! Every request is JSON in, JSON out. The bearer header is only attached
//! when a non-empty access token is supplied.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::Value;

use super::error::{RequestError, RequestResult};

/// Login (token obtain) path, relative to the API base URL.
const TOKEN_OBTAIN_PATH: &str = "token/get/";

/// Token refresh path, relative to the API base URL.
const TOKEN_REFRESH_PATH: &str = "token/refresh/";

/// User file listing path, relative to the API base URL.
const FILES_PATH: &str = "files/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
        }
    }
}

/// One outbound call, fully described.
#[derive(Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
    pub bearer: Option<String>,
}

// Keep bodies and bearer tokens out of logs.
impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("has_body", &self.body.is_some())
            .field("has_bearer", &self.bearer.is_some())
            .finish()
    }
}

/// Blocking-from-the-caller's-view network call: send a request, get back
/// the parsed JSON body or a categorized transport failure.
///
/// `ApiClient` is the production implementation; tests substitute scripted
/// transports so the session machinery can run without a server.
pub trait Transport: Send + Sync + 'static {
    fn execute(&self, request: ApiRequest) -> impl Future<Output = RequestResult> + Send;
}

/// reqwest-backed transport.
pub struct ApiClient {
    client: Client,
}

impl ApiClient {
    /// Create a client with the given whole-request and connect timeouts.
    pub fn new(timeout: Duration, connect_timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()
            .unwrap_or_else(|e| {
                log::warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });
        Self { client }
    }
}

impl Transport for ApiClient {
    fn execute(&self, request: ApiRequest) -> impl Future<Output = RequestResult> + Send {
        async move {
            let mut builder = match request.method {
                Method::Get => self.client.get(&request.url),
                Method::Post => self.client.post(&request.url),
            }
            .header(CONTENT_TYPE, "application/json");

            if let Some(ref body) = request.body {
                builder = builder.json(body);
            }

            if let Some(token) = request.bearer.as_deref().filter(|t| !t.is_empty()) {
                builder = builder.bearer_auth(token);
            }

            log::debug!("{} {}", request.method, request.url);

            let resp = builder.send().await.map_err(|e| {
                log::warn!("{} {} failed: {}", request.method, request.url, e);
                RequestError::from(e)
            })?;

            let status = resp.status();
            let text = resp.text().await.map_err(|e| {
                log::warn!("Failed to read response body from {}: {}", request.url, e);
                RequestError::Runtime
            })?;

            // Error payloads carry `details` regardless of status, so the body is
            // parsed even for non-2xx responses.
            serde_json::from_str(&text).map_err(|e| {
                log::warn!(
                    "Non-JSON response from {} ({}): {}",
                    request.url,
                    status,
                    e
                );
                RequestError::Runtime
            })
        }
    }
}

/// Absolute URLs of the endpoints the client talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub token_obtain: String,
    pub token_refresh: String,
    pub files: String,
}

impl Endpoints {
    /// Derive all endpoint URLs from the API base URL.
    pub fn from_base(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        let join = |path: &str| format!("{}/{}", base, path);
        Self {
            token_obtain: join(TOKEN_OBTAIN_PATH),
            token_refresh: join(TOKEN_REFRESH_PATH),
            files: join(FILES_PATH),
        }
    }
}
