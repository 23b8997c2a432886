//! Stateless POST/GET helpers.
//!
//! `post` and `get` normalize server-side rejections (a `details` field in
//! the body) into `RequestError::Rejected`. Transport faults are already
//! categorized by the `Transport`. Nothing here retries.

use serde::Serialize;
use serde_json::Value;

use super::client::{ApiRequest, Method, Transport};
use super::error::{RequestError, RequestResult};

/// Field the authorization server uses for error descriptions.
const DETAILS_FIELD: &str = "details";

/// POST `body` as JSON to `url`. An empty `access_token` sends no bearer header.
pub async fn post<T, B>(transport: &T, url: &str, body: &B, access_token: &str) -> RequestResult
where
    T: Transport,
    B: Serialize + ?Sized,
{
    interpret(post_raw(transport, url, body, access_token).await)
}

/// Like [`post`], but hands back the parsed body without looking for
/// `details`. Only transport and serialization faults are errors.
pub async fn post_raw<T, B>(transport: &T, url: &str, body: &B, access_token: &str) -> RequestResult
where
    T: Transport,
    B: Serialize + ?Sized,
{
    let body = serde_json::to_value(body).map_err(|e| {
        log::error!("Failed to serialize request body for {}: {}", url, e);
        RequestError::Logic
    })?;

    let request = ApiRequest {
        method: Method::Post,
        url: url.to_string(),
        body: Some(body),
        bearer: bearer(access_token),
    };
    transport.execute(request).await
}

/// GET `url`. An empty `access_token` sends no bearer header.
pub async fn get<T: Transport>(transport: &T, url: &str, access_token: &str) -> RequestResult {
    let request = ApiRequest {
        method: Method::Get,
        url: url.to_string(),
        body: None,
        bearer: bearer(access_token),
    };
    interpret(transport.execute(request).await)
}

fn bearer(access_token: &str) -> Option<String> {
    if access_token.is_empty() {
        None
    } else {
        Some(access_token.to_string())
    }
}

fn interpret(response: RequestResult) -> RequestResult {
    let payload = response?;
    match rejection(&payload) {
        Some(e) => Err(e),
        None => Ok(payload),
    }
}

/// The `Rejected` error carried by `payload`, if it has a `details` field.
pub fn rejection(payload: &Value) -> Option<RequestError> {
    match payload.get(DETAILS_FIELD)? {
        Value::String(details) => Some(RequestError::Rejected(details.clone())),
        other => Some(RequestError::Rejected(other.to_string())),
    }
}
