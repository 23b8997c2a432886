//! Login exchange against the authorization server.
//!
//! Trades an email/password for an access/refresh pair and works out the
//! display identity for the dashboard.

use base64::Engine;
use thiserror::Error;

use super::client::{Endpoints, Transport};
use super::error::RequestError;
use super::requests;
use super::types::{LoginRequest, TokenResponse};
use crate::session::Credentials;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginError {
    /// Rejected locally, no request was sent.
    #[error("Please fill the fields below")]
    EmptyFields,
    #[error(transparent)]
    Request(#[from] RequestError),
}

/// Everything the session owner needs to start a session.
#[derive(Debug)]
pub struct LoginSuccess {
    pub credentials: Credentials,
    pub username: String,
}

/// Local form check: both fields must be filled in.
pub fn validate(email: &str, password: &str) -> Result<(), LoginError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(LoginError::EmptyFields);
    }
    Ok(())
}

/// Validate the form input and obtain a token pair.
///
/// POST token/get/ with `{"email", "password_hash"}`. A `details` field in
/// the response is the server's reason for refusing the login.
pub async fn login<T: Transport>(
    transport: &T,
    endpoints: &Endpoints,
    email: &str,
    password: &str,
) -> Result<LoginSuccess, LoginError> {
    validate(email, password)?;
    let email = email.trim();

    log::info!("Requesting token pair for {}", email);

    let body = LoginRequest {
        email,
        password_hash: password,
    };
    let payload = requests::post(transport, &endpoints.token_obtain, &body, "").await?;

    let tokens: TokenResponse = serde_json::from_value(payload).map_err(|e| {
        log::warn!("Unexpected login response shape: {}", e);
        RequestError::Unknown
    })?;

    let username = extract_subject_from_jwt(&tokens.access_token).unwrap_or_else(|e| {
        log::debug!("Using login email as display name: {}", e);
        email.to_string()
    });

    Ok(LoginSuccess {
        credentials: tokens.into(),
        username,
    })
}

/// Extract the `sub` claim from a JWT access token.
///
/// Decodes the payload segment without verifying the signature; the token is
/// only used here to pick a display name.
fn extract_subject_from_jwt(token: &str) -> Result<String, String> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err("Invalid JWT format".to_string());
    }

    let payload = parts[1].trim_end_matches('=');
    let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| format!("Failed to decode JWT payload: {}", e))?;

    let json: serde_json::Value = serde_json::from_slice(&decoded)
        .map_err(|e| format!("Failed to parse JWT payload: {}", e))?;

    json["sub"]
        .as_str()
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .ok_or_else(|| "JWT payload missing 'sub' claim".to_string())
}
