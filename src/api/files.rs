//! Listing of the files stored for the logged-in user.

use zeroize::Zeroizing;

use super::client::{Endpoints, Transport};
use super::error::{RequestError, RequestResult};
use super::requests;
use super::types::FileEntry;
use crate::session::TokenPair;

/// Dialog text for any file listing failure.
pub const RETRIEVAL_FAILED_MESSAGE: &str = "Failed to retrieve files";

/// GET files/ with the session's current access token.
pub async fn list_files<T: Transport>(
    transport: &T,
    endpoints: &Endpoints,
    tokens: &TokenPair,
) -> RequestResult<Vec<FileEntry>> {
    let access = Zeroizing::new(tokens.access().await);
    let payload = requests::get(transport, &endpoints.files, &access).await?;

    serde_json::from_value(payload).map_err(|e| {
        log::warn!("Unexpected file listing shape: {}", e);
        RequestError::Unknown
    })
}
