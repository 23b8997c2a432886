//! Access/refresh credential pair shared between request issuers and the
//! session keeper.
//!
//! Both tokens live behind one `RwLock`. Readers take short read locks and get
//! owned copies back; a successful refresh installs the new pair with a single
//! write-lock acquisition, so no reader ever sees a new access token next to a
//! stale refresh token.

use std::fmt;

use tokio::sync::RwLock;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::api::error::{RequestError, RequestResult};
use crate::api::requests;
use crate::api::types::{RefreshRequest, TokenResponse};
use crate::api::Transport;

/// Owned snapshot of both tokens. Wiped from memory when dropped.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    pub access: String,
    pub refresh: String,
}

impl Credentials {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }
}

impl From<TokenResponse> for Credentials {
    fn from(resp: TokenResponse) -> Self {
        Self {
            access: resp.access_token,
            refresh: resp.refresh_token,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .finish()
    }
}

/// Thread-safe holder of the current session credentials.
pub struct TokenPair {
    inner: RwLock<Credentials>,
}

impl TokenPair {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            inner: RwLock::new(credentials),
        }
    }

    /// Current access token.
    pub async fn access(&self) -> String {
        self.inner.read().await.access.clone()
    }

    /// Current refresh token.
    pub async fn refresh_token(&self) -> String {
        self.inner.read().await.refresh.clone()
    }

    /// Both tokens, read under one lock acquisition.
    pub async fn snapshot(&self) -> Credentials {
        self.inner.read().await.clone()
    }

    /// Replace the access token only.
    pub async fn set_access(&self, access: String) {
        let mut guard = self.inner.write().await;
        guard.access.zeroize();
        guard.access = access;
    }

    /// Replace the refresh token only.
    pub async fn set_refresh(&self, refresh: String) {
        let mut guard = self.inner.write().await;
        guard.refresh.zeroize();
        guard.refresh = refresh;
    }

    /// Replace both tokens as one update.
    pub async fn install(&self, credentials: Credentials) {
        *self.inner.write().await = credentials;
    }

    /// Exchange the current refresh token for a new pair.
    ///
    /// POSTs `{"refresh_token": ...}` to `url`. On success both tokens are
    /// replaced; on any failure the pair is left untouched. Never panics on
    /// network or parse faults.
    pub async fn refresh<T: Transport>(&self, transport: &T, url: &str) -> RequestResult<()> {
        let current = Zeroizing::new(self.refresh_token().await);
        let body = RefreshRequest {
            refresh_token: current.as_str(),
        };

        let payload = requests::post_raw(transport, url, &body, "").await?;

        // A complete token pair wins over a `details` field sent alongside it.
        let tokens: TokenResponse = match serde_json::from_value(payload.clone()) {
            Ok(tokens) => tokens,
            Err(e) => {
                if let Some(rejected) = requests::rejection(&payload) {
                    return Err(rejected);
                }
                log::warn!("Unexpected token refresh response shape: {}", e);
                return Err(RequestError::Unknown);
            }
        };

        self.install(tokens.into()).await;
        log::debug!("Token pair refreshed");
        Ok(())
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{token_response, ScriptedTransport};
    use crate::api::Method;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    const REFRESH_URL: &str = "http://api/token/refresh/";

    fn pair(access: &str, refresh: &str) -> TokenPair {
        TokenPair::new(Credentials::new(access, refresh))
    }

    #[tokio::test]
    async fn test_getters_and_setters() {
        let tokens = pair("a-0", "r-0");
        assert_eq!(tokens.access().await, "a-0");
        assert_eq!(tokens.refresh_token().await, "r-0");

        tokens.set_access("a-1".into()).await;
        assert_eq!(tokens.access().await, "a-1");
        assert_eq!(tokens.refresh_token().await, "r-0");

        tokens.set_refresh("r-1".into()).await;
        assert_eq!(tokens.snapshot().await, Credentials::new("a-1", "r-1"));
    }

    #[tokio::test]
    async fn test_repeated_reads_are_stable() {
        let tokens = pair("a-0", "r-0");
        for _ in 0..100 {
            assert_eq!(tokens.access().await, "a-0");
        }
    }

    #[tokio::test]
    async fn test_refresh_success_installs_both_tokens() {
        let transport = ScriptedTransport::always(Ok(token_response("a-1", "r-1")));
        let tokens = pair("a-0", "r-0");

        let result = tokens.refresh(&transport, REFRESH_URL).await;

        assert_eq!(result, Ok(()));
        assert_eq!(tokens.access().await, "a-1");
        assert_eq!(tokens.refresh_token().await, "r-1");

        let sent = transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, Method::Post);
        assert_eq!(sent[0].url, REFRESH_URL);
        assert_eq!(sent[0].body, Some(json!({ "refresh_token": "r-0" })));
        assert_eq!(sent[0].bearer, None);
    }

    #[tokio::test]
    async fn test_refresh_with_details_leaves_tokens_unchanged() {
        let transport = ScriptedTransport::always(Ok(json!({
            "details": "Token is invalid or expired"
        })));
        let tokens = pair("a-0", "r-0");

        let result = tokens.refresh(&transport, REFRESH_URL).await;

        assert_eq!(
            result,
            Err(RequestError::Rejected("Token is invalid or expired".into()))
        );
        assert_eq!(tokens.snapshot().await, Credentials::new("a-0", "r-0"));
    }

    #[tokio::test]
    async fn test_refresh_accepts_tokens_sent_with_details() {
        let transport = ScriptedTransport::always(Ok(json!({
            "access_token": "a-1",
            "refresh_token": "r-1",
            "details": "Token rotated"
        })));
        let tokens = pair("a-0", "r-0");

        assert_eq!(tokens.refresh(&transport, REFRESH_URL).await, Ok(()));
        assert_eq!(tokens.snapshot().await, Credentials::new("a-1", "r-1"));
    }

    #[tokio::test]
    async fn test_refresh_transport_fault_leaves_tokens_unchanged() {
        for fault in [RequestError::Runtime, RequestError::Logic] {
            let transport = ScriptedTransport::always(Err(fault.clone()));
            let tokens = pair("a-0", "r-0");

            assert_eq!(tokens.refresh(&transport, REFRESH_URL).await, Err(fault));
            assert_eq!(tokens.snapshot().await, Credentials::new("a-0", "r-0"));
        }
    }

    #[tokio::test]
    async fn test_refresh_missing_field_is_unknown_error() {
        let transport = ScriptedTransport::always(Ok(json!({ "access_token": "a-1" })));
        let tokens = pair("a-0", "r-0");

        let result = tokens.refresh(&transport, REFRESH_URL).await;

        assert_eq!(result, Err(RequestError::Unknown));
        assert_eq!(tokens.snapshot().await, Credentials::new("a-0", "r-0"));
    }

    #[tokio::test]
    async fn test_refresh_uses_latest_refresh_token() {
        let transport = ScriptedTransport::sequence(vec![
            Ok(token_response("a-1", "r-1")),
            Ok(token_response("a-2", "r-2")),
        ]);
        let tokens = pair("a-0", "r-0");

        tokens.refresh(&transport, REFRESH_URL).await.unwrap();
        tokens.refresh(&transport, REFRESH_URL).await.unwrap();

        let bodies: Vec<_> = transport.requests().into_iter().map(|r| r.body).collect();
        assert_eq!(
            bodies,
            vec![
                Some(json!({ "refresh_token": "r-0" })),
                Some(json!({ "refresh_token": "r-1" })),
            ]
        );
        assert_eq!(tokens.snapshot().await, Credentials::new("a-2", "r-2"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_reads_never_observe_torn_pair() {
        let old = Credentials::new("access-before-refresh", "refresh-before-refresh");
        let new = Credentials::new("access-after-refresh", "refresh-after-refresh");

        let transport = Arc::new(
            ScriptedTransport::always(Ok(token_response(&new.access, &new.refresh)))
                .with_delay(Duration::from_millis(20)),
        );
        let tokens = Arc::new(TokenPair::new(old.clone()));

        let mut readers = Vec::new();
        for _ in 0..4 {
            let tokens = Arc::clone(&tokens);
            let (old, new) = (old.clone(), new.clone());
            readers.push(tokio::spawn(async move {
                for _ in 0..2_000 {
                    let access = tokens.access().await;
                    assert!(access == old.access || access == new.access);

                    let refresh = tokens.refresh_token().await;
                    assert!(refresh == old.refresh || refresh == new.refresh);

                    let snapshot = tokens.snapshot().await;
                    assert!(snapshot == old || snapshot == new);
                    tokio::task::yield_now().await;
                }
            }));
        }

        tokens.refresh(transport.as_ref(), REFRESH_URL).await.unwrap();

        for reader in readers {
            reader.await.unwrap();
        }
        assert_eq!(tokens.snapshot().await, new);
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let printed = format!("{:?}", Credentials::new("secret-a", "secret-r"));
        assert!(!printed.contains("secret-a"));
        assert!(!printed.contains("secret-r"));
    }
}
