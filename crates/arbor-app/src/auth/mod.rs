//! Auth: token model, persisted storage binding, reissuance and the
//! session-state model.

mod reissue;
mod service;
mod session;

pub use reissue::{AuthRefreshError, ReissueTokensUseCase, RetryPolicy};
pub use service::AuthService;
pub use session::{SessionState, SessionStore};

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::storage::KeyValueStore;

/// Access/refresh token pair issued by the auth backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    /// Bearer token for API calls.
    pub access_token: String,
    /// Token used to reissue the pair.
    pub refresh_token: String,
}

/// Typed view over the auth namespace of the key-value store.
///
/// Tokens are persisted as one JSON document; an undecodable document is
/// treated as absent.
#[derive(Clone)]
pub struct AuthStorage {
    store: Arc<dyn KeyValueStore>,
}

impl AuthStorage {
    /// Namespace holding auth state.
    pub const NAMESPACE: &'static str = "auth";
    const TOKENS_KEY: &'static str = "tokens";

    /// Wrap a store.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The persisted token pair, if present and decodable.
    pub fn tokens(&self) -> Option<AuthTokens> {
        let raw = self.store.get(Self::NAMESPACE, Self::TOKENS_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(tokens) => Some(tokens),
            Err(error) => {
                tracing::warn!(%error, "stored auth tokens are undecodable, treating as absent");
                None
            }
        }
    }

    /// The persisted access token, if any.
    pub fn access_token(&self) -> Option<String> {
        self.tokens().map(|tokens| tokens.access_token)
    }

    /// Persist a token pair.
    pub fn store_tokens(&self, tokens: &AuthTokens) {
        match serde_json::to_string(tokens) {
            Ok(json) => self.store.set(Self::NAMESPACE, Self::TOKENS_KEY, json),
            Err(error) => tracing::warn!(%error, "failed to encode auth tokens"),
        }
    }

    /// Remove the persisted pair.
    pub fn clear_tokens(&self) {
        self.store.remove(Self::NAMESPACE, Self::TOKENS_KEY);
    }
}

impl std::fmt::Debug for AuthStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthStorage")
            .field("has_tokens", &self.tokens().is_some())
            .finish()
    }
}
