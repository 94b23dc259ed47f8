//! Auth backend boundary.

use arbor_core::EventSource;

use crate::errors::DomainError;

use super::AuthTokens;

/// The auth backend, at its interface boundary. Transport lives outside
/// this core.
///
/// `reissue` is a one-shot source emitting exactly one result per call.
/// Implementations must not emit before the caller has subscribed —
/// complete from a background thread or post through the scheduler.
pub trait AuthService: Send + Sync {
    /// Ask the backend for a fresh token pair.
    fn reissue(&self) -> EventSource<Result<AuthTokens, DomainError>>;
}
