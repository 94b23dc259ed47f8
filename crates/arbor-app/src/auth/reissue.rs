//! Token reissuance with bounded retry.
//!
//! Reissuance is not fire-and-forget: every attempt chain terminates in
//! exactly one of `tokens_refreshed` or `refresh_failed`, and the
//! session model consumes both. Retries use exponential backoff with
//! uniform jitter, scheduled through the main scheduler's clock so tests
//! drive them deterministically. No timeout is modeled; the policy
//! bounds attempts, not wall-clock.

use std::sync::{Arc, Weak};

use arbor_core::{CancelBag, EventSource, MainScheduler};
use rand::Rng;

use crate::errors::DomainError;

use super::{AuthService, AuthStorage, AuthTokens};

/// Bounds for the reissuance retry schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first call included.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles per subsequent retry.
    pub base_delay_ms: u64,
    /// Upper bound of the uniform jitter added to every delay.
    pub max_jitter_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
            max_jitter_ms: 250,
        }
    }
}

impl RetryPolicy {
    /// Delay before the retry following `failed_attempts` failures.
    fn delay_after_ms(&self, failed_attempts: u32) -> u64 {
        let exponent = failed_attempts.saturating_sub(1).min(16);
        let backoff = self.base_delay_ms.saturating_mul(1 << exponent);
        let jitter = if self.max_jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=self.max_jitter_ms)
        };
        backoff.saturating_add(jitter)
    }

    /// Largest possible delay before the retry following
    /// `failed_attempts` failures. Tests advance the clock by this much.
    pub fn max_delay_after_ms(&self, failed_attempts: u32) -> u64 {
        let exponent = failed_attempts.saturating_sub(1).min(16);
        self.base_delay_ms
            .saturating_mul(1 << exponent)
            .saturating_add(self.max_jitter_ms)
    }
}

/// Terminal reissuance failure, emitted after the last attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("token reissuance failed after {attempts} attempts: {last_error}")]
pub struct AuthRefreshError {
    /// How many attempts were made.
    pub attempts: u32,
    /// The failure of the final attempt.
    pub last_error: DomainError,
}

/// Reissues the persisted token pair against the auth backend.
pub struct ReissueTokensUseCase {
    scheduler: MainScheduler,
    service: Arc<dyn AuthService>,
    storage: AuthStorage,
    policy: RetryPolicy,
    cancel_bag: CancelBag,
    tokens_refreshed: EventSource<AuthTokens>,
    refresh_failed: EventSource<AuthRefreshError>,
    weak_self: Weak<Self>,
}

impl ReissueTokensUseCase {
    /// Create the use case.
    pub fn new(
        scheduler: &MainScheduler,
        service: Arc<dyn AuthService>,
        storage: AuthStorage,
        policy: RetryPolicy,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak_self| Self {
            scheduler: scheduler.clone(),
            service,
            storage,
            policy,
            cancel_bag: CancelBag::new(),
            tokens_refreshed: EventSource::new(scheduler),
            refresh_failed: EventSource::new(scheduler),
            weak_self: weak_self.clone(),
        })
    }

    /// Emits the fresh pair after a successful reissuance; the pair has
    /// already been persisted by then.
    pub fn tokens_refreshed(&self) -> EventSource<AuthTokens> {
        self.tokens_refreshed.clone()
    }

    /// Emits exactly once per exhausted attempt chain.
    pub fn refresh_failed(&self) -> EventSource<AuthRefreshError> {
        self.refresh_failed.clone()
    }

    /// Start one attempt chain.
    pub fn reissue(&self) {
        let Some(this) = self.weak_self.upgrade() else {
            return;
        };
        Self::attempt(this, 1);
    }

    fn attempt(this: Arc<Self>, attempt_number: u32) {
        tracing::debug!(attempt_number, "reissuing tokens");
        let result_source = this.service.reissue();
        let subscription = result_source.subscribe_weak(&this, move |owner, result| {
            match result {
                Ok(tokens) => {
                    owner.storage.store_tokens(tokens);
                    owner.tokens_refreshed.send(tokens.clone());
                }
                Err(error) => {
                    if attempt_number >= owner.policy.max_attempts {
                        tracing::warn!(%error, attempts = attempt_number, "token reissuance exhausted");
                        owner.refresh_failed.send(AuthRefreshError {
                            attempts: attempt_number,
                            last_error: error.clone(),
                        });
                    } else {
                        let delay_ms = owner.policy.delay_after_ms(attempt_number);
                        tracing::debug!(%error, delay_ms, "token reissuance retrying");
                        let weak = Arc::downgrade(owner);
                        owner.scheduler.post_delayed(delay_ms, move || {
                            if let Some(this) = weak.upgrade() {
                                Self::attempt(this, attempt_number + 1);
                            }
                        });
                    }
                }
            }
        });
        subscription.store_in(&this.cancel_bag);
    }
}
