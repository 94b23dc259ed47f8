//! Explicit session-state model.
//!
//! Consumes the reissuance outcome events. A terminal refresh failure
//! moves the session to `NeedsReauthentication`; it does not sign the
//! user out — surfacing the state is this model's whole job, acting on
//! it belongs to the auth UI.

use std::sync::{Arc, Weak};

use arbor_core::{CancelBag, EventSource, MainScheduler};
use parking_lot::Mutex;

use super::ReissueTokensUseCase;

/// Current session health.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing observed yet this process.
    Unknown,
    /// Tokens were refreshed successfully.
    Active,
    /// The last reissuance chain exhausted its attempts.
    NeedsReauthentication,
}

/// Process-wide session state, fed by the reissue use case.
pub struct SessionStore {
    state: Mutex<SessionState>,
    changed: EventSource<SessionState>,
    cancel_bag: CancelBag,
    weak_self: Weak<Self>,
}

impl SessionStore {
    /// Create a store in the `Unknown` state.
    pub fn new(scheduler: &MainScheduler) -> Arc<Self> {
        Arc::new_cyclic(|weak_self| Self {
            state: Mutex::new(SessionState::Unknown),
            changed: EventSource::new(scheduler),
            cancel_bag: CancelBag::new(),
            weak_self: weak_self.clone(),
        })
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    /// Emits on every state change.
    pub fn changed(&self) -> EventSource<SessionState> {
        self.changed.clone()
    }

    /// Subscribe to a reissue use case's outcome events. Subscriptions
    /// live in this store's bag and die with it.
    pub fn bind(&self, reissue: &ReissueTokensUseCase) {
        let Some(this) = self.weak_self.upgrade() else {
            return;
        };
        reissue
            .tokens_refreshed()
            .subscribe_weak(&this, |store, _tokens| {
                store.set_state(SessionState::Active);
            })
            .store_in(&self.cancel_bag);
        reissue
            .refresh_failed()
            .subscribe_weak(&this, |store, error| {
                tracing::warn!(%error, "session needs reauthentication");
                store.set_state(SessionState::NeedsReauthentication);
            })
            .store_in(&self.cancel_bag);
    }

    fn set_state(&self, new_state: SessionState) {
        {
            let mut state = self.state.lock();
            if *state == new_state {
                return;
            }
            *state = new_state;
        }
        self.changed.send(new_state);
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &self.state())
            .finish()
    }
}
