//! Process lifecycle adapter.
//!
//! Observes foreground/background transitions and triggers the
//! cross-cutting use cases: token reissuance (when a token is persisted)
//! and the notification-permission analytics report. Subscriptions are
//! owner-bound — destroying the adapter cancels them.

use std::sync::{Arc, Weak};

use arbor_core::{precondition_failure, CancelBag};
use parking_lot::Mutex;

use crate::analytics::AnalyticsEvent;
use crate::auth::{AuthStorage, ReissueTokensUseCase};
use crate::context::AppContext;

/// Adapter lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    /// Constructed; not observing anything yet.
    Uninitialized,
    /// Observing transitions.
    Prepared,
}

/// Process-wide observer of app lifecycle transitions.
pub struct AppLifecycleAdapter {
    context: AppContext,
    auth_storage: AuthStorage,
    reissue: Arc<ReissueTokensUseCase>,
    state: Mutex<AdapterState>,
    cancel_bag: CancelBag,
    weak_self: Weak<Self>,
}

impl AppLifecycleAdapter {
    /// Create the adapter and bind the session model to its reissue use
    /// case. Does not observe anything until [`prepare`](Self::prepare).
    pub fn new(context: AppContext) -> Arc<Self> {
        let auth_storage = AuthStorage::new(context.storage().clone());
        let reissue = ReissueTokensUseCase::new(
            context.scheduler(),
            context.auth().clone(),
            auth_storage.clone(),
            context.retry_policy(),
        );
        context.session().bind(&reissue);
        Arc::new_cyclic(|weak_self| Self {
            context,
            auth_storage,
            reissue,
            state: Mutex::new(AdapterState::Uninitialized),
            cancel_bag: CancelBag::new(),
            weak_self: weak_self.clone(),
        })
    }

    /// Current adapter state.
    pub fn state(&self) -> AdapterState {
        *self.state.lock()
    }

    /// The reissue use case this adapter drives, for observers.
    pub fn reissue_use_case(&self) -> &Arc<ReissueTokensUseCase> {
        &self.reissue
    }

    /// Subscribe to the lifecycle transitions, exactly once. Preparing
    /// twice is a programmer error.
    pub fn prepare(&self) {
        self.context.scheduler().assert_main_context("prepare");
        {
            let mut state = self.state.lock();
            if *state == AdapterState::Prepared {
                drop(state);
                precondition_failure("lifecycle adapter prepared twice");
                return;
            }
            *state = AdapterState::Prepared;
        }
        self.on_will_enter_foreground();
        self.on_did_enter_background();
        tracing::info!("lifecycle adapter prepared");
    }

    fn on_will_enter_foreground(&self) {
        let Some(this) = self.weak_self.upgrade() else {
            return;
        };
        self.context
            .events()
            .will_enter_foreground
            .subscribe_weak(&this, |owner, _| {
                tracing::debug!("app will enter foreground");
                owner.reissue_tokens();
                owner.check_notification_permission();
            })
            .store_in(&self.cancel_bag);
    }

    fn on_did_enter_background(&self) {
        let Some(this) = self.weak_self.upgrade() else {
            return;
        };
        self.context
            .events()
            .did_enter_background
            .subscribe_weak(&this, |owner, _| owner.on_background())
            .store_in(&self.cancel_bag);
    }

    /// Reserved: nothing runs on background today.
    fn on_background(&self) {}

    fn reissue_tokens(&self) {
        if self.auth_storage.access_token().is_none() {
            tracing::debug!("no persisted access token, skipping reissuance");
            return;
        }
        self.reissue.reissue();
    }

    fn check_notification_permission(&self) {
        let analytics = self.context.analytics().clone();
        self.context
            .permissions()
            .authorization_status()
            .subscribe(move |status| {
                analytics.report(AnalyticsEvent::PushAuthorization {
                    authorized: status.is_authorized(),
                });
            })
            .store_in(&self.cancel_bag);
    }
}

impl std::fmt::Debug for AppLifecycleAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppLifecycleAdapter")
            .field("state", &self.state())
            .finish()
    }
}
