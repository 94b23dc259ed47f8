//! The process-wide application context.
//!
//! Constructed once at startup on the main thread and passed into every
//! component that needs it. There are no ambient singletons: the
//! lifecycle observer, the analytics sink and the storage engine all
//! arrive here as injected boundaries.

use std::sync::Arc;

use arbor_core::{EventSource, MainScheduler};

use crate::analytics::AnalyticsSink;
use crate::auth::{AuthService, RetryPolicy, SessionStore};
use crate::permissions::NotificationPermissions;
use crate::storage::KeyValueStore;

/// Process lifecycle transition signals.
///
/// The platform shell sends into these; everything else subscribes.
#[derive(Debug, Clone)]
pub struct AppEvents {
    /// The app is about to enter the foreground.
    pub will_enter_foreground: EventSource<()>,
    /// The app has entered the background.
    pub did_enter_background: EventSource<()>,
}

impl AppEvents {
    /// Create the signal pair.
    pub fn new(scheduler: &MainScheduler) -> Self {
        Self {
            will_enter_foreground: EventSource::new(scheduler),
            did_enter_background: EventSource::new(scheduler),
        }
    }
}

/// Boundary implementations injected at startup.
pub struct AppServices {
    /// Persisted key-value storage.
    pub storage: Arc<dyn KeyValueStore>,
    /// Analytics destination.
    pub analytics: Arc<dyn AnalyticsSink>,
    /// Platform notification settings.
    pub permissions: Arc<dyn NotificationPermissions>,
    /// Auth backend.
    pub auth: Arc<dyn AuthService>,
    /// Reissuance retry bounds.
    pub retry_policy: RetryPolicy,
}

/// Everything a component needs from the process: the scheduler, the
/// lifecycle signals, the injected boundaries and the session model.
#[derive(Clone)]
pub struct AppContext {
    scheduler: MainScheduler,
    events: AppEvents,
    storage: Arc<dyn KeyValueStore>,
    analytics: Arc<dyn AnalyticsSink>,
    permissions: Arc<dyn NotificationPermissions>,
    auth: Arc<dyn AuthService>,
    session: Arc<SessionStore>,
    retry_policy: RetryPolicy,
}

impl AppContext {
    /// Assemble the context. Call once, at startup, on the main thread.
    pub fn new(scheduler: MainScheduler, services: AppServices) -> Self {
        scheduler.assert_main_context("AppContext::new");
        let events = AppEvents::new(&scheduler);
        let session = SessionStore::new(&scheduler);
        Self {
            events,
            session,
            storage: services.storage,
            analytics: services.analytics,
            permissions: services.permissions,
            auth: services.auth,
            retry_policy: services.retry_policy,
            scheduler,
        }
    }

    /// The main scheduling context.
    pub fn scheduler(&self) -> &MainScheduler {
        &self.scheduler
    }

    /// Process lifecycle signals.
    pub fn events(&self) -> &AppEvents {
        &self.events
    }

    /// Persisted key-value storage.
    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        &self.storage
    }

    /// Analytics destination.
    pub fn analytics(&self) -> &Arc<dyn AnalyticsSink> {
        &self.analytics
    }

    /// Platform notification settings.
    pub fn permissions(&self) -> &Arc<dyn NotificationPermissions> {
        &self.permissions
    }

    /// Auth backend.
    pub fn auth(&self) -> &Arc<dyn AuthService> {
        &self.auth
    }

    /// Process-wide session state.
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Reissuance retry bounds.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry_policy
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("session", &self.session.state())
            .finish()
    }
}
