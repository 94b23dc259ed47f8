//! Test harness: a fully wired [`AppContext`] on manual time.

use std::sync::Arc;

use arbor_app::auth::{AuthStorage, AuthTokens, RetryPolicy};
use arbor_app::context::{AppContext, AppServices};
use arbor_app::permissions::PermissionStatus;
use arbor_core::{ManualClock, MainScheduler};

use crate::doubles::{
    InMemoryKeyValueStore, RecordingAnalytics, ScriptedAuthService, ScriptedPermissions,
};
use crate::log::EventLog;

/// An [`AppContext`] assembled from doubles, driven by a manual clock.
pub struct TestContext {
    /// The manual clock behind the scheduler.
    pub clock: Arc<ManualClock>,
    /// The main scheduling context. Pump it after sending events.
    pub scheduler: MainScheduler,
    /// The assembled context.
    pub context: AppContext,
    /// The backing store.
    pub storage: Arc<InMemoryKeyValueStore>,
    /// The analytics recording sink.
    pub analytics: Arc<RecordingAnalytics>,
    /// The permission double.
    pub permissions: Arc<ScriptedPermissions>,
    /// The auth double.
    pub auth: Arc<ScriptedAuthService>,
    /// The shared ordered log every double records into.
    pub log: EventLog,
}

impl TestContext {
    /// Build a context with the default retry policy.
    pub fn new() -> Self {
        Self::with_policy(RetryPolicy::default())
    }

    /// Build a context with a specific retry policy.
    pub fn with_policy(retry_policy: RetryPolicy) -> Self {
        let clock = Arc::new(ManualClock::new(0));
        let scheduler = MainScheduler::with_clock(clock.clone());
        let log = EventLog::new();
        let storage = InMemoryKeyValueStore::new();
        let analytics = RecordingAnalytics::new(log.clone());
        let permissions =
            ScriptedPermissions::new(&scheduler, log.clone(), PermissionStatus::Authorized);
        let auth = ScriptedAuthService::new(&scheduler, log.clone());
        let context = AppContext::new(
            scheduler.clone(),
            AppServices {
                storage: storage.clone(),
                analytics: analytics.clone(),
                permissions: permissions.clone(),
                auth: auth.clone(),
                retry_policy,
            },
        );
        Self {
            clock,
            scheduler,
            context,
            storage,
            analytics,
            permissions,
            auth,
            log,
        }
    }

    /// Persist an access token, as if a previous session signed in.
    pub fn with_access_token(self, access_token: &str) -> Self {
        AuthStorage::new(self.storage.clone()).store_tokens(&AuthTokens {
            access_token: access_token.into(),
            refresh_token: "persisted-refresh".into(),
        });
        self
    }

    /// Send the foreground transition and pump.
    pub fn enter_foreground(&self) {
        self.context.events().will_enter_foreground.send(());
        self.scheduler.run_until_idle();
    }

    /// Send the background transition and pump.
    pub fn enter_background(&self) {
        self.context.events().did_enter_background.send(());
        self.scheduler.run_until_idle();
    }

    /// Advance manual time and pump whatever came due.
    pub fn advance(&self, delta_ms: u64) {
        self.clock.advance(delta_ms);
        self.scheduler.run_until_idle();
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Install a test tracing subscriber once; later calls are no-ops.
pub fn init_test_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
