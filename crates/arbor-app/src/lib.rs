//! # Arbor application layer
//!
//! Everything above the navigation kit and below the platform shells:
//!
//! - [`AppContext`] / [`AppEvents`]: the explicit process-wide context,
//!   constructed once at startup
//! - [`AppLifecycleAdapter`]: foreground/background observer driving
//!   token reissuance and the permission analytics report
//! - `auth`: token model, persisted storage binding, bounded-retry
//!   reissuance and the session-state model
//! - `notifications`: the notification-detail use case
//! - `briefing` / `cheer`: the daily-briefing flows and the cheer sheet
//!   boundary they fan out into
//! - `deeplink`: member profile URLs in an embedded web view
//!
//! Storage engines, analytics transports, permission APIs and network
//! stacks live outside; they arrive as trait objects in [`AppContext`].

pub mod analytics;
pub mod auth;
pub mod briefing;
pub mod cheer;
pub mod context;
pub mod deeplink;
pub mod errors;
pub mod lifecycle;
pub mod main_feed;
pub mod notifications;
pub mod permissions;
pub mod storage;

pub use analytics::{AnalyticsEvent, AnalyticsSink};
pub use auth::{
    AuthRefreshError, AuthService, AuthStorage, AuthTokens, ReissueTokensUseCase, RetryPolicy,
    SessionState, SessionStore,
};
pub use context::{AppContext, AppEvents, AppServices};
pub use errors::DomainError;
pub use lifecycle::{AdapterState, AppLifecycleAdapter};
pub use permissions::{NotificationPermissions, PermissionStatus};
pub use storage::KeyValueStore;
