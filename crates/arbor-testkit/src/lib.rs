//! # Arbor testkit
//!
//! Deterministic doubles for every boundary the app layer depends on,
//! plus a harness that assembles them into an `AppContext` running on
//! manual time. Emissions are always deferred through the scheduler, so
//! a test observes nothing until it pumps.

pub mod doubles;
pub mod harness;
pub mod log;

pub use doubles::{
    deferred, sample_briefing, sample_card, InMemoryKeyValueStore, RecordingAnalytics,
    ScriptedAuthService, ScriptedBriefingRepository, ScriptedNotificationDetailRepository,
    ScriptedPermissions, StubBriefingFactory, StubCheerFactory,
};
pub use harness::{init_test_tracing, TestContext};
pub use log::EventLog;
