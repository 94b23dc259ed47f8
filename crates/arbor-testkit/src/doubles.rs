//! Scripted boundary doubles.
//!
//! All doubles are deterministic: outcomes are scripted up front,
//! emissions go through the scheduler (never before the caller
//! subscribes), and every observation lands in the shared [`EventLog`].

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use arbor_app::analytics::{AnalyticsEvent, AnalyticsSink};
use arbor_app::auth::{AuthService, AuthTokens};
use arbor_app::briefing::{
    BriefingCardModel, BriefingCardViewModel, BriefingFeatureBuildable, BriefingMainViewModel,
    BriefingRepository, BriefingResultModel, BriefingResultViewModel,
};
use arbor_app::cheer::{
    CheerFeatureBuildable, CheerMessageKind, CheerMessageSheetViewModel, CheerSheet,
};
use arbor_app::errors::DomainError;
use arbor_app::notifications::{NotificationDetailModel, NotificationDetailRepository};
use arbor_app::permissions::{NotificationPermissions, PermissionStatus};
use arbor_app::storage::KeyValueStore;
use arbor_core::{EventSource, MainScheduler};
use arbor_flow::{Scene, SceneView};
use parking_lot::Mutex;

use crate::log::EventLog;

/// Build a one-shot source that emits `value` on the next pump, after
/// the caller has had a chance to subscribe.
pub fn deferred<T: Clone + Send + 'static>(scheduler: &MainScheduler, value: T) -> EventSource<T> {
    let source = EventSource::new(scheduler);
    let emit = source.clone();
    scheduler.post(move || emit.send(value));
    source
}

// ─── Storage ────────────────────────────────────────────────────────────

/// In-memory namespaced key-value store.
#[derive(Default)]
pub struct InMemoryKeyValueStore {
    values: Mutex<HashMap<(String, String), String>>,
}

impl InMemoryKeyValueStore {
    /// Create an empty store.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.values.lock().is_empty()
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get(&self, namespace: &str, key: &str) -> Option<String> {
        self.values
            .lock()
            .get(&(namespace.to_string(), key.to_string()))
            .cloned()
    }

    fn set(&self, namespace: &str, key: &str, value: String) {
        self.values
            .lock()
            .insert((namespace.to_string(), key.to_string()), value);
    }

    fn remove(&self, namespace: &str, key: &str) {
        self.values
            .lock()
            .remove(&(namespace.to_string(), key.to_string()));
    }
}

// ─── Analytics ──────────────────────────────────────────────────────────

/// Records every reported event, in order.
pub struct RecordingAnalytics {
    log: EventLog,
    events: Mutex<Vec<AnalyticsEvent>>,
}

impl RecordingAnalytics {
    /// Create a sink recording into `log`.
    pub fn new(log: EventLog) -> Arc<Self> {
        Arc::new(Self {
            log,
            events: Mutex::new(Vec::new()),
        })
    }

    /// All reported events.
    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.events.lock().clone()
    }
}

impl AnalyticsSink for RecordingAnalytics {
    fn report(&self, event: AnalyticsEvent) {
        let AnalyticsEvent::PushAuthorization { authorized } = &event;
        self.log
            .record(format!("analytics:push_authorization:{authorized}"));
        self.events.lock().push(event);
    }
}

// ─── Auth ───────────────────────────────────────────────────────────────

/// Auth backend double with scripted reissue outcomes.
///
/// An unscripted call succeeds with a fresh placeholder pair.
pub struct ScriptedAuthService {
    scheduler: MainScheduler,
    log: EventLog,
    script: Mutex<VecDeque<Result<AuthTokens, DomainError>>>,
    calls: AtomicUsize,
}

impl ScriptedAuthService {
    /// Create the double.
    pub fn new(scheduler: &MainScheduler, log: EventLog) -> Arc<Self> {
        Arc::new(Self {
            scheduler: scheduler.clone(),
            log,
            script: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        })
    }

    /// Queue the outcome of the next reissue call.
    pub fn script_outcome(&self, outcome: Result<AuthTokens, DomainError>) {
        self.script.lock().push_back(outcome);
    }

    /// Queue `count` failures.
    pub fn script_failures(&self, count: usize, error: DomainError) {
        let mut script = self.script.lock();
        for _ in 0..count {
            script.push_back(Err(error.clone()));
        }
    }

    /// How many reissue calls were made.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AuthService for ScriptedAuthService {
    fn reissue(&self) -> EventSource<Result<AuthTokens, DomainError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.record("auth:reissue");
        let outcome = self.script.lock().pop_front().unwrap_or_else(|| {
            Ok(AuthTokens {
                access_token: "reissued-access".into(),
                refresh_token: "reissued-refresh".into(),
            })
        });
        deferred(&self.scheduler, outcome)
    }
}

// ─── Permissions ────────────────────────────────────────────────────────

/// Notification-permission double with a fixed (settable) status.
pub struct ScriptedPermissions {
    scheduler: MainScheduler,
    log: EventLog,
    status: Mutex<PermissionStatus>,
    queries: AtomicUsize,
}

impl ScriptedPermissions {
    /// Create the double answering `status`.
    pub fn new(scheduler: &MainScheduler, log: EventLog, status: PermissionStatus) -> Arc<Self> {
        Arc::new(Self {
            scheduler: scheduler.clone(),
            log,
            status: Mutex::new(status),
            queries: AtomicUsize::new(0),
        })
    }

    /// Change the answered status.
    pub fn set_status(&self, status: PermissionStatus) {
        *self.status.lock() = status;
    }

    /// How many queries were made.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl NotificationPermissions for ScriptedPermissions {
    fn authorization_status(&self) -> EventSource<PermissionStatus> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.log.record("permissions:query");
        deferred(&self.scheduler, *self.status.lock())
    }
}

// ─── Repositories ───────────────────────────────────────────────────────

/// A briefing the doubles hand out by default.
pub fn sample_briefing() -> BriefingResultModel {
    BriefingResultModel {
        member_id: 42,
        member_name: "Dana".into(),
        message: "A good day to ship something small.".into(),
        date: "2024-09-21".into(),
    }
}

/// A card the doubles hand out by default.
pub fn sample_card() -> BriefingCardModel {
    BriefingCardModel {
        card_id: 7,
        name: "Steady Hands".into(),
        image_url: "https://cdn.example.com/cards/7.png".into(),
        description: "Earned by showing up two weeks straight.".into(),
    }
}

/// Briefing repository double with a scripted outcome.
pub struct ScriptedBriefingRepository {
    scheduler: MainScheduler,
    log: EventLog,
    outcome: Mutex<Result<BriefingResultModel, DomainError>>,
}

impl ScriptedBriefingRepository {
    /// Create the double answering [`sample_briefing`].
    pub fn new(scheduler: &MainScheduler, log: EventLog) -> Arc<Self> {
        Arc::new(Self {
            scheduler: scheduler.clone(),
            log,
            outcome: Mutex::new(Ok(sample_briefing())),
        })
    }

    /// Replace the scripted outcome.
    pub fn set_outcome(&self, outcome: Result<BriefingResultModel, DomainError>) {
        *self.outcome.lock() = outcome;
    }
}

impl BriefingRepository for ScriptedBriefingRepository {
    fn daily_briefing(&self, date: &str) -> EventSource<Result<BriefingResultModel, DomainError>> {
        self.log.record(format!("briefing:fetch:{date}"));
        deferred(&self.scheduler, self.outcome.lock().clone())
    }
}

/// Notification repository double with scripted outcomes.
pub struct ScriptedNotificationDetailRepository {
    scheduler: MainScheduler,
    log: EventLog,
    read_outcome: Mutex<Result<bool, DomainError>>,
    detail_outcome: Mutex<Result<NotificationDetailModel, DomainError>>,
}

impl ScriptedNotificationDetailRepository {
    /// Create the double with succeeding defaults.
    pub fn new(scheduler: &MainScheduler, log: EventLog) -> Arc<Self> {
        Arc::new(Self {
            scheduler: scheduler.clone(),
            log,
            read_outcome: Mutex::new(Ok(true)),
            detail_outcome: Mutex::new(Ok(NotificationDetailModel {
                id: "n-1".into(),
                title: "Meetup reminder".into(),
                content: "Doors open at seven.".into(),
                category: "NOTICE".into(),
                created_at: "2024-09-20T10:00:00Z".into(),
            })),
        })
    }

    /// Replace the read outcome.
    pub fn set_read_outcome(&self, outcome: Result<bool, DomainError>) {
        *self.read_outcome.lock() = outcome;
    }

    /// Replace the detail outcome.
    pub fn set_detail_outcome(&self, outcome: Result<NotificationDetailModel, DomainError>) {
        *self.detail_outcome.lock() = outcome;
    }
}

impl NotificationDetailRepository for ScriptedNotificationDetailRepository {
    fn read_notification(&self, notification_id: &str) -> EventSource<Result<bool, DomainError>> {
        self.log.record(format!("notifications:read:{notification_id}"));
        deferred(&self.scheduler, self.read_outcome.lock().clone())
    }

    fn notification_detail(
        &self,
        notification_id: &str,
    ) -> EventSource<Result<NotificationDetailModel, DomainError>> {
        self.log
            .record(format!("notifications:detail:{notification_id}"));
        deferred(&self.scheduler, self.detail_outcome.lock().clone())
    }
}

// ─── Factories ──────────────────────────────────────────────────────────

/// Briefing factory producing tagged headless scenes.
pub struct StubBriefingFactory {
    scheduler: MainScheduler,
}

impl StubBriefingFactory {
    /// Create the factory.
    pub fn new(scheduler: &MainScheduler) -> Arc<Self> {
        Arc::new(Self {
            scheduler: scheduler.clone(),
        })
    }
}

impl BriefingFeatureBuildable for StubBriefingFactory {
    fn make_briefing_main_scene(&self, date_line: &str) -> Scene<BriefingMainViewModel> {
        Scene::new(
            SceneView::new("briefing-main"),
            Arc::new(BriefingMainViewModel::new(&self.scheduler, date_line)),
        )
    }

    fn make_briefing_result_scene(
        &self,
        model: &BriefingResultModel,
    ) -> Scene<BriefingResultViewModel> {
        Scene::new(
            SceneView::new("briefing-result"),
            Arc::new(BriefingResultViewModel::new(&self.scheduler, model.clone())),
        )
    }

    fn make_briefing_card_scene(&self, model: &BriefingCardModel) -> Scene<BriefingCardViewModel> {
        Scene::new(
            SceneView::new("briefing-card"),
            Arc::new(BriefingCardViewModel::new(&self.scheduler, model.clone())),
        )
    }
}

/// Cheer factory producing tagged headless sheets.
pub struct StubCheerFactory {
    scheduler: MainScheduler,
    minimum_content_height: u32,
}

impl StubCheerFactory {
    /// Create the factory with a fixed sheet height.
    pub fn new(scheduler: &MainScheduler, minimum_content_height: u32) -> Arc<Self> {
        Arc::new(Self {
            scheduler: scheduler.clone(),
            minimum_content_height,
        })
    }
}

impl CheerFeatureBuildable for StubCheerFactory {
    fn make_message_sheet(&self, kind: CheerMessageKind) -> CheerSheet {
        CheerSheet {
            scene: Scene::new(
                SceneView::new("cheer-sheet"),
                Arc::new(CheerMessageSheetViewModel::new(&self.scheduler, kind)),
            ),
            minimum_content_height: self.minimum_content_height,
        }
    }
}
