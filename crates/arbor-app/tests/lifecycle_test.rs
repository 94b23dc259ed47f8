//! Lifecycle adapter behavior: the foreground pipeline, reissuance
//! gating on the persisted token, the retry schedule and the session
//! model.

use arbor_app::auth::{AuthStorage, RetryPolicy};
use arbor_app::{
    AdapterState, AnalyticsEvent, AppLifecycleAdapter, DomainError, SessionState,
};
use arbor_core::CancelBag;
use arbor_testkit::{init_test_tracing, TestContext};
use assert_matches::assert_matches;
use parking_lot::Mutex;
use std::sync::Arc;

#[test]
fn foreground_with_token_reissues_once_then_reports_permission() {
    init_test_tracing();
    let harness = TestContext::new().with_access_token("abc123");
    let adapter = AppLifecycleAdapter::new(harness.context.clone());
    adapter.prepare();
    assert_eq!(adapter.state(), AdapterState::Prepared);

    harness.enter_foreground();

    assert_eq!(harness.auth.call_count(), 1);
    assert_eq!(harness.permissions.query_count(), 1);
    assert_eq!(
        harness.analytics.events(),
        vec![AnalyticsEvent::PushAuthorization { authorized: true }]
    );

    let reissued_at = harness.log.first_index_with_prefix("auth:reissue");
    let reported_at = harness
        .log
        .first_index_with_prefix("analytics:push_authorization");
    assert_matches!((reissued_at, reported_at), (Some(r), Some(p)) if r < p);
}

#[test]
fn foreground_without_token_skips_reissuance_but_still_reports() {
    let harness = TestContext::new();
    let adapter = AppLifecycleAdapter::new(harness.context.clone());
    adapter.prepare();

    harness.enter_foreground();

    assert_eq!(harness.auth.call_count(), 0);
    assert_eq!(
        harness.analytics.events(),
        vec![AnalyticsEvent::PushAuthorization { authorized: true }]
    );
}

#[test]
fn each_foreground_transition_runs_the_pipeline_once() {
    let harness = TestContext::new().with_access_token("abc123");
    let adapter = AppLifecycleAdapter::new(harness.context.clone());
    adapter.prepare();

    harness.enter_foreground();
    harness.enter_foreground();

    assert_eq!(harness.auth.call_count(), 2);
    assert_eq!(harness.permissions.query_count(), 2);
    assert_eq!(harness.analytics.events().len(), 2);
}

#[test]
fn background_transition_is_a_noop() {
    let harness = TestContext::new().with_access_token("abc123");
    let adapter = AppLifecycleAdapter::new(harness.context.clone());
    adapter.prepare();

    harness.enter_background();

    assert_eq!(harness.auth.call_count(), 0);
    assert!(harness.analytics.events().is_empty());
    assert!(harness.log.entries().is_empty());
}

#[test]
#[should_panic(expected = "prepared twice")]
fn preparing_twice_fails_fast() {
    let harness = TestContext::new();
    let adapter = AppLifecycleAdapter::new(harness.context.clone());
    adapter.prepare();
    adapter.prepare();
}

#[test]
fn dropping_the_adapter_cancels_its_observations() {
    let harness = TestContext::new().with_access_token("abc123");
    let adapter = AppLifecycleAdapter::new(harness.context.clone());
    adapter.prepare();
    drop(adapter);

    harness.enter_foreground();

    assert_eq!(harness.auth.call_count(), 0);
    assert!(harness.analytics.events().is_empty());
}

#[test]
fn successful_reissuance_persists_tokens_and_activates_the_session() {
    let harness = TestContext::new().with_access_token("abc123");
    let adapter = AppLifecycleAdapter::new(harness.context.clone());
    adapter.prepare();

    harness.enter_foreground();

    let storage = AuthStorage::new(harness.storage.clone());
    assert_eq!(storage.access_token().as_deref(), Some("reissued-access"));
    assert_eq!(harness.context.session().state(), SessionState::Active);
}

#[test]
fn reissuance_retries_after_backoff_then_succeeds() {
    let policy = RetryPolicy {
        max_attempts: 3,
        base_delay_ms: 100,
        max_jitter_ms: 50,
    };
    let harness = TestContext::with_policy(policy).with_access_token("abc123");
    harness
        .auth
        .script_outcome(Err(DomainError::network("gateway timeout")));
    let adapter = AppLifecycleAdapter::new(harness.context.clone());
    adapter.prepare();

    harness.enter_foreground();
    assert_eq!(harness.auth.call_count(), 1);
    assert!(harness.scheduler.has_pending_work());

    harness.advance(policy.max_delay_after_ms(1));
    assert_eq!(harness.auth.call_count(), 2);
    assert_eq!(harness.context.session().state(), SessionState::Active);
    assert!(!harness.scheduler.has_pending_work());
}

#[test]
fn exhausted_reissuance_surfaces_a_terminal_failure() {
    let policy = RetryPolicy {
        max_attempts: 3,
        base_delay_ms: 100,
        max_jitter_ms: 50,
    };
    let harness = TestContext::with_policy(policy).with_access_token("abc123");
    harness
        .auth
        .script_failures(3, DomainError::network("gateway timeout"));
    let adapter = AppLifecycleAdapter::new(harness.context.clone());
    adapter.prepare();

    let bag = CancelBag::new();
    let failures = Arc::new(Mutex::new(Vec::new()));
    {
        let failures = failures.clone();
        adapter
            .reissue_use_case()
            .refresh_failed()
            .subscribe(move |error| failures.lock().push(error.clone()))
            .store_in(&bag);
    }

    harness.enter_foreground();
    harness.advance(policy.max_delay_after_ms(1));
    harness.advance(policy.max_delay_after_ms(2));

    assert_eq!(harness.auth.call_count(), 3);
    let failures = failures.lock();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].attempts, 3);
    assert_matches!(failures[0].last_error, DomainError::Network { .. });
    assert_eq!(
        harness.context.session().state(),
        SessionState::NeedsReauthentication
    );

    // The chain is spent; nothing further is scheduled.
    drop(failures);
    harness.advance(60_000);
    assert_eq!(harness.auth.call_count(), 3);
}

#[test]
fn session_recovers_on_the_next_successful_refresh() {
    let policy = RetryPolicy {
        max_attempts: 1,
        base_delay_ms: 100,
        max_jitter_ms: 0,
    };
    let harness = TestContext::with_policy(policy).with_access_token("abc123");
    harness
        .auth
        .script_outcome(Err(DomainError::network("gateway timeout")));
    let adapter = AppLifecycleAdapter::new(harness.context.clone());
    adapter.prepare();

    harness.enter_foreground();
    assert_eq!(
        harness.context.session().state(),
        SessionState::NeedsReauthentication
    );

    harness.enter_foreground();
    assert_eq!(harness.context.session().state(), SessionState::Active);
}
