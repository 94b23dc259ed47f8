//! Notification detail use case: one subscription per call, errors
//! republished rather than swallowed.

use std::sync::Arc;

use arbor_app::notifications::{NotificationDetailModel, NotificationDetailUseCase};
use arbor_app::DomainError;
use arbor_core::{CancelBag, MainScheduler};
use arbor_testkit::{EventLog, ScriptedNotificationDetailRepository};
use assert_matches::assert_matches;
use parking_lot::Mutex;

struct Harness {
    scheduler: MainScheduler,
    log: EventLog,
    repository: Arc<ScriptedNotificationDetailRepository>,
    use_case: Arc<NotificationDetailUseCase>,
    bag: CancelBag,
}

fn harness() -> Harness {
    let scheduler = MainScheduler::new();
    let log = EventLog::new();
    let repository = ScriptedNotificationDetailRepository::new(&scheduler, log.clone());
    let use_case = NotificationDetailUseCase::new(&scheduler, repository.clone());
    Harness {
        scheduler,
        log,
        repository,
        use_case,
        bag: CancelBag::new(),
    }
}

#[test]
fn read_notification_republishes_success() {
    let harness = harness();
    let seen = Arc::new(Mutex::new(Vec::new()));
    {
        let seen = seen.clone();
        harness
            .use_case
            .read_success()
            .subscribe(move |accepted| seen.lock().push(*accepted))
            .store_in(&harness.bag);
    }

    harness.use_case.read_notification("n-1");
    harness.scheduler.run_until_idle();

    assert_eq!(*seen.lock(), vec![true]);
    assert_eq!(harness.log.count_with_prefix("notifications:read:n-1"), 1);
}

#[test]
fn detail_failure_goes_to_the_failure_source() {
    let harness = harness();
    harness
        .repository
        .set_detail_outcome(Err(DomainError::not_found("n-9")));

    let details: Arc<Mutex<Vec<NotificationDetailModel>>> = Arc::new(Mutex::new(Vec::new()));
    let failures = Arc::new(Mutex::new(Vec::new()));
    {
        let details = details.clone();
        harness
            .use_case
            .detail()
            .subscribe(move |model| details.lock().push(model.clone()))
            .store_in(&harness.bag);
    }
    {
        let failures = failures.clone();
        harness
            .use_case
            .failure()
            .subscribe(move |error| failures.lock().push(error.clone()))
            .store_in(&harness.bag);
    }

    harness.use_case.notification_detail("n-9");
    harness.scheduler.run_until_idle();

    assert!(details.lock().is_empty());
    assert_matches!(&failures.lock()[..], [DomainError::NotFound { .. }]);
}

#[test]
fn each_call_subscribes_to_the_repository_once() {
    let harness = harness();
    harness.use_case.notification_detail("n-1");
    harness.use_case.notification_detail("n-2");
    harness.scheduler.run_until_idle();

    assert_eq!(harness.log.count_with_prefix("notifications:detail:"), 2);
}
