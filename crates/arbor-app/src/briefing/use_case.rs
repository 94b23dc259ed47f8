//! Daily-briefing domain logic.

use std::sync::{Arc, Weak};

use arbor_core::{CancelBag, EventSource, MainScheduler};

use crate::errors::DomainError;

use super::models::BriefingResultModel;

/// Briefing I/O boundary. Result sources are one-shot, keyed by date;
/// implementations must not emit before the caller has subscribed.
pub trait BriefingRepository: Send + Sync {
    /// Load the member's briefing for `date`.
    fn daily_briefing(&self, date: &str) -> EventSource<Result<BriefingResultModel, DomainError>>;
}

/// Fetches briefings and republishes the outcome.
pub struct DailyBriefingUseCase {
    repository: Arc<dyn BriefingRepository>,
    cancel_bag: CancelBag,
    result: EventSource<BriefingResultModel>,
    failure: EventSource<DomainError>,
    weak_self: Weak<Self>,
}

impl DailyBriefingUseCase {
    /// Create the use case.
    pub fn new(scheduler: &MainScheduler, repository: Arc<dyn BriefingRepository>) -> Arc<Self> {
        Arc::new_cyclic(|weak_self| Self {
            repository,
            cancel_bag: CancelBag::new(),
            result: EventSource::new(scheduler),
            failure: EventSource::new(scheduler),
            weak_self: weak_self.clone(),
        })
    }

    /// Emits every successfully loaded briefing.
    pub fn result(&self) -> EventSource<BriefingResultModel> {
        self.result.clone()
    }

    /// Emits every fetch failure.
    pub fn failure(&self) -> EventSource<DomainError> {
        self.failure.clone()
    }

    /// Load the briefing for `date`.
    pub fn fetch_daily_briefing(&self, date: &str) {
        let Some(this) = self.weak_self.upgrade() else {
            return;
        };
        self.repository
            .daily_briefing(date)
            .subscribe_weak(&this, |owner, result| match result {
                Ok(model) => owner.result.send(model.clone()),
                Err(error) => {
                    tracing::warn!(%error, "daily briefing fetch failed");
                    owner.failure.send(error.clone());
                }
            })
            .store_in(&self.cancel_bag);
    }
}
