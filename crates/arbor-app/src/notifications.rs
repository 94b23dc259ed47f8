//! Notification detail domain.
//!
//! Repository performs the I/O; the use case subscribes once per call,
//! maps domain errors and republishes through its own sources without
//! swallowing anything.

use std::sync::{Arc, Weak};

use arbor_core::{CancelBag, EventSource, MainScheduler};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// One notification, fully loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationDetailModel {
    /// Backend identifier.
    pub id: String,
    /// Title line.
    pub title: String,
    /// Body content.
    pub content: String,
    /// Backend category tag.
    pub category: String,
    /// Creation timestamp, backend-formatted.
    pub created_at: String,
}

/// Notification I/O boundary. Result sources are one-shot, keyed by the
/// notification id; implementations must not emit before the caller has
/// subscribed.
pub trait NotificationDetailRepository: Send + Sync {
    /// Mark a notification read. Emits whether the backend accepted it.
    fn read_notification(&self, notification_id: &str) -> EventSource<Result<bool, DomainError>>;

    /// Load one notification.
    fn notification_detail(
        &self,
        notification_id: &str,
    ) -> EventSource<Result<NotificationDetailModel, DomainError>>;
}

/// Drives the notification-detail screen's domain logic.
pub struct NotificationDetailUseCase {
    repository: Arc<dyn NotificationDetailRepository>,
    cancel_bag: CancelBag,
    read_success: EventSource<bool>,
    detail: EventSource<NotificationDetailModel>,
    failure: EventSource<DomainError>,
    weak_self: Weak<Self>,
}

impl NotificationDetailUseCase {
    /// Create the use case.
    pub fn new(
        scheduler: &MainScheduler,
        repository: Arc<dyn NotificationDetailRepository>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak_self| Self {
            repository,
            cancel_bag: CancelBag::new(),
            read_success: EventSource::new(scheduler),
            detail: EventSource::new(scheduler),
            failure: EventSource::new(scheduler),
            weak_self: weak_self.clone(),
        })
    }

    /// Emits whether the backend accepted a read receipt.
    pub fn read_success(&self) -> EventSource<bool> {
        self.read_success.clone()
    }

    /// Emits loaded notification details.
    pub fn detail(&self) -> EventSource<NotificationDetailModel> {
        self.detail.clone()
    }

    /// Emits every repository failure.
    pub fn failure(&self) -> EventSource<DomainError> {
        self.failure.clone()
    }

    /// Mark `notification_id` read.
    pub fn read_notification(&self, notification_id: &str) {
        let Some(this) = self.weak_self.upgrade() else {
            return;
        };
        self.repository
            .read_notification(notification_id)
            .subscribe_weak(&this, |owner, result| match result {
                Ok(success) => owner.read_success.send(*success),
                Err(error) => {
                    tracing::warn!(%error, "read notification failed");
                    owner.failure.send(error.clone());
                }
            })
            .store_in(&self.cancel_bag);
    }

    /// Load `notification_id`.
    pub fn notification_detail(&self, notification_id: &str) {
        let Some(this) = self.weak_self.upgrade() else {
            return;
        };
        self.repository
            .notification_detail(notification_id)
            .subscribe_weak(&this, |owner, result| match result {
                Ok(model) => owner.detail.send(model.clone()),
                Err(error) => {
                    tracing::warn!(%error, "notification detail failed");
                    owner.failure.send(error.clone());
                }
            })
            .store_in(&self.cancel_bag);
    }
}
