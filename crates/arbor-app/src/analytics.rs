//! Analytics sink boundary.
//!
//! Transport (Amplitude or otherwise) is injected at startup through
//! [`AnalyticsSink`]; the core only produces typed events.

/// A typed analytics event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsEvent {
    /// Whether the user has authorized push notifications, reported once
    /// per foreground transition.
    PushAuthorization {
        /// Current authorization.
        authorized: bool,
    },
}

/// Destination for analytics events.
pub trait AnalyticsSink: Send + Sync {
    /// Record one event.
    fn report(&self, event: AnalyticsEvent);
}
