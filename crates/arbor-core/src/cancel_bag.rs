//! Scoped cancellation.
//!
//! A [`CancelBag`] collects the subscriptions created during one unit of
//! work — binding a view model, configuring a cell, preparing the
//! lifecycle adapter — and releases them together. Whoever owns the bag
//! owns the lifetime of every pipeline registered in it: dropping the
//! last handle, or cancelling explicitly, terminates them all before
//! returning.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::event::Subscription;

#[derive(Default)]
struct BagState {
    cancelled: bool,
    subscriptions: Vec<Subscription>,
}

/// A scoped set of subscriptions released together.
///
/// Handles are cheap to clone and share state; the bag cancels when the
/// last handle is dropped.
#[derive(Clone, Default)]
pub struct CancelBag {
    state: Arc<Mutex<BagState>>,
}

impl CancelBag {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a subscription. Storing into a bag that has
    /// already been cancelled cancels the subscription immediately.
    pub fn store(&self, subscription: Subscription) {
        let mut state = self.state.lock();
        if state.cancelled {
            drop(state);
            subscription.cancel();
            return;
        }
        state.subscriptions.push(subscription);
    }

    /// Cancel every held subscription. Synchronous and idempotent: when
    /// this returns, no further event delivery can happen through any of
    /// them, and a second call has no additional effect.
    pub fn cancel(&self) {
        let drained = {
            let mut state = self.state.lock();
            state.cancelled = true;
            std::mem::take(&mut state.subscriptions)
        };
        for subscription in &drained {
            subscription.cancel();
        }
    }

    /// Cancel everything held, then accept new work. Cell reuse: the old
    /// bindings must die before the cell is configured again.
    pub fn reset(&self) {
        self.cancel();
        self.state.lock().cancelled = false;
    }

    /// Number of held subscriptions.
    pub fn len(&self) -> usize {
        self.state.lock().subscriptions.len()
    }

    /// Whether the bag holds no subscriptions.
    pub fn is_empty(&self) -> bool {
        self.state.lock().subscriptions.is_empty()
    }
}

impl std::fmt::Debug for CancelBag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("CancelBag")
            .field("cancelled", &state.cancelled)
            .field("held", &state.subscriptions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventSource;
    use crate::scheduler::MainScheduler;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_pipeline(
        scheduler: &MainScheduler,
        bag: &CancelBag,
    ) -> (EventSource<u32>, Arc<AtomicUsize>) {
        let source = EventSource::new(scheduler);
        let count = Arc::new(AtomicUsize::new(0));
        {
            let count = count.clone();
            source
                .subscribe(move |_| {
                    count.fetch_add(1, Ordering::SeqCst);
                })
                .store_in(bag);
        }
        (source, count)
    }

    #[test]
    fn cancel_stops_all_held_subscriptions() {
        let scheduler = MainScheduler::new();
        let bag = CancelBag::new();
        let (a, count_a) = counting_pipeline(&scheduler, &bag);
        let (b, count_b) = counting_pipeline(&scheduler, &bag);
        assert_eq!(bag.len(), 2);

        bag.cancel();
        a.send(1);
        b.send(2);
        scheduler.run_until_idle();

        assert_eq!(count_a.load(Ordering::SeqCst), 0);
        assert_eq!(count_b.load(Ordering::SeqCst), 0);
        assert!(bag.is_empty());
    }

    #[test]
    fn cancel_twice_has_no_additional_effect() {
        let scheduler = MainScheduler::new();
        let bag = CancelBag::new();
        let (source, count) = counting_pipeline(&scheduler, &bag);

        source.send(1);
        scheduler.run_until_idle();
        bag.cancel();
        bag.cancel();

        source.send(2);
        scheduler.run_until_idle();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn storing_into_a_cancelled_bag_cancels_immediately() {
        let scheduler = MainScheduler::new();
        let bag = CancelBag::new();
        bag.cancel();

        let source: EventSource<u32> = EventSource::new(&scheduler);
        let sub = source.subscribe(|_| {});
        sub.store_in(&bag);
        assert_eq!(source.subscriber_count(), 0);
        assert!(bag.is_empty());
    }

    #[test]
    fn reset_allows_reuse_after_cancelling_old_bindings() {
        let scheduler = MainScheduler::new();
        let bag = CancelBag::new();
        let (old, old_count) = counting_pipeline(&scheduler, &bag);

        bag.reset();
        let (new, new_count) = counting_pipeline(&scheduler, &bag);

        old.send(1);
        new.send(2);
        scheduler.run_until_idle();

        assert_eq!(old_count.load(Ordering::SeqCst), 0);
        assert_eq!(new_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropping_the_last_handle_cancels() {
        let scheduler = MainScheduler::new();
        let source: EventSource<u32> = EventSource::new(&scheduler);
        let count = Arc::new(AtomicUsize::new(0));
        {
            let bag = CancelBag::new();
            let count = count.clone();
            source
                .subscribe(move |_| {
                    count.fetch_add(1, Ordering::SeqCst);
                })
                .store_in(&bag);
        }

        source.send(1);
        scheduler.run_until_idle();
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
