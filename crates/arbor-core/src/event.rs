//! Event sources and subscriptions.
//!
//! An [`EventSource`] is a named stream of values — the Input sources a
//! view owns and the Output sources a view model produces are both this
//! type. Emission may happen on any thread; delivery always happens on
//! the main scheduling context, one queued task per subscriber.
//!
//! Cancellation is synchronous. Once [`Subscription::cancel`] (or the
//! owning bag's cancel) returns, no further value is delivered through
//! that subscription — including values that were already queued for
//! delivery but not yet pumped. The queued task re-checks the cancelled
//! flag on the main context before invoking the handler.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::cancel_bag::CancelBag;
use crate::scheduler::MainScheduler;

type Handler<T> = Box<dyn Fn(&T) + Send + Sync>;

struct Sink<T> {
    id: u64,
    cancelled: AtomicBool,
    handler: Handler<T>,
}

struct SourceInner<T> {
    scheduler: MainScheduler,
    subscribers: Mutex<Vec<Arc<Sink<T>>>>,
    next_id: AtomicU64,
}

/// A stream of values delivered on the main scheduling context.
///
/// Handles are cheap to clone and share one subscriber table.
pub struct EventSource<T> {
    inner: Arc<SourceInner<T>>,
}

impl<T> Clone for EventSource<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + Send + 'static> EventSource<T> {
    /// Create a source delivering through the given scheduler.
    pub fn new(scheduler: &MainScheduler) -> Self {
        Self {
            inner: Arc::new(SourceInner {
                scheduler: scheduler.clone(),
                subscribers: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Emit a value to every current subscriber. Callable from any
    /// thread; each delivery is queued onto the main context and skipped
    /// there if the subscription has been cancelled in the meantime.
    pub fn send(&self, value: T) {
        let sinks: Vec<Arc<Sink<T>>> = self.inner.subscribers.lock().clone();
        for sink in sinks {
            if sink.cancelled.load(Ordering::Acquire) {
                continue;
            }
            let value = value.clone();
            self.inner.scheduler.post(move || {
                if !sink.cancelled.load(Ordering::Acquire) {
                    (sink.handler)(&value);
                }
            });
        }
    }

    /// Register a handler. The handler runs on the main context only.
    #[must_use = "dropping a subscription cancels it; store it in a CancelBag"]
    pub fn subscribe(&self, handler: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let sink = Arc::new(Sink {
            id,
            cancelled: AtomicBool::new(false),
            handler: Box::new(handler),
        });
        self.inner.subscribers.lock().push(sink.clone());
        Subscription {
            state: Arc::new(SourceSubscription {
                sink,
                source: Arc::downgrade(&self.inner),
            }),
        }
    }

    /// Register a handler bound to a weak owner. If the owner has been
    /// destroyed by delivery time the emission is dropped.
    #[must_use = "dropping a subscription cancels it; store it in a CancelBag"]
    pub fn subscribe_weak<O>(
        &self,
        owner: &Arc<O>,
        handler: impl Fn(&Arc<O>, &T) + Send + Sync + 'static,
    ) -> Subscription
    where
        O: Send + Sync + 'static,
    {
        let weak = Arc::downgrade(owner);
        self.subscribe(move |value| {
            let Some(owner) = weak.upgrade() else {
                return;
            };
            handler(&owner, value);
        })
    }

    /// Number of live subscriptions, for tests.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().len()
    }
}

impl<T> std::fmt::Debug for EventSource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSource")
            .field("subscribers", &self.inner.subscribers.lock().len())
            .finish()
    }
}

trait CancelState: Send + Sync {
    fn cancel(&self);
    fn is_cancelled(&self) -> bool;
}

struct SourceSubscription<T> {
    sink: Arc<Sink<T>>,
    source: Weak<SourceInner<T>>,
}

impl<T: 'static> CancelState for SourceSubscription<T> {
    fn cancel(&self) {
        if self.sink.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(source) = self.source.upgrade() {
            source.subscribers.lock().retain(|s| s.id != self.sink.id);
        }
    }

    fn is_cancelled(&self) -> bool {
        self.sink.cancelled.load(Ordering::Acquire)
    }
}

/// Handle to one registered handler. Cancelling is synchronous and
/// idempotent; dropping the handle cancels it.
#[must_use = "dropping a subscription cancels it; store it in a CancelBag"]
pub struct Subscription {
    state: Arc<dyn CancelState>,
}

impl Subscription {
    /// Cancel this subscription. After this returns no further value is
    /// delivered through it, queued or not.
    pub fn cancel(&self) {
        self.state.cancel();
    }

    /// Whether the subscription has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.state.is_cancelled()
    }

    /// Hand ownership to a bag so it terminates with the bag's owner.
    pub fn store_in(self, bag: &CancelBag) {
        bag.store(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.state.cancel();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
