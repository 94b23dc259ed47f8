//! Coordinators and the flow dependency tree.
//!
//! A coordinator owns one navigation flow: it presents scenes through a
//! router, binds view-model Output to navigation decisions, and owns the
//! child coordinators it spawns. Ownership is strictly downward — a
//! parent holds its children strongly, a child holds a weak back
//! reference — so tearing down a parent tears down its whole subtree.
//!
//! Lifecycle: `Idle` → `Active` on start, `Active` → `Finished` on
//! finish. Finishing clears the children, then invokes the `on_finish`
//! callback the parent wired in, which removes the finished flow from
//! the parent's children. A finished coordinator is never present in any
//! children set.

use std::sync::{Arc, Weak};

use arbor_core::{precondition_failure, MainScheduler};
use indexmap::IndexMap;
use parking_lot::Mutex;
use uuid::Uuid;

/// Identity of a coordinator instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoordinatorId(Uuid);

impl CoordinatorId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for CoordinatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle of a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    /// Constructed, not yet started.
    Idle,
    /// Running; may own children.
    Active,
    /// Terminal. Never present in a parent's children set.
    Finished,
}

/// A request a flow cannot satisfy itself, bubbled up the ancestor
/// chain. The first registered handler that returns `true` consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinationRequest {
    /// Open the cheer overlay for a member outside the current flow.
    OpenCheer {
        /// Community member to cheer for.
        member_id: u64,
    },
    /// Unwind to the app's home surface.
    ReturnHome,
}

type FinishHandler = Arc<dyn Fn() + Send + Sync>;
type RequestHandler = Arc<dyn Fn(&CoordinationRequest) -> bool + Send + Sync>;

/// A navigation flow owner.
///
/// Concrete coordinators embed a [`CoordinatorBase`] and implement
/// `start` as: `self.base().begin()` followed by presenting their first
/// scene and wiring its Output.
pub trait Coordinator: Send + Sync {
    /// The shared lifecycle state.
    fn base(&self) -> &CoordinatorBase;

    /// Begin the flow. Precondition: the flow is `Idle`.
    fn start(self: Arc<Self>);
}

/// Shared state every coordinator embeds: identity, lifecycle, the
/// ordered children set, the weak parent edge and the completion hooks.
pub struct CoordinatorBase {
    id: CoordinatorId,
    scheduler: MainScheduler,
    state: Mutex<FlowState>,
    children: Mutex<IndexMap<CoordinatorId, Arc<dyn Coordinator>>>,
    parent: Mutex<Option<Weak<dyn Coordinator>>>,
    on_finish: Mutex<Option<FinishHandler>>,
    on_request: Mutex<Option<RequestHandler>>,
}

impl CoordinatorBase {
    /// Create an idle coordinator base.
    pub fn new(scheduler: &MainScheduler) -> Self {
        Self {
            id: CoordinatorId::generate(),
            scheduler: scheduler.clone(),
            state: Mutex::new(FlowState::Idle),
            children: Mutex::new(IndexMap::new()),
            parent: Mutex::new(None),
            on_finish: Mutex::new(None),
            on_request: Mutex::new(None),
        }
    }

    /// This coordinator's identity.
    pub fn id(&self) -> CoordinatorId {
        self.id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> FlowState {
        *self.state.lock()
    }

    /// The scheduler this flow runs on.
    pub fn scheduler(&self) -> &MainScheduler {
        &self.scheduler
    }

    /// Transition `Idle` → `Active`. Starting a flow twice, or starting
    /// a finished flow, is a programmer error.
    pub fn begin(&self) {
        self.scheduler.assert_main_context("Coordinator::start");
        let mut state = self.state.lock();
        if *state != FlowState::Idle {
            drop(state);
            precondition_failure("start on a flow that is not idle");
            return;
        }
        *state = FlowState::Active;
        drop(state);
        tracing::debug!(coordinator = %self.id, "flow started");
    }

    /// Terminal transition. In order: mark `Finished`, clear the
    /// children set, invoke the `on_finish` hook so the parent removes
    /// this flow. The caller dismisses its presented content first.
    pub fn finish(&self) {
        self.scheduler.assert_main_context("Coordinator::finish");
        {
            let mut state = self.state.lock();
            if *state != FlowState::Active {
                drop(state);
                precondition_failure("finish on a flow that is not active");
                return;
            }
            *state = FlowState::Finished;
        }
        // Snapshot before mutate: drain under the lock, drop outside it,
        // so a child teardown re-entering this tree sees a consistent map.
        let children: Vec<Arc<dyn Coordinator>> = {
            let mut children = self.children.lock();
            children.drain(..).map(|(_, child)| child).collect()
        };
        drop(children);
        let handler = self.on_finish.lock().take();
        if let Some(handler) = handler {
            handler();
        }
        tracing::debug!(coordinator = %self.id, "flow finished");
    }

    /// Install the completion hook. Wired by the parent before `start`.
    pub fn set_on_finish(&self, handler: impl Fn() + Send + Sync + 'static) {
        *self.on_finish.lock() = Some(Arc::new(handler));
    }

    /// Install a coordination-request handler. Return `true` to consume
    /// the request, `false` to let it keep bubbling.
    pub fn set_request_handler(
        &self,
        handler: impl Fn(&CoordinationRequest) -> bool + Send + Sync + 'static,
    ) {
        *self.on_request.lock() = Some(Arc::new(handler));
    }

    /// The parent flow, if it is still alive.
    pub fn parent(&self) -> Option<Arc<dyn Coordinator>> {
        self.parent.lock().as_ref().and_then(Weak::upgrade)
    }

    /// Number of owned children.
    pub fn child_count(&self) -> usize {
        self.children.lock().len()
    }

    /// Whether `id` is currently an owned child.
    pub fn has_child(&self, id: CoordinatorId) -> bool {
        self.children.lock().contains_key(&id)
    }

    /// Owned child ids in insertion order.
    pub fn child_ids(&self) -> Vec<CoordinatorId> {
        self.children.lock().keys().copied().collect()
    }

    fn set_parent(&self, parent: Weak<dyn Coordinator>) {
        *self.parent.lock() = Some(parent);
    }

    fn handle_request(&self, request: &CoordinationRequest) -> bool {
        let handler = self.on_request.lock().clone();
        match handler {
            Some(handler) => handler(request),
            None => false,
        }
    }
}

impl std::fmt::Debug for CoordinatorBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoordinatorBase")
            .field("id", &self.id)
            .field("state", &self.state())
            .field("children", &self.child_count())
            .finish()
    }
}

/// Append `child` to `parent`'s children, wire the weak back edge, and
/// start the child (`Idle` → `Active`).
pub fn add_dependency(parent: &Arc<dyn Coordinator>, child: Arc<dyn Coordinator>) {
    parent
        .base()
        .scheduler
        .assert_main_context("add_dependency");
    child.base().set_parent(Arc::downgrade(parent));
    parent
        .base()
        .children
        .lock()
        .insert(child.base().id(), child.clone());
    tracing::debug!(
        parent = %parent.base().id(),
        child = %child.base().id(),
        "dependency added"
    );
    child.start();
}

/// Remove a finished child from `parent`'s children. Removing a child
/// that has not finished is a programmer error; removing an unknown id
/// is ignored.
pub fn remove_dependency(parent: &dyn Coordinator, child_id: CoordinatorId) {
    parent
        .base()
        .scheduler
        .assert_main_context("remove_dependency");
    let mut children = parent.base().children.lock();
    match children.get(&child_id) {
        Some(child) if child.base().state() == FlowState::Finished => {
            children.shift_remove(&child_id);
            drop(children);
            tracing::debug!(parent = %parent.base().id(), child = %child_id, "dependency removed");
        }
        Some(_) => {
            drop(children);
            precondition_failure("remove_dependency on a child that has not finished");
        }
        None => {
            drop(children);
            tracing::trace!(child = %child_id, "remove_dependency for unknown child ignored");
        }
    }
}

/// Bubble `request` from `origin` up the ancestor chain. Returns whether
/// any handler consumed it. A request nobody handles is dropped loudly —
/// that is the documented default, not a silent fall-through.
pub fn request_coordinating(origin: &Arc<dyn Coordinator>, request: CoordinationRequest) -> bool {
    origin
        .base()
        .scheduler
        .assert_main_context("request_coordinating");
    let mut current = Some(origin.clone());
    while let Some(node) = current {
        if node.base().handle_request(&request) {
            tracing::debug!(
                handled_by = %node.base().id(),
                ?request,
                "coordination request handled"
            );
            return true;
        }
        current = node.base().parent();
    }
    tracing::error!(
        origin = %origin.base().id(),
        ?request,
        "coordination request dropped: no handler in the ancestor chain"
    );
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TestFlow {
        base: CoordinatorBase,
    }

    impl TestFlow {
        fn create(scheduler: &MainScheduler) -> Arc<dyn Coordinator> {
            Arc::new(Self {
                base: CoordinatorBase::new(scheduler),
            })
        }
    }

    impl Coordinator for TestFlow {
        fn base(&self) -> &CoordinatorBase {
            &self.base
        }

        fn start(self: Arc<Self>) {
            self.base.begin();
        }
    }

    fn wire_removal(parent: &Arc<dyn Coordinator>, child: &Arc<dyn Coordinator>) {
        let parent_weak = Arc::downgrade(parent);
        let child_id = child.base().id();
        child.base().set_on_finish(move || {
            if let Some(parent) = parent_weak.upgrade() {
                remove_dependency(parent.as_ref(), child_id);
            }
        });
    }

    #[test]
    fn child_finish_removes_it_without_finishing_the_parent() {
        let scheduler = MainScheduler::new();
        let parent = TestFlow::create(&scheduler);
        parent.clone().start();

        let child = TestFlow::create(&scheduler);
        let child_id = child.base().id();
        wire_removal(&parent, &child);
        add_dependency(&parent, child.clone());

        assert_eq!(child.base().state(), FlowState::Active);
        assert!(parent.base().has_child(child_id));

        child.base().finish();

        assert_eq!(child.base().state(), FlowState::Finished);
        assert!(!parent.base().has_child(child_id));
        // The parent keeps running; its own finish requires an explicit
        // call from whoever owns it.
        assert_eq!(parent.base().state(), FlowState::Active);
    }

    #[test]
    fn children_keep_insertion_order_under_fanout() {
        let scheduler = MainScheduler::new();
        let parent = TestFlow::create(&scheduler);
        parent.clone().start();

        let first = TestFlow::create(&scheduler);
        let second = TestFlow::create(&scheduler);
        let ids = [first.base().id(), second.base().id()];
        wire_removal(&parent, &first);
        wire_removal(&parent, &second);
        add_dependency(&parent, first);
        add_dependency(&parent, second);

        assert_eq!(parent.base().child_ids(), ids);
    }

    #[test]
    fn finishing_the_parent_clears_children() {
        let scheduler = MainScheduler::new();
        let parent = TestFlow::create(&scheduler);
        parent.clone().start();

        let child = TestFlow::create(&scheduler);
        wire_removal(&parent, &child);
        add_dependency(&parent, child.clone());

        parent.base().finish();
        assert_eq!(parent.base().child_count(), 0);

        // The orphaned child can still finish; its removal handler finds
        // nothing to remove and must not corrupt the parent.
        child.base().finish();
        assert_eq!(parent.base().child_count(), 0);
    }

    #[test]
    #[should_panic(expected = "not idle")]
    fn starting_twice_fails_fast() {
        let scheduler = MainScheduler::new();
        let flow = TestFlow::create(&scheduler);
        flow.clone().start();
        flow.start();
    }

    #[test]
    #[should_panic(expected = "has not finished")]
    fn removing_an_active_child_fails_fast() {
        let scheduler = MainScheduler::new();
        let parent = TestFlow::create(&scheduler);
        parent.clone().start();

        let child = TestFlow::create(&scheduler);
        let child_id = child.base().id();
        add_dependency(&parent, child);
        remove_dependency(parent.as_ref(), child_id);
    }

    #[test]
    fn requests_bubble_to_the_first_handler() {
        let scheduler = MainScheduler::new();
        let grandparent = TestFlow::create(&scheduler);
        grandparent.clone().start();
        let parent = TestFlow::create(&scheduler);
        let child = TestFlow::create(&scheduler);
        add_dependency(&grandparent, parent.clone());
        add_dependency(&parent, child.clone());

        let handled = Arc::new(AtomicUsize::new(0));
        {
            let handled = handled.clone();
            grandparent.base().set_request_handler(move |request| {
                assert_eq!(request, &CoordinationRequest::ReturnHome);
                handled.fetch_add(1, Ordering::SeqCst);
                true
            });
        }

        assert!(request_coordinating(&child, CoordinationRequest::ReturnHome));
        assert_eq!(handled.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unhandled_requests_are_dropped_not_panicked() {
        let scheduler = MainScheduler::new();
        let parent = TestFlow::create(&scheduler);
        parent.clone().start();
        let child = TestFlow::create(&scheduler);
        add_dependency(&parent, child.clone());

        // A handler that declines keeps the request bubbling; with no
        // ancestor accepting it, the request reports unhandled.
        child.base().set_request_handler(|_| false);
        assert!(!request_coordinating(
            &child,
            CoordinationRequest::OpenCheer { member_id: 7 }
        ));
        assert_eq!(parent.base().state(), FlowState::Active);
    }
}
