//! Scene views.
//!
//! Rendering lives in the platform shells; here a view is the unit of
//! presentation lifetime. A [`SceneView`] owns the [`CancelBag`] its
//! bindings are registered in, so dropping the last strong handle tears
//! every binding down — no Output event reaches a destroyed view.

use std::sync::{Arc, Weak};

use arbor_core::CancelBag;
use uuid::Uuid;

/// Identity of a scene view instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(Uuid);

impl ViewId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ViewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug)]
struct ViewState {
    id: ViewId,
    tag: String,
    cancel_bag: CancelBag,
}

/// Strong handle to a presented view. The navigation surface holds these
/// while the view is presented; coordinators keep weak handles.
#[derive(Debug, Clone)]
pub struct SceneView {
    state: Arc<ViewState>,
}

impl SceneView {
    /// Create a view tagged for diagnostics (e.g. `"briefing-result"`).
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            state: Arc::new(ViewState {
                id: ViewId::generate(),
                tag: tag.into(),
                cancel_bag: CancelBag::new(),
            }),
        }
    }

    /// The view's identity.
    pub fn id(&self) -> ViewId {
        self.state.id
    }

    /// Diagnostic tag.
    pub fn tag(&self) -> &str {
        &self.state.tag
    }

    /// The bag the view's bindings are registered in. It is cancelled
    /// when the last strong handle to this view is dropped.
    pub fn cancel_bag(&self) -> &CancelBag {
        &self.state.cancel_bag
    }

    /// Create a non-owning handle.
    pub fn downgrade(&self) -> WeakSceneView {
        WeakSceneView {
            state: Arc::downgrade(&self.state),
        }
    }
}

impl PartialEq for SceneView {
    fn eq(&self, other: &Self) -> bool {
        self.state.id == other.state.id
    }
}

impl Eq for SceneView {}

/// Non-owning handle to a scene view.
#[derive(Debug, Clone)]
pub struct WeakSceneView {
    state: Weak<ViewState>,
}

impl WeakSceneView {
    /// Upgrade if the view is still presented somewhere.
    pub fn upgrade(&self) -> Option<SceneView> {
        self.state.upgrade().map(|state| SceneView { state })
    }

    /// Whether the view is still alive.
    pub fn is_alive(&self) -> bool {
        self.state.strong_count() > 0
    }
}

/// A (view, view-model) pair produced by a feature factory.
#[derive(Debug)]
pub struct Scene<VM> {
    /// The presentation handle.
    pub view: SceneView,
    /// The view model driving the scene.
    pub view_model: Arc<VM>,
}

impl<VM> Scene<VM> {
    /// Pair a view with its view model.
    pub fn new(view: SceneView, view_model: Arc<VM>) -> Self {
        Self { view, view_model }
    }
}

impl<VM> Clone for Scene<VM> {
    fn clone(&self) -> Self {
        Self {
            view: self.view.clone(),
            view_model: self.view_model.clone(),
        }
    }
}
