//! Routers over a layered navigation surface.
//!
//! A [`SurfaceStack`] models one window's navigation state as an ordered
//! stack of layers: layer 0 is the root, every later layer was presented
//! modally above an existing one. Each layer carries its own push stack
//! and overlay stack.
//!
//! A [`Router`] drives exactly one layer. Presenting creates a new layer
//! and returns the router for it, so a child flow gets its own surface —
//! one router per surface at a time. Dismissing removes the layers this
//! router presented and everything above them, matching native modal
//! semantics. All mutation happens on the main scheduling context.

use std::sync::Arc;

use arbor_core::{precondition_failure, MainScheduler};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::overlay::{OverlayConfig, OverlayManager};
use crate::view::{SceneView, WeakSceneView};

/// Identity of a surface layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(Uuid);

impl LayerId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

/// How a layer was presented above its host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresentationStyle {
    /// Replaces the content below entirely.
    FullScreen,
    /// Covers the full screen while keeping the content below alive.
    #[default]
    OverFullScreen,
    /// Partial-height sheet.
    Sheet,
}

#[derive(Debug)]
struct OverlayEntry {
    content: SceneView,
    config: OverlayConfig,
}

#[derive(Debug)]
struct Layer {
    id: LayerId,
    style: PresentationStyle,
    presented_from: Option<LayerId>,
    stack: Vec<SceneView>,
    overlays: Vec<OverlayEntry>,
}

#[derive(Debug, Default)]
struct SurfaceState {
    layers: Vec<Layer>,
}

impl SurfaceState {
    fn index_of(&self, layer: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == layer)
    }
}

struct StackInner {
    scheduler: MainScheduler,
    state: Mutex<SurfaceState>,
}

/// One window's navigation surface: the root layer plus every layer
/// presented above it.
#[derive(Clone)]
pub struct SurfaceStack {
    inner: Arc<StackInner>,
}

impl SurfaceStack {
    /// Create a surface with a root layer rooted at `root`.
    pub fn new(scheduler: &MainScheduler, root: SceneView) -> Self {
        let root_layer = Layer {
            id: LayerId::generate(),
            style: PresentationStyle::FullScreen,
            presented_from: None,
            stack: vec![root],
            overlays: Vec::new(),
        };
        Self {
            inner: Arc::new(StackInner {
                scheduler: scheduler.clone(),
                state: Mutex::new(SurfaceState {
                    layers: vec![root_layer],
                }),
            }),
        }
    }

    /// Router for the root layer.
    pub fn root_router(&self) -> Router {
        let layer = self.inner.state.lock().layers[0].id;
        Router {
            inner: self.inner.clone(),
            layer,
        }
    }

    /// Total number of views across all layer stacks.
    pub fn depth(&self) -> usize {
        self.inner
            .state
            .lock()
            .layers
            .iter()
            .map(|l| l.stack.len())
            .sum()
    }

    /// Number of layers, the root included.
    pub fn layer_count(&self) -> usize {
        self.inner.state.lock().layers.len()
    }

    /// Number of overlays across all layers.
    pub fn overlay_count(&self) -> usize {
        self.inner
            .state
            .lock()
            .layers
            .iter()
            .map(|l| l.overlays.len())
            .sum()
    }

    /// The top of the topmost layer's push stack.
    pub fn top_view(&self) -> Option<SceneView> {
        let state = self.inner.state.lock();
        state.layers.last().and_then(|l| l.stack.last().cloned())
    }
}

impl std::fmt::Debug for SurfaceStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("SurfaceStack")
            .field("layers", &state.layers.len())
            .field(
                "depth",
                &state.layers.iter().map(|l| l.stack.len()).sum::<usize>(),
            )
            .finish()
    }
}

/// Drives one layer of a [`SurfaceStack`].
///
/// Operations are side-effect only. Driving a layer that has been
/// dismissed is a precondition failure — the host is gone.
#[derive(Clone)]
pub struct Router {
    inner: Arc<StackInner>,
    layer: LayerId,
}

impl Router {
    /// Whether this router's layer is still on the surface.
    pub fn is_live(&self) -> bool {
        self.inner.state.lock().index_of(self.layer).is_some()
    }

    /// Present `view` as a new layer above this router's layer and
    /// return the router driving the new layer.
    pub fn present(&self, view: SceneView, animated: bool, style: PresentationStyle) -> Router {
        self.inner.scheduler.assert_main_context("Router::present");
        let mut state = self.inner.state.lock();
        if state.index_of(self.layer).is_none() {
            precondition_failure("present on a dismissed surface");
            return Router {
                inner: self.inner.clone(),
                layer: LayerId::generate(),
            };
        }
        let layer = Layer {
            id: LayerId::generate(),
            style,
            presented_from: Some(self.layer),
            stack: vec![view.clone()],
            overlays: Vec::new(),
        };
        let id = layer.id;
        state.layers.push(layer);
        tracing::debug!(view = view.tag(), ?style, animated, "presented layer");
        Router {
            inner: self.inner.clone(),
            layer: id,
        }
    }

    /// Dismiss the layers presented from this router's layer, along with
    /// everything presented above them.
    pub fn dismiss(&self, animated: bool) {
        self.inner.scheduler.assert_main_context("Router::dismiss");
        let removed = {
            let mut state = self.inner.state.lock();
            if state.index_of(self.layer).is_none() {
                precondition_failure("dismiss on a dismissed surface");
                return;
            }
            let first_presented = state
                .layers
                .iter()
                .position(|l| l.presented_from == Some(self.layer));
            match first_presented {
                Some(index) => state.layers.split_off(index),
                None => {
                    tracing::debug!("dismiss with nothing presented");
                    return;
                }
            }
        };
        tracing::debug!(layers = removed.len(), animated, "dismissed layers");
        // Views drop outside the lock; their bags cancel here.
        drop(removed);
    }

    /// Push `view` onto this layer's stack.
    pub fn push(&self, view: SceneView, animated: bool) {
        self.inner.scheduler.assert_main_context("Router::push");
        let mut state = self.inner.state.lock();
        let Some(index) = state.index_of(self.layer) else {
            precondition_failure("push on a dismissed surface");
            return;
        };
        tracing::debug!(view = view.tag(), animated, "pushed view");
        state.layers[index].stack.push(view);
    }

    /// Pop the top of this layer's stack. Popping the root view of the
    /// layer is a no-op.
    pub fn pop(&self, animated: bool) {
        self.inner.scheduler.assert_main_context("Router::pop");
        let popped = {
            let mut state = self.inner.state.lock();
            let Some(index) = state.index_of(self.layer) else {
                precondition_failure("pop on a dismissed surface");
                return;
            };
            let layer = &mut state.layers[index];
            if layer.stack.len() <= 1 {
                tracing::debug!("pop at layer root ignored");
                return;
            }
            layer.stack.pop()
        };
        if let Some(view) = popped {
            tracing::debug!(view = view.tag(), animated, "popped view");
        }
    }

    /// Show `content` as an overlay on this layer. When `host` is given
    /// it must still be alive; presenting on a destroyed host is a
    /// precondition failure.
    pub fn show_overlay(
        &self,
        manager: &OverlayManager,
        content: SceneView,
        host: Option<&WeakSceneView>,
    ) {
        self.inner
            .scheduler
            .assert_main_context("Router::show_overlay");
        if let Some(host) = host {
            if host.upgrade().is_none() {
                precondition_failure("overlay presented on a destroyed host");
                return;
            }
        }
        let mut state = self.inner.state.lock();
        let Some(index) = state.index_of(self.layer) else {
            precondition_failure("overlay on a dismissed surface");
            return;
        };
        tracing::debug!(
            content = content.tag(),
            min_height = manager.config().min_height,
            "showing overlay"
        );
        state.layers[index].overlays.push(OverlayEntry {
            content,
            config: manager.config(),
        });
    }

    /// Remove the topmost overlay on this layer, if any.
    pub fn dismiss_overlay(&self, animated: bool) {
        self.inner
            .scheduler
            .assert_main_context("Router::dismiss_overlay");
        let removed = {
            let mut state = self.inner.state.lock();
            let Some(index) = state.index_of(self.layer) else {
                precondition_failure("dismiss_overlay on a dismissed surface");
                return;
            };
            state.layers[index].overlays.pop()
        };
        match removed {
            Some(entry) => {
                tracing::debug!(content = entry.content.tag(), animated, "dismissed overlay");
            }
            None => tracing::debug!("dismiss_overlay with no overlay shown"),
        }
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("layer", &self.layer)
            .field("live", &self.is_live())
            .finish()
    }
}
