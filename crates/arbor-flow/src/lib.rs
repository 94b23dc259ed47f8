//! # Arbor navigation kit
//!
//! The flow-coordination layer shared by every feature:
//!
//! - [`Coordinator`] / [`CoordinatorBase`]: flow ownership, the
//!   dependency tree, finish protocol and request bubbling
//! - [`Router`] / [`SurfaceStack`]: presentation over a layered
//!   navigation surface
//! - [`ViewModel`]: the uniform Input → Output transform contract
//! - [`SceneView`] / [`Scene`]: presentation handles and factory pairs
//! - [`OverlayManager`]: bottom-sheet chrome
//!
//! Feature crates build concrete coordinators, factories and view
//! models on top; this crate knows nothing about any particular screen.

pub mod coordinator;
pub mod overlay;
pub mod router;
pub mod view;
pub mod view_model;

pub use coordinator::{
    add_dependency, remove_dependency, request_coordinating, CoordinationRequest, Coordinator,
    CoordinatorBase, CoordinatorId, FlowState,
};
pub use overlay::{OverlayConfig, OverlayManager};
pub use router::{LayerId, PresentationStyle, Router, SurfaceStack};
pub use view::{Scene, SceneView, ViewId, WeakSceneView};
pub use view_model::ViewModel;
