//! The view-model transform contract.
//!
//! Every view model in Arbor is a pure Input → Output construction: the
//! view supplies its named event sources, the view model wires its
//! internal pipelines (Input → use case → Output), and every
//! subscription created along the way is registered in the caller's
//! [`CancelBag`] so the whole binding terminates with the view.

use arbor_core::CancelBag;

/// Uniform binding contract between a view and its view model.
///
/// `transform` must not perform work itself; it only wires pipelines.
/// Output events are delivered on the main scheduling context regardless
/// of which thread produced the underlying value, and bindings hold weak
/// owner references so a destroyed view never receives an emission.
pub trait ViewModel {
    /// Named event sources supplied by the view.
    type Input;
    /// Named event sources consumed by the view and the coordinator.
    type Output;

    /// Wire Input to Output, registering every created subscription in
    /// `cancel_bag`.
    fn transform(&self, input: Self::Input, cancel_bag: &CancelBag) -> Self::Output;
}
