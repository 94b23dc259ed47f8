//! # Arbor reactive kernel
//!
//! The primitives every other Arbor crate builds on:
//!
//! - [`MainScheduler`]: the single UI scheduling context — a
//!   main-thread-pinned task queue with clock-driven delayed work
//! - [`EventSource`] / [`Subscription`]: named event streams with
//!   main-context delivery and synchronous cancellation
//! - [`CancelBag`]: scoped cancellation, one bag per unit of work
//! - [`Clock`] / [`SystemClock`] / [`ManualClock`]: real and simulated
//!   time behind one trait
//! - [`precondition_failure`]: the fail-fast policy for programmer
//!   errors (halt in debug, log in release)
//!
//! Background threads may produce values; shared state is mutated only
//! from the main context. That discipline, not locking, is what keeps
//! navigation state race-free.

pub mod cancel_bag;
pub mod clock;
pub mod event;
pub mod precondition;
pub mod scheduler;

pub use cancel_bag::CancelBag;
pub use clock::{Clock, ManualClock, SystemClock};
pub use event::{EventSource, Subscription};
pub use precondition::precondition_failure;
pub use scheduler::MainScheduler;
