//! Per-entry lifecycle state machine.
//!
//! This module contains everything needed to drive a single screen:
//! - [`Phase`]: the ordered lifecycle steps and the pure legality check
//! - [`PhaseHistory`]: immutable record of completed phases
//! - [`Screen`]: the hooks a screen implements, one per phase
//! - [`LifecycleController`]: runs hooks in order and owns the entry's
//!   dispose, exit and per-phase cancellation scopes

mod controller;
mod error;
mod history;
mod phase;
mod screen;

pub use controller::LifecycleController;
pub use error::{BoxError, LifecycleError};
pub use history::{PhaseHistory, PhaseTransition};
pub use phase::Phase;
pub use screen::{HookResult, PhaseContext, Screen};
