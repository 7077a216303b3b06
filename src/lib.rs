//! Screenstack: lifecycle-driven screen and modal stacks
//!
//! Screenstack coordinates stacks of screens (pages or modals) whose every
//! move on or off the stack runs through an ordered set of async lifecycle
//! hooks. The building blocks are small and usable on their own:
//!
//! - **Cancellation**: [`CancelScope`] trees with read-only [`CancelSignal`]s
//! - **Completion**: a one-shot [`CompletionSignal`] a screen resolves when done
//! - **Lifecycle**: a [`LifecycleController`] per entry that runs [`Screen`]
//!   hooks in a legal [`Phase`] order and owns the entry's scopes
//! - **Events**: an unbounded single-consumer [`channel`]
//! - **Navigation**: a [`Navigator`] that serializes pushes and pops
//!
//! # Example
//!
//! ```rust
//! use screenstack::{CancelSignal, CompletionSignal, EntryKind, Navigator, Screen, from_fn, BoxError};
//!
//! struct Confirm {
//!     done: CompletionSignal,
//! }
//!
//! impl Screen for Confirm {
//!     fn completion(&self) -> Option<CompletionSignal> {
//!         Some(self.done.clone())
//!     }
//! }
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let modals = Navigator::builder().name("modals").kind(EntryKind::Modal).build().unwrap();
//! let done = CompletionSignal::new();
//!
//! let builder = {
//!     let done = done.clone();
//!     from_fn(move |ctx, _cancel| async move {
//!         Ok::<_, BoxError>(ctx.entry("confirm", Confirm { done }))
//!     })
//! };
//! let entry = modals.push(builder, &CancelSignal::never()).await.unwrap();
//! assert_eq!(modals.ids(), vec!["confirm"]);
//!
//! entry.close();
//! modals.pop_entry(&entry, true, &CancelSignal::never()).await.unwrap();
//! assert!(modals.is_empty());
//! # });
//! ```

pub mod cancel;
pub mod channel;
pub mod completion;
pub mod lifecycle;
pub mod navigator;

pub use cancel::{CancelScope, CancelSignal, Canceled};
pub use channel::{event_channel, ChannelClosed, EventReader, EventSender};
pub use completion::CompletionSignal;
pub use lifecycle::{
    BoxError, HookResult, LifecycleController, LifecycleError, Phase, PhaseContext, PhaseHistory,
    PhaseTransition, Screen,
};
pub use navigator::{
    from_fn, BuildContext, ConfigError, ConfigViolation, Entry, EntryKind, EntrySnapshot,
    FnBuilder, NavigationError, NavigationRequest, Navigator, NavigatorBuilder, NavigatorConfig,
    PopRequest, PushRequest, ScreenBuilder, StackSnapshot, TransitionGuard, TransitionLock,
};
