//! Stack navigation.
//!
//! A [`Navigator`] owns one stack of [`Entry`] values and moves entries on
//! and off it through their lifecycle phases:
//!
//! - **Push**: build the entry, run its enter phases, move the previous top
//!   behind it, then append it.
//! - **Pop**: run the top's exit phases while the entry below returns to the
//!   front, then remove and dispose the top.
//!
//! Transitions are serialized by a [`TransitionLock`]. Requests can also be
//! queued over the navigator's event channel and applied in order by
//! [`Navigator::run_events`].

mod builder;
mod config;
mod coordinator;
mod entry;
mod error;
mod events;
mod lock;
mod snapshot;

pub use builder::{from_fn, BuildContext, FnBuilder, ScreenBuilder};
pub use config::{ConfigError, ConfigViolation, NavigatorBuilder, NavigatorConfig, MAX_NAME_LEN};
pub use coordinator::Navigator;
pub use entry::{Entry, EntryKind};
pub use error::NavigationError;
pub use events::{NavigationRequest, PopRequest, PushRequest};
pub use lock::{TransitionGuard, TransitionLock};
pub use snapshot::{EntrySnapshot, StackSnapshot};
