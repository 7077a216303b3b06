//! Screen builders: how a push request turns into an [`Entry`].

use super::entry::{Entry, EntryKind};
use crate::cancel::CancelSignal;
use crate::lifecycle::{BoxError, Screen};
use async_trait::async_trait;
use std::future::Future;

/// Read-only view of the stack a builder is resolving an entry for.
#[derive(Debug, Clone)]
pub struct BuildContext {
    stack: String,
    kind: EntryKind,
    ids: Vec<String>,
}

impl BuildContext {
    pub(crate) fn new(stack: String, kind: EntryKind, ids: Vec<String>) -> Self {
        Self { stack, kind, ids }
    }

    /// Name of the stack being pushed onto.
    pub fn stack_name(&self) -> &str {
        &self.stack
    }

    /// Default entry kind of the stack.
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Number of entries currently stacked.
    pub fn depth(&self) -> usize {
        self.ids.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|existing| existing == id)
    }

    /// Create an entry of the stack's kind.
    pub fn entry<S: Screen>(&self, id: impl Into<String>, screen: S) -> Entry {
        Entry::new(id, self.kind, screen)
    }

    /// Create an entry of the stack's kind with a random id.
    pub fn anonymous_entry<S: Screen>(&self, screen: S) -> Entry {
        Entry::anonymous(self.kind, screen)
    }
}

/// Resolves the entry for a push.
///
/// Builders construct the screen (loading, wiring dependencies) but never
/// touch the stack; the navigator appends the entry once it is active.
#[async_trait]
pub trait ScreenBuilder: Send + 'static {
    /// Construct the entry. Must stop promptly when `cancel` fires.
    async fn build(self: Box<Self>, ctx: BuildContext, cancel: CancelSignal)
        -> Result<Entry, BoxError>;

    /// Whether the push animates.
    fn play_animation(&self) -> bool {
        true
    }

    /// Whether the entry stays in the stack once another entry covers it.
    fn retain_in_history(&self) -> bool {
        true
    }
}

/// An already constructed entry is its own builder.
#[async_trait]
impl ScreenBuilder for Entry {
    async fn build(
        self: Box<Self>,
        _ctx: BuildContext,
        _cancel: CancelSignal,
    ) -> Result<Entry, BoxError> {
        Ok(*self)
    }
}

/// Builder backed by an async closure.
///
/// # Example
///
/// ```rust
/// use screenstack::{from_fn, BoxError, Screen};
///
/// struct Home;
/// impl Screen for Home {}
///
/// let builder = from_fn(|ctx, _cancel| async move { Ok::<_, BoxError>(ctx.entry("home", Home)) })
///     .without_animation();
/// ```
pub fn from_fn<F, Fut>(build: F) -> FnBuilder<F>
where
    F: FnOnce(BuildContext, CancelSignal) -> Fut + Send + 'static,
    Fut: Future<Output = Result<Entry, BoxError>> + Send + 'static,
{
    FnBuilder {
        build,
        play_animation: true,
        retain_in_history: true,
    }
}

/// See [`from_fn`].
pub struct FnBuilder<F> {
    build: F,
    play_animation: bool,
    retain_in_history: bool,
}

impl<F> FnBuilder<F> {
    pub fn without_animation(mut self) -> Self {
        self.play_animation = false;
        self
    }

    /// Drop the entry from the stack once another entry covers it.
    pub fn transient(mut self) -> Self {
        self.retain_in_history = false;
        self
    }
}

#[async_trait]
impl<F, Fut> ScreenBuilder for FnBuilder<F>
where
    F: FnOnce(BuildContext, CancelSignal) -> Fut + Send + 'static,
    Fut: Future<Output = Result<Entry, BoxError>> + Send + 'static,
{
    async fn build(
        self: Box<Self>,
        ctx: BuildContext,
        cancel: CancelSignal,
    ) -> Result<Entry, BoxError> {
        let this = *self;
        (this.build)(ctx, cancel).await
    }

    fn play_animation(&self) -> bool {
        self.play_animation
    }

    fn retain_in_history(&self) -> bool {
        self.retain_in_history
    }
}
