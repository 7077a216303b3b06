//! Lifecycle hooks implemented by screens and modals.

use super::error::BoxError;
use super::phase::Phase;
use crate::cancel::CancelSignal;
use crate::completion::CompletionSignal;
use async_trait::async_trait;

/// Result returned by every lifecycle hook.
pub type HookResult = Result<(), BoxError>;

/// Everything a hook may observe while it runs.
#[derive(Debug, Clone)]
pub struct PhaseContext {
    phase: Phase,
    signal: CancelSignal,
    active: Option<CancelSignal>,
    dispose: CancelSignal,
    play_animation: bool,
}

impl PhaseContext {
    pub(crate) fn new(
        phase: Phase,
        signal: CancelSignal,
        active: Option<CancelSignal>,
        dispose: CancelSignal,
        play_animation: bool,
    ) -> Self {
        Self {
            phase,
            signal,
            active,
            dispose,
            play_animation,
        }
    }

    /// The phase this hook is running for.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Fires when this phase is over or the entry is disposed.
    ///
    /// Work started by the hook must stop when this fires.
    pub fn signal(&self) -> &CancelSignal {
        &self.signal
    }

    /// Fires when the entry begins to exit.
    ///
    /// Present in the did-enter hooks, and already cancelled in the
    /// will-exit hooks. Use it for work that should run only while the entry
    /// is the active screen.
    pub fn active_signal(&self) -> Option<&CancelSignal> {
        self.active.as_ref()
    }

    /// Fires when the entry is disposed.
    pub fn dispose_signal(&self) -> &CancelSignal {
        &self.dispose
    }

    /// Whether the transition driving this phase animates.
    pub fn play_animation(&self) -> bool {
        self.play_animation
    }
}

/// Ordered lifecycle hooks of a screen.
///
/// Every hook defaults to a no-op. Hooks run one at a time, in the order
/// described on [`Phase`], and each one must observe
/// [`PhaseContext::signal`] and return promptly once it fires.
///
/// # Example
///
/// ```rust
/// use screenstack::{HookResult, PhaseContext, Screen};
/// use async_trait::async_trait;
///
/// struct Settings;
///
/// #[async_trait]
/// impl Screen for Settings {
///     async fn initialize(&self, ctx: PhaseContext) -> HookResult {
///         ctx.signal().check()?;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Screen: Send + Sync + 'static {
    async fn initialize(&self, _ctx: PhaseContext) -> HookResult {
        Ok(())
    }

    async fn will_push_enter(&self, _ctx: PhaseContext) -> HookResult {
        Ok(())
    }

    async fn did_push_enter(&self, _ctx: PhaseContext) -> HookResult {
        Ok(())
    }

    async fn will_push_exit(&self, _ctx: PhaseContext) -> HookResult {
        Ok(())
    }

    async fn did_push_exit(&self, _ctx: PhaseContext) -> HookResult {
        Ok(())
    }

    async fn will_pop_enter(&self, _ctx: PhaseContext) -> HookResult {
        Ok(())
    }

    async fn did_pop_enter(&self, _ctx: PhaseContext) -> HookResult {
        Ok(())
    }

    async fn will_pop_exit(&self, _ctx: PhaseContext) -> HookResult {
        Ok(())
    }

    async fn did_pop_exit(&self, _ctx: PhaseContext) -> HookResult {
        Ok(())
    }

    async fn cleanup(&self, _ctx: PhaseContext) -> HookResult {
        Ok(())
    }

    /// Signal the screen resolves when it wants to be closed.
    fn completion(&self) -> Option<CompletionSignal> {
        None
    }
}

/// Call the hook matching `phase`.
pub(crate) async fn dispatch(screen: &dyn Screen, ctx: PhaseContext) -> HookResult {
    match ctx.phase() {
        Phase::Initialized => screen.initialize(ctx).await,
        Phase::WillPushEnter => screen.will_push_enter(ctx).await,
        Phase::DidPushEnter => screen.did_push_enter(ctx).await,
        Phase::WillPushExit => screen.will_push_exit(ctx).await,
        Phase::DidPushExit => screen.did_push_exit(ctx).await,
        Phase::WillPopEnter => screen.will_pop_enter(ctx).await,
        Phase::DidPopEnter => screen.did_pop_enter(ctx).await,
        Phase::WillPopExit => screen.will_pop_exit(ctx).await,
        Phase::DidPopExit => screen.did_pop_exit(ctx).await,
        Phase::Cleanup => screen.cleanup(ctx).await,
        Phase::Created | Phase::Disposed => Ok(()),
    }
}
