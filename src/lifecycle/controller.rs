//! Per-entry lifecycle controller.

use super::error::LifecycleError;
use super::history::{PhaseHistory, PhaseTransition};
use super::phase::Phase;
use super::screen::{dispatch, PhaseContext, Screen};
use crate::cancel::{CancelScope, CancelSignal};
use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

struct ControllerState {
    phase: Phase,
    running: Option<Phase>,
    history: PhaseHistory,
    exit: Option<CancelScope>,
    screen: Option<Arc<dyn Screen>>,
}

fn lock(state: &Mutex<ControllerState>) -> MutexGuard<'_, ControllerState> {
    match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Clears the running marker even if the driving future is dropped.
struct RunningPhase<'a> {
    state: &'a Mutex<ControllerState>,
}

impl Drop for RunningPhase<'_> {
    fn drop(&mut self) {
        lock(self.state).running = None;
    }
}

/// Drives one entry through its lifecycle phases.
///
/// The controller owns the entry's dispose scope for its whole life, an
/// exit scope while the entry is active, and a short-lived scope per phase.
/// Every scope it creates is a descendant of the dispose scope, so
/// [`dispose`](Self::dispose) stops everything the entry started.
///
/// # Example
///
/// ```rust
/// use screenstack::{LifecycleController, Phase, Screen};
/// use std::sync::Arc;
///
/// struct Blank;
/// impl Screen for Blank {}
///
/// # tokio_test_block(async {
/// let controller = LifecycleController::new("blank", Arc::new(Blank));
/// controller.initialize(true).await.unwrap();
/// controller.will_push_enter(true).await.unwrap();
/// controller.did_push_enter(true).await.unwrap();
/// assert_eq!(controller.phase(), Phase::DidPushEnter);
///
/// controller.dispose();
/// assert!(controller.dispose_signal().is_err());
/// # });
/// # fn tokio_test_block(f: impl std::future::Future<Output = ()>) {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
pub struct LifecycleController {
    id: String,
    dispose: CancelScope,
    state: Mutex<ControllerState>,
}

impl LifecycleController {
    pub fn new(id: impl Into<String>, screen: Arc<dyn Screen>) -> Self {
        Self {
            id: id.into(),
            dispose: CancelScope::new(),
            state: Mutex::new(ControllerState {
                phase: Phase::Created,
                running: None,
                history: PhaseHistory::new(),
                exit: None,
                screen: Some(screen),
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Last completed phase.
    pub fn phase(&self) -> Phase {
        lock(&self.state).phase
    }

    pub fn is_disposed(&self) -> bool {
        self.phase().is_final()
    }

    pub fn history(&self) -> PhaseHistory {
        lock(&self.state).history.clone()
    }

    /// Signal that fires when the entry is disposed.
    ///
    /// Fails with [`LifecycleError::Disposed`] once disposal has happened.
    pub fn dispose_signal(&self) -> Result<CancelSignal, LifecycleError> {
        if self.is_disposed() {
            return Err(self.disposed());
        }
        Ok(self.dispose.signal())
    }

    /// Signal of the current activation's exit scope.
    ///
    /// `None` while the entry is not active. The signal fires as soon as the
    /// entry begins to exit, and the scope is gone from then on.
    pub fn exit_signal(&self) -> Result<Option<CancelSignal>, LifecycleError> {
        let state = lock(&self.state);
        if state.phase.is_final() {
            return Err(self.disposed());
        }
        Ok(state.exit.as_ref().map(CancelScope::signal))
    }

    pub async fn initialize(&self, play_animation: bool) -> Result<(), LifecycleError> {
        self.advance(Phase::Initialized, play_animation).await
    }

    pub async fn will_push_enter(&self, play_animation: bool) -> Result<(), LifecycleError> {
        self.advance(Phase::WillPushEnter, play_animation).await
    }

    pub async fn did_push_enter(&self, play_animation: bool) -> Result<(), LifecycleError> {
        self.advance(Phase::DidPushEnter, play_animation).await
    }

    pub async fn will_push_exit(&self, play_animation: bool) -> Result<(), LifecycleError> {
        self.advance(Phase::WillPushExit, play_animation).await
    }

    pub async fn did_push_exit(&self, play_animation: bool) -> Result<(), LifecycleError> {
        self.advance(Phase::DidPushExit, play_animation).await
    }

    pub async fn will_pop_enter(&self, play_animation: bool) -> Result<(), LifecycleError> {
        self.advance(Phase::WillPopEnter, play_animation).await
    }

    pub async fn did_pop_enter(&self, play_animation: bool) -> Result<(), LifecycleError> {
        self.advance(Phase::DidPopEnter, play_animation).await
    }

    pub async fn will_pop_exit(&self, play_animation: bool) -> Result<(), LifecycleError> {
        self.advance(Phase::WillPopExit, play_animation).await
    }

    pub async fn did_pop_exit(&self, play_animation: bool) -> Result<(), LifecycleError> {
        self.advance(Phase::DidPopExit, play_animation).await
    }

    pub async fn cleanup(&self) -> Result<(), LifecycleError> {
        self.advance(Phase::Cleanup, false).await
    }

    /// Run the hook for `next` and record it as completed.
    ///
    /// The phase is only recorded when the hook succeeds; on failure the
    /// entry stays in its previous phase. Entering an exit phase cancels the
    /// exit scope before the hook runs. If that hook fails the entry is
    /// still active and gets a fresh exit scope.
    pub async fn advance(&self, next: Phase, play_animation: bool) -> Result<(), LifecycleError> {
        if next == Phase::Disposed {
            self.dispose();
            return Ok(());
        }

        let (screen, ctx, phase_scope, from) = {
            let mut state = lock(&self.state);
            if state.phase.is_final() {
                return Err(self.disposed());
            }
            if let Some(running) = state.running {
                return Err(LifecycleError::PhaseInProgress {
                    id: self.id.clone(),
                    running,
                });
            }
            if !state.phase.can_advance_to(next) {
                return Err(LifecycleError::IllegalTransition {
                    id: self.id.clone(),
                    from: state.phase,
                    to: next,
                });
            }
            let Some(screen) = state.screen.clone() else {
                return Err(self.disposed());
            };

            let active = if next.begins_exit() {
                state.exit.take().map(|exit| {
                    exit.cancel();
                    exit.signal()
                })
            } else {
                if next.activates() {
                    state.exit = Some(self.dispose.child());
                }
                state.exit.as_ref().map(CancelScope::signal)
            };

            let phase_scope = self.dispose.child();
            let ctx = PhaseContext::new(
                next,
                phase_scope.signal(),
                active,
                self.dispose.signal(),
                play_animation,
            );
            state.running = Some(next);
            (screen, ctx, phase_scope, state.phase)
        };

        let running = RunningPhase { state: &self.state };
        debug!(entry = %self.id, from = %from, phase = %next, "running lifecycle phase");
        let result = dispatch(screen.as_ref(), ctx).await;
        phase_scope.cancel();
        drop(running);

        let mut state = lock(&self.state);
        if state.phase.is_final() {
            return Err(self.disposed());
        }
        match result {
            Ok(()) => {
                state.history = state.history.record(PhaseTransition {
                    from,
                    to: next,
                    timestamp: Utc::now(),
                });
                state.phase = next;
                Ok(())
            }
            Err(source) => {
                if next.activates() {
                    if let Some(exit) = state.exit.take() {
                        exit.cancel();
                    }
                } else if next.begins_exit() && state.phase.is_active() {
                    state.exit = Some(self.dispose.child());
                }
                Err(LifecycleError::PhaseFailed {
                    id: self.id.clone(),
                    phase: next,
                    source,
                })
            }
        }
    }

    /// Cancel every scope of the entry and release the screen.
    ///
    /// Returns `false` if the controller was already disposed.
    pub fn dispose(&self) -> bool {
        let screen = {
            let mut state = lock(&self.state);
            if state.phase.is_final() {
                return false;
            }
            state.history = state.history.record(PhaseTransition {
                from: state.phase,
                to: Phase::Disposed,
                timestamp: Utc::now(),
            });
            state.phase = Phase::Disposed;
            state.exit = None;
            state.screen.take()
        };
        self.dispose.cancel();
        drop(screen);
        debug!(entry = %self.id, "disposed entry");
        true
    }

    fn disposed(&self) -> LifecycleError {
        LifecycleError::Disposed {
            id: self.id.clone(),
        }
    }
}

impl std::fmt::Debug for LifecycleController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleController")
            .field("id", &self.id)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}
