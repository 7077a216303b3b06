//! The transition coordinator.

use super::builder::{BuildContext, ScreenBuilder};
use super::config::{ConfigError, NavigatorBuilder, NavigatorConfig};
use super::entry::Entry;
use super::error::NavigationError;
use super::events::NavigationRequest;
use super::lock::{TransitionGuard, TransitionLock};
use super::snapshot::{EntrySnapshot, StackSnapshot};
use crate::cancel::{CancelScope, CancelSignal, Canceled};
use crate::channel::{event_channel, EventReader, EventSender};
use crate::lifecycle::{LifecycleError, Phase, Screen};
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Clone)]
struct Slot {
    entry: Entry,
    retain: bool,
}

struct Shared {
    config: NavigatorConfig,
    lock: Arc<TransitionLock>,
    stack: watch::Sender<Vec<Slot>>,
    ids: watch::Sender<Vec<String>>,
    lifetime: CancelScope,
    shut_down: AtomicBool,
    events: EventSender<NavigationRequest>,
    reader: Mutex<Option<EventReader<NavigationRequest>>>,
}

/// Coordinates pushes and pops on one stack of entries.
///
/// Every mutation runs under the navigator's [`TransitionLock`], so at most
/// one transition is in flight at a time; callers that arrive while the lock
/// is held suspend until it is released. An entry is appended only after it
/// has finished entering, and removed only after it has finished exiting.
///
/// Clones share the same stack.
///
/// # Example
///
/// ```rust
/// use screenstack::{CancelSignal, Entry, EntryKind, Navigator, Screen};
///
/// struct Home;
/// impl Screen for Home {}
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let navigator = Navigator::new();
/// let cancel = CancelSignal::never();
///
/// navigator.push(Entry::new("home", EntryKind::Page, Home), &cancel).await.unwrap();
/// assert_eq!(navigator.ids(), vec!["home"]);
///
/// navigator.pop(true, &cancel).await.unwrap();
/// assert!(navigator.is_empty());
/// # });
/// ```
#[derive(Clone)]
pub struct Navigator {
    shared: Arc<Shared>,
}

impl Navigator {
    /// A navigator with the default configuration.
    pub fn new() -> Self {
        Self::with_lock(NavigatorConfig::default(), Arc::default())
    }

    pub fn builder() -> NavigatorBuilder {
        NavigatorBuilder::new()
    }

    /// Validate `config` and build a navigator from it.
    pub fn from_config(config: NavigatorConfig) -> Result<Self, ConfigError> {
        NavigatorBuilder::from_config(config).build()
    }

    pub(crate) fn with_lock(config: NavigatorConfig, lock: Arc<TransitionLock>) -> Self {
        let (stack, _) = watch::channel(Vec::new());
        let (ids, _) = watch::channel(Vec::new());
        let (events, reader) = event_channel();
        Self {
            shared: Arc::new(Shared {
                config,
                lock,
                stack,
                ids,
                lifetime: CancelScope::new(),
                shut_down: AtomicBool::new(false),
                events,
                reader: Mutex::new(Some(reader)),
            }),
        }
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.shared.config
    }

    pub fn name(&self) -> &str {
        &self.shared.config.name
    }

    pub fn len(&self) -> usize {
        self.shared.stack.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.stack.borrow().is_empty()
    }

    /// Entry ids, bottom first.
    pub fn ids(&self) -> Vec<String> {
        self.shared.ids.borrow().clone()
    }

    /// Entries, bottom first.
    pub fn entries(&self) -> Vec<Entry> {
        self.shared
            .stack
            .borrow()
            .iter()
            .map(|slot| slot.entry.clone())
            .collect()
    }

    pub fn top(&self) -> Option<Entry> {
        self.shared
            .stack
            .borrow()
            .last()
            .map(|slot| slot.entry.clone())
    }

    /// The stacked entry with this id.
    pub fn entry(&self, id: &str) -> Option<Entry> {
        self.shared
            .stack
            .borrow()
            .iter()
            .find(|slot| slot.entry.id() == id)
            .map(|slot| slot.entry.clone())
    }

    pub fn contains(&self, entry: &Entry) -> bool {
        self.position(entry).is_some()
    }

    /// A transition currently holds the lock.
    pub fn is_transition_in_progress(&self) -> bool {
        self.shared.lock.is_busy()
    }

    /// Wait until no transition is in flight.
    pub async fn settled(&self, cancel: &CancelSignal) -> Result<(), Canceled> {
        self.shared.lock.settled(cancel).await
    }

    /// Signal that fires when the navigator shuts down.
    pub fn lifetime(&self) -> CancelSignal {
        self.shared.lifetime.signal()
    }

    /// Receiver of the entry ids, updated after every stack change.
    pub fn watch(&self) -> watch::Receiver<Vec<String>> {
        self.shared.ids.subscribe()
    }

    pub fn snapshot(&self) -> StackSnapshot {
        let entries = self
            .shared
            .stack
            .borrow()
            .iter()
            .map(|slot| EntrySnapshot {
                id: slot.entry.id().to_string(),
                kind: slot.entry.kind(),
                phase: slot.entry.phase(),
                retained: slot.retain,
            })
            .collect();

        StackSnapshot {
            name: self.name().to_string(),
            entries,
            transition_in_progress: self.is_transition_in_progress(),
        }
    }

    /// Build an entry and push it on top of the stack.
    ///
    /// Waits for the transition lock first. `cancel` aborts the wait and the
    /// build. Once the new entry starts entering, the push finishes on its
    /// own task, even if this future is dropped, so it must be called inside
    /// a tokio runtime. On any failure the stack is left as it was and the
    /// new entry is disposed.
    pub async fn push(
        &self,
        builder: impl ScreenBuilder,
        cancel: &CancelSignal,
    ) -> Result<Entry, NavigationError> {
        self.push_boxed(Box::new(builder), cancel).await
    }

    /// [`push`](Self::push), then downcast the pushed screen.
    ///
    /// The entry stays pushed when the downcast fails.
    pub async fn push_as<T: Screen>(
        &self,
        builder: impl ScreenBuilder,
        cancel: &CancelSignal,
    ) -> Result<Arc<T>, NavigationError> {
        let entry = self.push(builder, cancel).await?;
        entry
            .screen_as::<T>()
            .ok_or_else(|| NavigationError::UnexpectedScreenType {
                id: entry.id().to_string(),
                expected: std::any::type_name::<T>(),
                actual: entry.screen_type_name(),
            })
    }

    /// Push without waiting, then pop the entry once it completes.
    ///
    /// Runs on a spawned task, so it must be called inside a tokio runtime.
    /// Failures are logged, never returned. Entries without a completion
    /// signal stay on the stack. The task stops waiting when the navigator
    /// shuts down.
    pub fn push_and_forget(&self, builder: impl ScreenBuilder) -> JoinHandle<()> {
        self.spawn_push_and_forget(Box::new(builder), self.shared.lifetime.child())
    }

    /// [`push_and_forget`](Self::push_and_forget) that also stops when
    /// `cancel` fires.
    pub fn push_and_forget_with(
        &self,
        builder: impl ScreenBuilder,
        cancel: &CancelSignal,
    ) -> JoinHandle<()> {
        let scope = self.shared.lifetime.signal().linked_with(cancel);
        self.spawn_push_and_forget(Box::new(builder), scope)
    }

    /// Pop the top entry. Returns `None` if the stack was empty.
    ///
    /// Once the lock is held the pop always removes and disposes the entry,
    /// on its own task if this future is dropped. A failing exit hook skips
    /// the remaining hooks and is reported after the stack has been updated.
    pub async fn pop(
        &self,
        play_animation: bool,
        cancel: &CancelSignal,
    ) -> Result<Option<Entry>, NavigationError> {
        let guard = self.shared.lock.acquire(cancel).await?;
        let Some(top) = self.top() else {
            debug!(stack = %self.name(), "pop on empty stack");
            return Ok(None);
        };
        self.remove_detached(guard, top, play_animation)
            .await
            .map(Some)
    }

    /// Pop `entry` once it has become the top of the stack.
    ///
    /// Returns `None` without waiting if the entry is not on the stack, or
    /// if another caller removes it first.
    pub async fn pop_entry(
        &self,
        entry: &Entry,
        play_animation: bool,
        cancel: &CancelSignal,
    ) -> Result<Option<Entry>, NavigationError> {
        let mut stack = self.shared.stack.subscribe();
        loop {
            let watching = cancel
                .run_until_cancelled(stack.wait_for(|slots| top_or_absent(slots, entry)))
                .await?
                .is_ok();
            if !watching {
                return Ok(None);
            }

            let guard = self.shared.lock.acquire(cancel).await?;
            match self.position(entry) {
                None => {
                    debug!(stack = %self.name(), entry = %entry.id(), "entry already removed");
                    return Ok(None);
                }
                Some(index) if index + 1 == self.len() => {
                    return self
                        .remove_detached(guard, entry.clone(), play_animation)
                        .await
                        .map(Some);
                }
                Some(_) => continue,
            }
        }
    }

    /// [`pop_entry`](Self::pop_entry) by id.
    pub async fn pop_id(
        &self,
        id: &str,
        play_animation: bool,
        cancel: &CancelSignal,
    ) -> Result<Option<Entry>, NavigationError> {
        match self.entry(id) {
            Some(entry) => self.pop_entry(&entry, play_animation, cancel).await,
            None => Ok(None),
        }
    }

    /// Pop until the stack is empty, including entries pushed meanwhile.
    ///
    /// Each pop waits for the transition lock, so a push already in flight
    /// lands first and is popped as well. Keeps going past failing entries
    /// and returns the first failure at the end. Returns the number of
    /// entries removed.
    pub async fn pop_all(
        &self,
        play_animation: bool,
        cancel: &CancelSignal,
    ) -> Result<usize, NavigationError> {
        let mut popped = 0;
        let mut failure = None;

        loop {
            match self.pop(play_animation, cancel).await {
                Ok(Some(_)) => popped += 1,
                Ok(None) => break,
                Err(err) if err.is_canceled() => return Err(err),
                Err(err) => {
                    popped += 1;
                    failure.get_or_insert(err);
                }
            }
        }

        match failure {
            Some(err) => Err(err),
            None => Ok(popped),
        }
    }

    /// Sender for queuing requests to this navigator's event loop.
    pub fn events(&self) -> EventSender<NavigationRequest> {
        self.shared.events.clone()
    }

    /// Take the navigator's own request reader. Only the first call gets it.
    pub fn take_event_reader(&self) -> Option<EventReader<NavigationRequest>> {
        match self.shared.reader.lock() {
            Ok(mut reader) => reader.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }

    /// Apply requests from `reader` one at a time, in arrival order.
    ///
    /// A failed request is logged and the loop moves on. Returns when the
    /// channel closes or `cancel` fires.
    pub async fn run_events(
        &self,
        mut reader: EventReader<NavigationRequest>,
        cancel: &CancelSignal,
    ) {
        loop {
            let request = match cancel.run_until_cancelled(reader.next()).await {
                Ok(Some(request)) => request,
                Ok(None) => {
                    debug!(stack = %self.name(), "event channel closed");
                    return;
                }
                Err(Canceled) => return,
            };

            let outcome = match request {
                NavigationRequest::Push(request) => {
                    self.push_boxed(request.builder, cancel).await.map(drop)
                }
                NavigationRequest::Pop(request) => {
                    self.pop(request.play_animation, cancel).await.map(drop)
                }
            };
            match outcome {
                Ok(()) => {}
                Err(err) if err.is_canceled() => {
                    debug!(stack = %self.name(), "navigation request canceled");
                }
                Err(err) => {
                    warn!(stack = %self.name(), error = %err, "navigation request failed");
                }
            }
        }
    }

    /// Run the navigator's own event loop on a spawned task until shutdown.
    ///
    /// Returns `None` if the reader was already taken.
    pub fn spawn_event_loop(&self) -> Option<JoinHandle<()>> {
        let reader = self.take_event_reader()?;
        let navigator = self.clone();
        let cancel = self.lifetime();
        Some(tokio::spawn(async move {
            navigator.run_events(reader, &cancel).await;
        }))
    }

    /// Stop the navigator and dispose every entry, top first.
    ///
    /// Waits for an in-flight transition, but runs no exit hooks. Pending
    /// waits tied to the navigator's lifetime are canceled, the event
    /// channel is closed and later pushes fail with
    /// [`NavigationError::ShutDown`]. Idempotent.
    pub async fn shutdown(&self) {
        if self.shared.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        self.shared.lifetime.cancel();
        self.shared.events.close();

        let Ok(_guard) = self.shared.lock.acquire(&CancelSignal::never()).await else {
            return;
        };
        let mut removed = Vec::new();
        self.commit(|slots| removed = std::mem::take(slots));
        for slot in removed.iter().rev() {
            slot.entry.controller().dispose();
        }
        info!(stack = %self.name(), disposed = removed.len(), "navigator shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.shared.shut_down.load(Ordering::SeqCst)
    }

    async fn push_boxed(
        &self,
        builder: Box<dyn ScreenBuilder>,
        cancel: &CancelSignal,
    ) -> Result<Entry, NavigationError> {
        self.ensure_running()?;
        let guard = self.shared.lock.acquire(cancel).await?;
        self.ensure_running()?;
        self.ensure_capacity()?;

        let play_animation = builder.play_animation();
        let retain = builder.retain_in_history();
        let ctx = BuildContext::new(
            self.name().to_string(),
            self.shared.config.kind,
            self.ids(),
        );

        debug!(stack = %self.name(), "building entry");
        let entry = cancel
            .run_until_cancelled(builder.build(ctx, cancel.clone()))
            .await?
            .map_err(|source| NavigationError::Build {
                stack: self.name().to_string(),
                source,
            })?;

        if let Some(existing) = self.entry(entry.id()) {
            if !existing.same_as(&entry) {
                entry.controller().dispose();
            }
            return Err(NavigationError::DuplicateId {
                stack: self.name().to_string(),
                id: entry.id().to_string(),
            });
        }
        if cancel.is_cancelled() {
            entry.controller().dispose();
            return Err(Canceled.into());
        }

        let navigator = self.clone();
        detached(guard, async move {
            navigator.enter(entry, play_animation, retain).await
        })
        .await
    }

    async fn remove_detached(
        &self,
        guard: TransitionGuard,
        top: Entry,
        play_animation: bool,
    ) -> Result<Entry, NavigationError> {
        let navigator = self.clone();
        detached(guard, async move { navigator.remove_top(top, play_animation).await }).await
    }

    /// Drive a built entry onto the stack. Caller holds the lock.
    async fn enter(
        &self,
        entry: Entry,
        play_animation: bool,
        retain: bool,
    ) -> Result<Entry, NavigationError> {
        let controller = entry.controller();

        let preparing = async {
            controller.initialize(play_animation).await?;
            controller.will_push_enter(play_animation).await
        };
        if let Err(err) = preparing.await {
            warn!(stack = %self.name(), entry = %entry.id(), error = %err, "entry failed to enter");
            self.retire(&entry).await;
            return Err(err.into());
        }

        let previous = self.shared.stack.borrow().last().cloned();
        let covered = match &previous {
            Some(slot) => match self.cover(&slot.entry, play_animation).await {
                Ok(covered) => covered,
                Err(err) => {
                    warn!(stack = %self.name(), entry = %slot.entry.id(), error = %err, "top entry refused to exit");
                    self.retire(&entry).await;
                    return Err(err.into());
                }
            },
            None => false,
        };

        if let Err(err) = controller.did_push_enter(play_animation).await {
            warn!(stack = %self.name(), entry = %entry.id(), error = %err, "entry failed to activate");
            if let Some(slot) = previous.as_ref().filter(|_| covered) {
                self.reveal(&slot.entry, play_animation).await;
            }
            self.retire(&entry).await;
            return Err(err.into());
        }

        let dropped = previous.filter(|slot| !slot.retain);
        self.commit(|slots| {
            if let Some(dropped) = &dropped {
                slots.retain(|slot| !slot.entry.same_as(&dropped.entry));
            }
            slots.push(Slot {
                entry: entry.clone(),
                retain,
            });
        });
        if let Some(dropped) = &dropped {
            debug!(stack = %self.name(), entry = %dropped.entry.id(), "removing transient entry");
            self.retire(&dropped.entry).await;
        }

        info!(stack = %self.name(), entry = %entry.id(), depth = self.len(), "pushed entry");
        Ok(entry)
    }

    /// Drive the top entry off the stack. Caller holds the lock.
    async fn remove_top(&self, top: Entry, play_animation: bool) -> Result<Entry, NavigationError> {
        let below = {
            let slots = self.shared.stack.borrow();
            let len = slots.len();
            len.checked_sub(2).map(|index| slots[index].entry.clone())
        };
        let exiting = top.controller();
        let revealing = below
            .as_ref()
            .filter(|entry| entry.phase() == Phase::DidPushExit);

        let active = top.phase().is_active();
        let mut failure: Option<LifecycleError> = None;

        if active {
            if let Err(err) = exiting.will_pop_exit(play_animation).await {
                failure = Some(err);
            }
        }
        if let Some(entry) = revealing {
            let result = entry.controller().will_pop_enter(play_animation).await;
            self.settle(entry, "reveal", result);
        }
        if active && failure.is_none() {
            if let Err(err) = exiting.did_pop_exit(play_animation).await {
                failure = Some(err);
            }
        }
        if let Some(entry) = revealing.filter(|entry| entry.phase() == Phase::WillPopEnter) {
            let result = entry.controller().did_pop_enter(play_animation).await;
            self.settle(entry, "reveal", result);
        }
        if failure.is_none() && top.phase().can_advance_to(Phase::Cleanup) {
            if let Err(err) = exiting.cleanup().await {
                failure = Some(err);
            }
        }

        self.commit(|slots| slots.retain(|slot| !slot.entry.same_as(&top)));
        exiting.dispose();

        match failure {
            None => {
                info!(stack = %self.name(), entry = %top.id(), depth = self.len(), "popped entry");
                Ok(top)
            }
            Some(err) => {
                warn!(stack = %self.name(), entry = %top.id(), error = %err, "entry failed to exit cleanly");
                Err(err.into())
            }
        }
    }

    /// Move an active entry behind a newly entering one.
    ///
    /// Fails only when the entry refuses to start exiting. It is then still
    /// the active top and the push must not go ahead.
    async fn cover(&self, entry: &Entry, play_animation: bool) -> Result<bool, LifecycleError> {
        if !entry.phase().is_active() {
            debug!(stack = %self.name(), entry = %entry.id(), phase = %entry.phase(), "covered entry was not active");
            return Ok(false);
        }
        let controller = entry.controller();
        controller.will_push_exit(play_animation).await?;
        let result = controller.did_push_exit(play_animation).await;
        Ok(self.settle(entry, "cover", result))
    }

    /// Bring a covered entry back to the front.
    async fn reveal(&self, entry: &Entry, play_animation: bool) -> bool {
        if entry.phase() != Phase::DidPushExit {
            return false;
        }
        let controller = entry.controller();
        let result = async {
            controller.will_pop_enter(play_animation).await?;
            controller.did_pop_enter(play_animation).await
        }
        .await;
        self.settle(entry, "reveal", result)
    }

    /// Best-effort cleanup, then dispose.
    async fn retire(&self, entry: &Entry) {
        let phase = entry.phase();
        if phase != Phase::Created && phase.can_advance_to(Phase::Cleanup) {
            let result = entry.controller().cleanup().await;
            self.settle(entry, "cleanup", result);
        }
        entry.controller().dispose();
    }

    fn settle(&self, entry: &Entry, step: &str, result: Result<(), LifecycleError>) -> bool {
        match result {
            Ok(()) => true,
            Err(err) => {
                warn!(stack = %self.name(), entry = %entry.id(), error = %err, "{} failed", step);
                false
            }
        }
    }

    fn spawn_push_and_forget(
        &self,
        builder: Box<dyn ScreenBuilder>,
        scope: CancelScope,
    ) -> JoinHandle<()> {
        let navigator = self.clone();
        tokio::spawn(async move {
            let cancel = scope.signal();
            let entry = match navigator.push_boxed(builder, &cancel).await {
                Ok(entry) => entry,
                Err(err) if err.is_canceled() => return,
                Err(err) => {
                    warn!(stack = %navigator.name(), error = %err, "fire-and-forget push failed");
                    return;
                }
            };
            let Some(done) = entry.completion().cloned() else {
                return;
            };
            if done.wait(&cancel).await.is_err() {
                debug!(stack = %navigator.name(), entry = %entry.id(), "stopped waiting for completion");
                return;
            }

            let play_animation = navigator.config().play_animation;
            match navigator.pop_entry(&entry, play_animation, &cancel).await {
                Ok(_) => {}
                Err(err) if err.is_canceled() => {}
                Err(err) => {
                    warn!(stack = %navigator.name(), entry = %entry.id(), error = %err, "fire-and-forget pop failed");
                }
            }
        })
    }

    fn position(&self, entry: &Entry) -> Option<usize> {
        self.shared
            .stack
            .borrow()
            .iter()
            .position(|slot| slot.entry.same_as(entry))
    }

    fn ensure_running(&self) -> Result<(), NavigationError> {
        if self.is_shut_down() {
            return Err(NavigationError::ShutDown {
                stack: self.name().to_string(),
            });
        }
        Ok(())
    }

    fn ensure_capacity(&self) -> Result<(), NavigationError> {
        let Some(max_depth) = self.shared.config.max_depth else {
            return Ok(());
        };
        let slots = self.shared.stack.borrow();
        let leaving = slots.last().is_some_and(|slot| !slot.retain);
        if slots.len() - usize::from(leaving) >= max_depth {
            return Err(NavigationError::StackFull {
                stack: self.name().to_string(),
                max_depth,
            });
        }
        Ok(())
    }

    fn commit(&self, update: impl FnOnce(&mut Vec<Slot>)) {
        self.shared.stack.send_modify(update);
        let ids = self
            .shared
            .stack
            .borrow()
            .iter()
            .map(|slot| slot.entry.id().to_string())
            .collect();
        self.shared.ids.send_replace(ids);
    }
}

/// Finish a transition on its own task, holding `guard` until it ends.
///
/// Dropping the awaiting future leaves the task running, so the stack never
/// stops halfway through a push or pop.
async fn detached<T>(
    guard: TransitionGuard,
    transition: impl Future<Output = Result<T, NavigationError>> + Send + 'static,
) -> Result<T, NavigationError>
where
    T: Send + 'static,
{
    let task = tokio::spawn(async move {
        let _guard = guard;
        transition.await
    });
    match task.await {
        Ok(result) => result,
        Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
        Err(_) => Err(Canceled.into()),
    }
}

fn top_or_absent(slots: &[Slot], entry: &Entry) -> bool {
    match slots.iter().position(|slot| slot.entry.same_as(entry)) {
        Some(index) => index + 1 == slots.len(),
        None => true,
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Navigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("name", &self.name())
            .field("ids", &self.ids())
            .field("transition_in_progress", &self.is_transition_in_progress())
            .finish_non_exhaustive()
    }
}
