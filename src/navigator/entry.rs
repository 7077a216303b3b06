//! Entries: one screen or modal instance on a stack.

use crate::completion::CompletionSignal;
use crate::lifecycle::{LifecycleController, Phase, PhaseHistory, Screen};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Whether an entry is a full page or a modal overlay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    #[default]
    Page,
    Modal,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page => f.write_str("page"),
            Self::Modal => f.write_str("modal"),
        }
    }
}

struct EntryInner {
    id: String,
    kind: EntryKind,
    controller: LifecycleController,
    completion: Option<CompletionSignal>,
    screen: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

/// Handle to one screen instance and its lifecycle controller.
///
/// Clones refer to the same entry.
#[derive(Clone)]
pub struct Entry {
    inner: Arc<EntryInner>,
}

impl Entry {
    pub fn new<S: Screen>(id: impl Into<String>, kind: EntryKind, screen: S) -> Self {
        Self::from_arc(id, kind, Arc::new(screen))
    }

    /// Entry with a random unique id.
    pub fn anonymous<S: Screen>(kind: EntryKind, screen: S) -> Self {
        Self::new(Uuid::new_v4().to_string(), kind, screen)
    }

    /// Wrap a screen that is already shared.
    pub fn from_arc<S: Screen>(id: impl Into<String>, kind: EntryKind, screen: Arc<S>) -> Self {
        let id = id.into();
        let completion = screen.completion();
        let hooks: Arc<dyn Screen> = Arc::clone(&screen) as Arc<dyn Screen>;
        Self {
            inner: Arc::new(EntryInner {
                controller: LifecycleController::new(id.clone(), hooks),
                id,
                kind,
                completion,
                screen,
                type_name: std::any::type_name::<S>(),
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn kind(&self) -> EntryKind {
        self.inner.kind
    }

    pub fn phase(&self) -> Phase {
        self.inner.controller.phase()
    }

    pub fn history(&self) -> PhaseHistory {
        self.inner.controller.history()
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.controller.is_disposed()
    }

    pub fn controller(&self) -> &LifecycleController {
        &self.inner.controller
    }

    /// The screen's completion signal, if it exposes one.
    pub fn completion(&self) -> Option<&CompletionSignal> {
        self.inner.completion.as_ref()
    }

    /// Resolve the completion signal.
    ///
    /// Returns `false` if the entry has no signal or it was already resolved.
    pub fn close(&self) -> bool {
        self.inner
            .completion
            .as_ref()
            .is_some_and(CompletionSignal::resolve)
    }

    /// The concrete screen, if it is a `T`.
    pub fn screen_as<T: Screen>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.inner.screen).downcast::<T>().ok()
    }

    /// Type name of the concrete screen, for diagnostics.
    pub fn screen_type_name(&self) -> &'static str {
        self.inner.type_name
    }

    /// Both handles refer to the same entry.
    pub fn same_as(&self, other: &Entry) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("id", &self.inner.id)
            .field("kind", &self.inner.kind)
            .field("phase", &self.phase())
            .field("screen", &self.inner.type_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;
    impl Screen for Plain {}

    struct Closable {
        done: CompletionSignal,
    }

    impl Screen for Closable {
        fn completion(&self) -> Option<CompletionSignal> {
            Some(self.done.clone())
        }
    }

    #[test]
    fn new_entry_starts_created() {
        let entry = Entry::new("home", EntryKind::Page, Plain);
        assert_eq!(entry.id(), "home");
        assert_eq!(entry.kind(), EntryKind::Page);
        assert_eq!(entry.phase(), Phase::Created);
        assert!(!entry.is_disposed());
    }

    #[test]
    fn anonymous_entries_get_distinct_ids() {
        let a = Entry::anonymous(EntryKind::Modal, Plain);
        let b = Entry::anonymous(EntryKind::Modal, Plain);
        assert_ne!(a.id(), b.id());
        assert!(Uuid::parse_str(a.id()).is_ok());
    }

    #[test]
    fn screen_as_downcasts_to_concrete_type() {
        let entry = Entry::new("home", EntryKind::Page, Plain);
        assert!(entry.screen_as::<Plain>().is_some());
        assert!(entry.screen_as::<Closable>().is_none());
        assert!(entry.screen_type_name().ends_with("Plain"));
    }

    #[test]
    fn close_resolves_completion_once() {
        let done = CompletionSignal::new();
        let entry = Entry::new(
            "dialog",
            EntryKind::Modal,
            Closable { done: done.clone() },
        );

        assert!(entry.close());
        assert!(!entry.close());
        assert!(done.is_resolved());
    }

    #[test]
    fn close_without_completion_is_noop() {
        let entry = Entry::new("home", EntryKind::Page, Plain);
        assert!(entry.completion().is_none());
        assert!(!entry.close());
    }

    #[test]
    fn clones_are_the_same_entry() {
        let entry = Entry::new("home", EntryKind::Page, Plain);
        let other = Entry::new("home", EntryKind::Page, Plain);
        assert!(entry.same_as(&entry.clone()));
        assert!(!entry.same_as(&other));
    }

    #[test]
    fn kind_serializes_by_name() {
        assert_eq!(serde_json::to_string(&EntryKind::Modal).unwrap(), "\"Modal\"");
    }
}
