//! Phase transition history tracking.

use super::phase::Phase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single completed phase change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhaseTransition {
    /// The phase being left
    pub from: Phase,
    /// The phase that was completed
    pub to: Phase,
    /// When the phase completed
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of an entry's phase changes.
///
/// History is immutable - `record` returns a new history with the
/// transition added.
///
/// # Example
///
/// ```rust
/// use screenstack::{Phase, PhaseHistory, PhaseTransition};
/// use chrono::Utc;
///
/// let history = PhaseHistory::new().record(PhaseTransition {
///     from: Phase::Created,
///     to: Phase::Initialized,
///     timestamp: Utc::now(),
/// });
///
/// assert_eq!(history.path(), vec![Phase::Created, Phase::Initialized]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseHistory {
    transitions: Vec<PhaseTransition>,
}

impl PhaseHistory {
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    pub fn record(&self, transition: PhaseTransition) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }

    /// Phases traversed: the first `from`, then each `to`.
    pub fn path(&self) -> Vec<Phase> {
        let mut path = Vec::with_capacity(self.transitions.len() + 1);
        if let Some(first) = self.transitions.first() {
            path.push(first.from);
        }
        path.extend(self.transitions.iter().map(|t| t.to));
        path
    }

    /// Time between the first and last recorded transition.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.transitions.first()?, self.transitions.last()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    /// How many times the entry became active.
    pub fn activations(&self) -> usize {
        self.transitions.iter().filter(|t| t.to.is_active()).count()
    }

    pub fn transitions(&self) -> &[PhaseTransition] {
        &self.transitions
    }
}
