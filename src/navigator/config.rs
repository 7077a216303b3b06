//! Navigator configuration and its builder.

use super::entry::EntryKind;
use super::lock::TransitionLock;
use super::Navigator;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// Longest accepted stack name.
pub const MAX_NAME_LEN: usize = 64;

/// A single problem found in a [`NavigatorConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigViolation {
    #[error("stack name is empty")]
    EmptyName,

    #[error("stack name is {len} characters long (max {max})")]
    NameTooLong { len: usize, max: usize },

    #[error("stack name '{name}' contains whitespace")]
    NameHasWhitespace { name: String },

    #[error("max_depth must be at least 1")]
    ZeroMaxDepth,
}

/// Errors that can occur when loading or building a navigator
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid navigator configuration: {}", describe(.violations))]
    Invalid { violations: Vec<ConfigViolation> },

    #[error("Failed to parse navigator configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

fn describe(violations: &[ConfigViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Settings of one navigator (one stack).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Stack name used in logs and snapshots
    pub name: String,

    /// Kind given to entries built through [`BuildContext::entry`](super::BuildContext::entry)
    pub kind: EntryKind,

    /// Animation flag for pops issued by the navigator itself
    /// (fire-and-forget closes and channel requests without an explicit flag)
    pub play_animation: bool,

    /// Optional cap on the number of stacked entries
    pub max_depth: Option<usize>,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            name: "screens".to_string(),
            kind: EntryKind::Page,
            play_animation: true,
            max_depth: None,
        }
    }
}

impl NavigatorConfig {
    /// Parse a JSON configuration; missing fields take their defaults.
    ///
    /// The result is validated.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.check()?;
        Ok(config)
    }

    /// Check every rule, accumulating ALL violations.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<ConfigViolation>> {
        let mut checks: Vec<Validation<(), NonEmptyVec<ConfigViolation>>> = Vec::new();

        checks.push(if self.name.is_empty() {
            Validation::fail(ConfigViolation::EmptyName)
        } else {
            Validation::success(())
        });

        let len = self.name.chars().count();
        checks.push(if len > MAX_NAME_LEN {
            Validation::fail(ConfigViolation::NameTooLong {
                len,
                max: MAX_NAME_LEN,
            })
        } else {
            Validation::success(())
        });

        checks.push(if self.name.chars().any(char::is_whitespace) {
            Validation::fail(ConfigViolation::NameHasWhitespace {
                name: self.name.clone(),
            })
        } else {
            Validation::success(())
        });

        checks.push(if self.max_depth == Some(0) {
            Validation::fail(ConfigViolation::ZeroMaxDepth)
        } else {
            Validation::success(())
        });

        Validation::all_vec(checks).map(|_| ())
    }

    /// [`validate`](Self::validate) as a `Result`.
    pub fn check(&self) -> Result<(), ConfigError> {
        match self.validate() {
            Validation::Success(()) => Ok(()),
            Validation::Failure(errors) => Err(ConfigError::Invalid {
                violations: errors.iter().cloned().collect(),
            }),
        }
    }
}

/// Fluent builder for a [`Navigator`].
///
/// # Example
///
/// ```rust
/// use screenstack::{EntryKind, NavigatorBuilder};
///
/// let modals = NavigatorBuilder::new()
///     .name("modals")
///     .kind(EntryKind::Modal)
///     .max_depth(8)
///     .build()
///     .unwrap();
///
/// assert_eq!(modals.name(), "modals");
/// assert!(modals.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct NavigatorBuilder {
    config: NavigatorConfig,
    lock: Option<Arc<TransitionLock>>,
}

impl NavigatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub fn from_config(config: NavigatorConfig) -> Self {
        Self { config, lock: None }
    }

    /// Set the stack name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Set the kind of entries this stack holds
    pub fn kind(mut self, kind: EntryKind) -> Self {
        self.config.kind = kind;
        self
    }

    /// Set the default animation flag
    pub fn play_animation(mut self, play: bool) -> Self {
        self.config.play_animation = play;
        self
    }

    /// Cap the stack length
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = Some(depth);
        self
    }

    /// Serialize transitions with an externally owned lock.
    ///
    /// Navigators sharing a lock never run transitions at the same time.
    pub fn transition_lock(mut self, lock: Arc<TransitionLock>) -> Self {
        self.lock = Some(lock);
        self
    }

    /// Validate the configuration and build the navigator.
    pub fn build(self) -> Result<Navigator, ConfigError> {
        self.config.check()?;
        let lock = self.lock.unwrap_or_default();
        Ok(Navigator::with_lock(self.config, lock))
    }
}
