//! Listening state machine.
//!
//! A listener gates the callback independently of filtering. It starts
//! [`ListeningState::Pending`] and moves to [`ListeningState::Active`] when
//! the start trigger matches, then to [`ListeningState::Retired`] when the
//! stop trigger matches. A retired listener unwinds the walk with
//! [`NavError::Terminate`].
//!
//! Resume sessions push a [`ListeningState::Fastward`] override which
//! suppresses every node until the persisted node is reached; the state
//! saved with the walk is then restored.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, NavError};
use crate::nav::filter::{new_node_filter, FilterDef};
use crate::nav::item::TraverseItem;
use crate::nav::notify::Notifier;
use crate::nav::persist::NodeProgress;

/// Predicate type used by listen triggers.
pub type ListenMatcher = Arc<dyn Fn(&TraverseItem) -> bool + Send + Sync>;

/// A named predicate marking a listening boundary.
#[derive(Clone)]
pub struct ListenPredicate {
    name: String,
    matcher: ListenMatcher,
}

impl ListenPredicate {
    /// Predicate from a closure.
    pub fn new<F>(name: impl Into<String>, matcher: F) -> Self
    where
        F: Fn(&TraverseItem) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            matcher: Arc::new(matcher),
        }
    }

    /// Predicate backed by a declarative node filter.
    pub fn from_filter(def: &FilterDef) -> Result<Self, ConfigError> {
        let filter = new_node_filter(def)?;
        Ok(Self {
            name: filter.description().to_string(),
            matcher: Arc::new(move |item: &TraverseItem| filter.is_match(item)),
        })
    }

    fn always(name: &str) -> Self {
        Self::new(name, |_| true)
    }

    fn never(name: &str) -> Self {
        Self::new(name, |_| false)
    }

    /// Description of the boundary.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether `item` is the boundary.
    #[must_use]
    pub fn is_match(&self, item: &TraverseItem) -> bool {
        (self.matcher)(item)
    }
}

impl std::fmt::Debug for ListenPredicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenPredicate")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Caller supplied start/stop predicates. These take precedence over
/// [`ListenDefinitions`] and are not persisted; a restorer must
/// re-attach them on resume.
#[derive(Debug, Clone, Default)]
pub struct ListenTriggers {
    /// Start listening when this matches
    pub start: Option<ListenPredicate>,
    /// Stop listening when this matches
    pub stop: Option<ListenPredicate>,
}

impl ListenTriggers {
    /// Whether neither trigger is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.stop.is_none()
    }
}

/// Declarative start/stop boundaries, persisted with the options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListenDefinitions {
    /// Filter marking the first node to listen to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_at: Option<FilterDef>,
    /// Filter marking the node at which listening stops
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_at: Option<FilterDef>,
}

impl ListenDefinitions {
    /// Whether neither boundary is defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start_at.is_none() && self.stop_at.is_none()
    }
}

/// Whether boundary nodes themselves are delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenBehaviour {
    /// Invoke the callback for the node that starts listening
    pub inclusive_start: bool,
    /// Invoke the callback for the node that stops listening
    pub inclusive_stop: bool,
}

impl Default for ListenBehaviour {
    fn default() -> Self {
        Self {
            inclusive_start: true,
            inclusive_stop: false,
        }
    }
}

/// State of a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListeningState {
    /// Waiting for the start trigger
    Pending,
    /// Delivering nodes to the callback
    Active,
    /// Finished; the walk must stop
    Retired,
    /// Catching up to a resume point with the callback suppressed
    Fastward,
}

/// Outcome of passing a node through the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Gate {
    /// Deliver the node
    Pass,
    /// Skip the callback for this node
    Suppress,
}

/// The node a fastward catch-up is heading for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FastwardTarget {
    pub(crate) path: PathBuf,
    pub(crate) is_dir: bool,
    /// What the interrupted walk had done with the node
    pub(crate) progress: NodeProgress,
}

#[derive(Debug, Clone)]
struct FastwardOverride {
    target: FastwardTarget,
    restore: ListeningState,
    reached: bool,
}

/// Runtime listener owned by a navigation frame.
#[derive(Debug)]
pub(crate) struct Listener {
    state: ListeningState,
    overrides: Vec<FastwardOverride>,
    start: ListenPredicate,
    stop: ListenPredicate,
    behaviour: ListenBehaviour,
}

impl Listener {
    /// Listener for the configured triggers. Caller triggers win over
    /// definitions; returns `None` when no boundary is configured at all.
    pub(crate) fn build(
        triggers: &ListenTriggers,
        defs: &ListenDefinitions,
        behaviour: ListenBehaviour,
    ) -> Result<Option<Self>, ConfigError> {
        let start = match (&triggers.start, &defs.start_at) {
            (Some(p), _) => Some(p.clone()),
            (None, Some(def)) => Some(ListenPredicate::from_filter(def)?),
            (None, None) => None,
        };
        let stop = match (&triggers.stop, &defs.stop_at) {
            (Some(p), _) => Some(p.clone()),
            (None, Some(def)) => Some(ListenPredicate::from_filter(def)?),
            (None, None) => None,
        };

        Ok(match (start, stop) {
            (None, None) => None,
            (Some(start), None) => Some(Self::new(
                ListeningState::Pending,
                start,
                ListenPredicate::never("never stop"),
                behaviour,
            )),
            (None, Some(stop)) => Some(Self::new(
                ListeningState::Active,
                ListenPredicate::always("always start"),
                stop,
                behaviour,
            )),
            (Some(start), Some(stop)) => {
                Some(Self::new(ListeningState::Pending, start, stop, behaviour))
            }
        })
    }

    /// Listener that delivers everything; used as the base for a fastward
    /// resume of a walk that had no boundaries.
    pub(crate) fn passthrough() -> Self {
        Self::new(
            ListeningState::Active,
            ListenPredicate::always("always start"),
            ListenPredicate::never("never stop"),
            ListenBehaviour::default(),
        )
    }

    fn new(
        state: ListeningState,
        start: ListenPredicate,
        stop: ListenPredicate,
        behaviour: ListenBehaviour,
    ) -> Self {
        Self {
            state,
            overrides: Vec::new(),
            start,
            stop,
            behaviour,
        }
    }

    /// Current state, `Fastward` while an override is in place.
    pub(crate) fn state(&self) -> ListeningState {
        if self.overrides.is_empty() {
            self.state
        } else {
            ListeningState::Fastward
        }
    }

    /// The state to persist: the underlying state, never `Fastward`.
    pub(crate) fn resumable_state(&self) -> ListeningState {
        self.overrides.first().map_or(self.state, |o| o.restore)
    }

    /// Replace the underlying state.
    pub(crate) fn set_state(&mut self, state: ListeningState) {
        self.state = state;
    }

    /// Suppress every node up to and including what the interrupted walk
    /// already did with `target`, then resume in `restore`.
    pub(crate) fn push_fastward(&mut self, target: FastwardTarget, restore: ListeningState) {
        log::debug!(
            "fastward to {} ({:?}, restoring {:?})",
            target.path.display(),
            target.progress,
            restore
        );
        self.overrides.push(FastwardOverride {
            target,
            restore,
            reached: false,
        });
    }

    /// Target of the outermost fastward override, while it is in place.
    pub(crate) fn fastward_origin(&self) -> Option<&FastwardTarget> {
        self.overrides.first().map(|o| &o.target)
    }

    /// Advance the innermost fastward override to `path`. Returns whether
    /// the override was released.
    pub(crate) fn release_fastward(&mut self, path: &Path) -> bool {
        let Some(over) = self.overrides.last_mut() else {
            return false;
        };
        let target = &over.target;
        let release = if over.reached {
            match target.progress {
                NodeProgress::Completed => !path.starts_with(&target.path),
                NodeProgress::Reached | NodeProgress::Delivered => true,
            }
        } else if target.path == path {
            over.reached = true;
            target.progress == NodeProgress::Reached
        } else {
            false
        };
        if release {
            self.pop_fastward();
        }
        release
    }

    /// Release an override whose target was reached but which had nothing
    /// left to hand over. Returns whether one was released.
    pub(crate) fn settle_fastward(&mut self) -> bool {
        if self.overrides.last().is_some_and(|o| o.reached) {
            self.pop_fastward();
            return true;
        }
        false
    }

    /// Leave the fastward state, restoring the persisted state.
    ///
    /// # Panics
    ///
    /// Panics if no fastward override is in place.
    pub(crate) fn pop_fastward(&mut self) {
        let Some(over) = self.overrides.pop() else {
            panic!("invalid listen transition: not in fastward state");
        };
        if self.overrides.is_empty() {
            self.state = over.restore;
        }
    }

    /// Decide whether `item` is delivered, moving between states as the
    /// triggers fire.
    pub(crate) fn gate(
        &mut self,
        item: &TraverseItem,
        notifier: &Notifier,
    ) -> Result<Gate, NavError> {
        match self.state() {
            ListeningState::Fastward => Ok(Gate::Suppress),
            ListeningState::Retired => Err(NavError::Terminate),
            ListeningState::Pending => {
                if !self.start.is_match(item) {
                    log::trace!("not listening yet: {}", item.path.display());
                    return Ok(Gate::Suppress);
                }
                log::debug!(
                    "listening started at {} ({})",
                    item.path.display(),
                    self.start.name()
                );
                self.state = ListeningState::Active;
                notifier.start(self.start.name());
                Ok(if self.behaviour.inclusive_start {
                    Gate::Pass
                } else {
                    Gate::Suppress
                })
            }
            ListeningState::Active => {
                if !self.stop.is_match(item) {
                    return Ok(Gate::Pass);
                }
                log::debug!(
                    "listening stopped at {} ({})",
                    item.path.display(),
                    self.stop.name()
                );
                self.state = ListeningState::Retired;
                notifier.stop(self.stop.name());
                Ok(if self.behaviour.inclusive_stop {
                    Gate::Pass
                } else {
                    Gate::Suppress
                })
            }
        }
    }
}
