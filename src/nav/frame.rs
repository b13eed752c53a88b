//! Navigation frame: the per-session mutable state of a walk.
//!
//! The frame owns the callback and the decorations applied in front of it.
//! Every node a navigator delivers goes through [`NavigationFrame::proxy`]:
//!
//! 1. cancellation check
//! 2. decorations in order (node filter, then listener)
//! 3. the raw callback, inline or on the accelerator
//! 4. one metric tick for the node
//!
//! Read failures take a separate route through
//! [`NavigationFrame::proxy_error`] so the caller sees the failure as a
//! second invocation carrying the error.
//!
//! The frame also tracks how far it got with the current node
//! ([`NodeProgress`]), so a saved walk resumes without handing any node to
//! the callback twice.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;

use crate::error::NavError;
use crate::nav::accelerate::Accelerator;
use crate::nav::filter::NodeFilter;
use crate::nav::item::TraverseItem;
use crate::nav::listen::{FastwardTarget, Gate, Listener, ListeningState};
use crate::nav::metrics::{MetricKind, Metrics};
use crate::nav::notify::Notifier;
use crate::nav::options::Callback;
use crate::nav::persist::{ActiveState, NodeProgress};
use crate::nav::scope::Periscope;
use crate::signal::CancelToken;

/// A wrapper applied in front of the raw callback.
pub(crate) enum Decoration {
    /// Drop nodes the filter rejects
    Filter(Arc<dyn NodeFilter>),
    /// Gate nodes through the frame's listener
    Listen,
}

impl Decoration {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Filter(_) => "filter",
            Self::Listen => "listen",
        }
    }
}

/// How the raw callback is executed.
#[derive(Debug)]
pub(crate) enum Invoker {
    /// On the walking thread
    Inline,
    /// On the worker pool
    Accelerated(Accelerator),
}

impl Invoker {
    fn invoke(&self, callback: &Callback, item: &Arc<TraverseItem>) -> Result<(), NavError> {
        match self {
            Self::Inline => callback(item.as_ref()),
            Self::Accelerated(acc) => acc.invoke(callback, item),
        }
    }

    fn shutdown(&mut self) {
        if let Self::Accelerated(acc) = self {
            acc.shutdown();
        }
    }
}

pub(crate) struct NavigationFrame {
    pub(crate) root: PathBuf,
    pub(crate) periscope: Periscope,
    pub(crate) metrics: Metrics,
    pub(crate) notifier: Notifier,
    current: Option<PathBuf>,
    current_depth: usize,
    current_is_dir: bool,
    progress: NodeProgress,
    listener: Option<Listener>,
    decorations: Vec<Decoration>,
    invoker: Invoker,
    callback: Callback,
    cancel: CancelToken,
}

impl NavigationFrame {
    pub(crate) fn new(
        root: PathBuf,
        callback: Callback,
        notifier: Notifier,
        cancel: CancelToken,
    ) -> Self {
        Self {
            root,
            periscope: Periscope::default(),
            metrics: Metrics::default(),
            notifier,
            current: None,
            current_depth: 0,
            current_is_dir: false,
            progress: NodeProgress::Reached,
            listener: None,
            decorations: Vec::new(),
            invoker: Invoker::Inline,
            callback,
            cancel,
        }
    }

    /// Install the node filter decoration. Must come before the listener.
    pub(crate) fn decorate_filter(&mut self, filter: Arc<dyn NodeFilter>) {
        self.decorations.push(Decoration::Filter(filter));
    }

    /// Install the listener decoration.
    pub(crate) fn decorate_listener(&mut self, listener: Listener) {
        self.listener = Some(listener);
        if !self
            .decorations
            .iter()
            .any(|d| matches!(d, Decoration::Listen))
        {
            self.decorations.push(Decoration::Listen);
        }
    }

    pub(crate) fn set_invoker(&mut self, invoker: Invoker) {
        self.invoker = invoker;
    }

    /// Labels of the installed decorations, outermost first.
    pub(crate) fn decoration_labels(&self) -> Vec<&'static str> {
        self.decorations.iter().map(Decoration::label).collect()
    }

    pub(crate) fn listening_state(&self) -> Option<ListeningState> {
        self.listener.as_ref().map(Listener::state)
    }

    /// Continue a walk whose listener was in `state` when it was saved.
    pub(crate) fn restore_listening(&mut self, state: ListeningState) {
        if let Some(listener) = self.listener.as_mut() {
            listener.set_state(state);
        } else if state != ListeningState::Active {
            let mut listener = Listener::passthrough();
            listener.set_state(state);
            self.decorate_listener(listener);
        }
    }

    /// Suppress the callback and notifications until the walk gets past
    /// what was already done with `target`, then continue in `restore`.
    pub(crate) fn fastward(&mut self, target: FastwardTarget, restore: ListeningState) {
        if self.listener.is_none() {
            self.decorate_listener(Listener::passthrough());
        }
        if let Some(listener) = self.listener.as_mut() {
            listener.push_fastward(target, restore);
        }
        self.notifier.mute();
    }

    /// End a fastward catch-up whose target was reached with nothing left
    /// after it.
    pub(crate) fn settle_fastward(&mut self) {
        if let Some(listener) = self.listener.as_mut() {
            if listener.settle_fastward() && listener.state() != ListeningState::Fastward {
                log::debug!("fastward settled after the last node");
                self.notifier.unmute();
            }
        }
    }

    /// Record that a navigator reached `item`. Ends a fastward catch-up
    /// once the walk gets past its target.
    pub(crate) fn observe(&mut self, item: &TraverseItem) -> Result<(), NavError> {
        self.current = Some(item.path.clone());
        self.current_depth = self.periscope.depth();
        self.current_is_dir = item.is_dir();
        self.progress = NodeProgress::Reached;
        if self.cancel.is_cancelled() {
            log::debug!("walk cancelled at {}", item.path.display());
            return Err(NavError::Cancelled);
        }

        if let Some(listener) = self.listener.as_mut() {
            if listener.release_fastward(&item.path) {
                log::debug!("fastward released at {}", item.path.display());
                if listener.state() != ListeningState::Fastward {
                    self.notifier.unmute();
                }
            }
        }
        Ok(())
    }

    /// Deliver `item` to the callback through the decorations.
    pub(crate) fn proxy(&mut self, item: &Arc<TraverseItem>) -> Result<(), NavError> {
        if self.cancel.is_cancelled() {
            return Err(NavError::Cancelled);
        }

        for decoration in &self.decorations {
            match decoration {
                Decoration::Filter(filter) => {
                    if !item.admitted && !filter.is_match(item) {
                        log::trace!("filtered out: {}", item.path.display());
                        self.progress = passed_over(item);
                        return Ok(());
                    }
                }
                Decoration::Listen => {
                    if let Some(listener) = self.listener.as_mut() {
                        if listener.gate(item, &self.notifier)? == Gate::Suppress {
                            self.progress = passed_over(item);
                            return Ok(());
                        }
                    }
                }
            }
        }

        let outcome = self.invoker.invoke(&self.callback, item);
        if !matches!(outcome, Err(NavError::Cancelled)) {
            let kind = if item.is_dir() {
                MetricKind::Folders
            } else {
                MetricKind::Files
            };
            self.metrics.tick(kind);
            self.record_delivery(item, &outcome);
        }

        match outcome {
            Err(e @ (NavError::SkipDir | NavError::SkipAll)) => Err(e),
            outcome => match &item.error {
                Some(error) => Err(error.clone()),
                None => outcome,
            },
        }
    }

    /// Deliver an item carrying a read or status error.
    ///
    /// The node filter is bypassed and the listener is only consulted, never
    /// advanced. Returning [`NavError::SkipDir`] from the callback swallows
    /// the error; anything else propagates it.
    pub(crate) fn proxy_error(&mut self, item: &Arc<TraverseItem>) -> Result<(), NavError> {
        let Some(error) = item.error.clone() else {
            return Ok(());
        };
        log::warn!("{error}");

        match self.listening_state() {
            Some(ListeningState::Retired) => return Err(NavError::Terminate),
            Some(ListeningState::Pending | ListeningState::Fastward) => {
                log::debug!(
                    "error outside listening window ignored: {}",
                    item.path.display()
                );
                self.progress = NodeProgress::Completed;
                return Ok(());
            }
            Some(ListeningState::Active) | None => {}
        }

        // A node carrying an error is never descended into.
        self.progress = NodeProgress::Completed;
        match self.invoker.invoke(&self.callback, item) {
            Err(NavError::SkipDir) => Ok(()),
            Err(NavError::SkipAll) => Err(NavError::SkipAll),
            _ => Err(error),
        }
    }

    /// What delivering `item` left to do. A file answering `SkipDir` ends
    /// its folder, so the folder becomes the completed node.
    fn record_delivery(&mut self, item: &TraverseItem, outcome: &Result<(), NavError>) {
        let skipped = matches!(outcome, Err(NavError::SkipDir));
        if item.is_dir() {
            self.progress = if skipped {
                NodeProgress::Completed
            } else {
                NodeProgress::Delivered
            };
            return;
        }

        if skipped {
            if let Some(parent) = item.path.parent().filter(|p| p.starts_with(&self.root)) {
                self.current = Some(parent.to_path_buf());
                self.current_depth = self.current_depth.saturating_sub(1);
                self.current_is_dir = true;
            }
        }
        self.progress = NodeProgress::Completed;
    }

    /// Snapshot of the walk position for persistence. A fastward catch-up
    /// that has not finished reports the position it was catching up to.
    pub(crate) fn snapshot(&self) -> ActiveState {
        let origin = self.listener.as_ref().and_then(Listener::fastward_origin);
        let (node_path, is_dir, progress, depth) = match origin {
            Some(target) => {
                let depth = target
                    .path
                    .strip_prefix(&self.root)
                    .map_or(0, |rel| rel.components().count());
                (target.path.clone(), target.is_dir, target.progress, depth)
            }
            None => match &self.current {
                Some(current) => (
                    current.clone(),
                    self.current_is_dir,
                    self.progress,
                    self.current_depth,
                ),
                None => (self.root.clone(), true, NodeProgress::Reached, 0),
            },
        };

        ActiveState {
            root: self.root.clone(),
            node_path,
            is_dir,
            progress,
            listen: self
                .listener
                .as_ref()
                .map_or(ListeningState::Active, Listener::resumable_state),
            depth,
            metrics: self.metrics.clone(),
            saved_at: Utc::now(),
        }
    }

    pub(crate) fn current(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    /// Stop the accelerator, if any, after the walk.
    pub(crate) fn finish(&mut self) {
        self.invoker.shutdown();
    }
}

/// Progress of a node that went through the decorations without reaching
/// the callback. A folder's contents are still walked.
fn passed_over(item: &TraverseItem) -> NodeProgress {
    if item.is_dir() {
        NodeProgress::Delivered
    } else {
        NodeProgress::Completed
    }
}

impl std::fmt::Debug for NavigationFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationFrame")
            .field("root", &self.root)
            .field("current", &self.current)
            .field("metrics", &self.metrics)
            .field("decorations", &self.decoration_labels())
            .field("listening", &self.listening_state())
            .field("invoker", &self.invoker)
            .finish_non_exhaustive()
    }
}
