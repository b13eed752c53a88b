//! Lifecycle notifications.

use std::path::Path;
use std::sync::Arc;

use crate::nav::item::TraverseItem;
use crate::nav::metrics::TraverseResult;

/// Handler for a path event.
pub type PathHandler = Arc<dyn Fn(&Path) + Send + Sync>;
/// Handler for an item event.
pub type ItemHandler = Arc<dyn Fn(&TraverseItem) + Send + Sync>;
/// Handler for the end of a walk.
pub type ResultHandler = Arc<dyn Fn(&TraverseResult) + Send + Sync>;
/// Handler for a listener boundary, given the trigger's description.
pub type ListenHandler = Arc<dyn Fn(&str) + Send + Sync>;

/// Optional handlers for lifecycle events.
#[derive(Clone, Default)]
pub struct Notifications {
    /// The walk starts at this root
    pub on_begin: Option<PathHandler>,
    /// The walk finished
    pub on_end: Option<ResultHandler>,
    /// Entering a folder
    pub on_descend: Option<ItemHandler>,
    /// Leaving a folder
    pub on_ascend: Option<ItemHandler>,
    /// The listener became active
    pub on_start: Option<ListenHandler>,
    /// The listener retired
    pub on_stop: Option<ListenHandler>,
}

impl std::fmt::Debug for Notifications {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let set = |h: bool| if h { "<handler>" } else { "-" };
        f.debug_struct("Notifications")
            .field("on_begin", &set(self.on_begin.is_some()))
            .field("on_end", &set(self.on_end.is_some()))
            .field("on_descend", &set(self.on_descend.is_some()))
            .field("on_ascend", &set(self.on_ascend.is_some()))
            .field("on_start", &set(self.on_start.is_some()))
            .field("on_stop", &set(self.on_stop.is_some()))
            .finish()
    }
}

/// Dispatches notifications unless muted.
#[derive(Debug, Clone, Default)]
pub(crate) struct Notifier {
    handlers: Notifications,
    muted: bool,
}

impl Notifier {
    pub(crate) fn new(handlers: Notifications) -> Self {
        Self {
            handlers,
            muted: false,
        }
    }

    pub(crate) fn mute(&mut self) {
        self.muted = true;
    }

    pub(crate) fn unmute(&mut self) {
        self.muted = false;
    }

    pub(crate) fn is_muted(&self) -> bool {
        self.muted
    }

    pub(crate) fn begin(&self, root: &Path) {
        if let (false, Some(h)) = (self.muted, &self.handlers.on_begin) {
            h(root);
        }
    }

    pub(crate) fn end(&self, result: &TraverseResult) {
        if let (false, Some(h)) = (self.muted, &self.handlers.on_end) {
            h(result);
        }
    }

    pub(crate) fn descend(&self, item: &TraverseItem) {
        if let (false, Some(h)) = (self.muted, &self.handlers.on_descend) {
            h(item);
        }
    }

    pub(crate) fn ascend(&self, item: &TraverseItem) {
        if let (false, Some(h)) = (self.muted, &self.handlers.on_ascend) {
            h(item);
        }
    }

    pub(crate) fn start(&self, description: &str) {
        if let (false, Some(h)) = (self.muted, &self.handlers.on_start) {
            h(description);
        }
    }

    pub(crate) fn stop(&self, description: &str) {
        if let (false, Some(h)) = (self.muted, &self.handlers.on_stop) {
            h(description);
        }
    }
}
