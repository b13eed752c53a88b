//! The navigator contract shared by the three traversal strategies.

use std::path::Path;
use std::sync::Arc;

use crate::error::NavError;
use crate::nav::agent::Agent;
use crate::nav::files::FilesNavigator;
use crate::nav::folders::FoldersNavigator;
use crate::nav::frame::NavigationFrame;
use crate::nav::item::TraverseItem;
use crate::nav::metrics::{Metrics, TraverseResult};
use crate::nav::options::Subscription;
use crate::nav::universal::UniversalNavigator;

/// A depth-first, pre-order traversal strategy.
pub(crate) trait Navigator: Send + Sync {
    /// Which nodes the strategy delivers.
    fn subscription(&self) -> Subscription;

    /// The agent performing file-system work.
    fn agent(&self) -> &Agent;

    /// Visit `item` and, for folders, everything below it.
    ///
    /// `Err(SkipDir)` is only returned for a file and tells the caller to
    /// skip the file's remaining siblings.
    fn traverse(&self, frame: &mut NavigationFrame, item: TraverseItem) -> Result<(), NavError>;

    /// Traverse `item`, reporting the raw outcome and the metrics it added.
    fn enter(&self, frame: &mut NavigationFrame, item: TraverseItem) -> (Result<(), NavError>, Metrics) {
        let before = frame.metrics.clone();
        let outcome = self.traverse(frame, item);
        (outcome, frame.metrics.since(&before))
    }

    /// Walk the tree at `root` from the top.
    fn top(&self, frame: &mut NavigationFrame, root: &Path) -> TraverseResult {
        log::debug!("walking {} ({})", root.display(), self.subscription());
        frame.notifier.begin(root);
        let item = self.agent().root_item(root);
        let (outcome, metrics) = self.enter(frame, item);
        frame.settle_fastward();
        let result = TraverseResult::from_outcome(outcome, metrics);
        frame.notifier.end(&result);
        result
    }
}

/// Navigator for `subscription`.
pub(crate) fn new_navigator(agent: Agent) -> Box<dyn Navigator> {
    match agent.subscription() {
        Subscription::Any => Box::new(UniversalNavigator::new(agent)),
        Subscription::Folders => Box::new(FoldersNavigator::new(agent, false)),
        Subscription::FoldersWithFiles => Box::new(FoldersNavigator::new(agent, true)),
        Subscription::Files => Box::new(FilesNavigator::new(agent)),
    }
}

/// Traverse `children` in order. A `SkipDir` from a child ends the loop
/// without an error.
pub(crate) fn walk_children<N>(
    navigator: &N,
    frame: &mut NavigationFrame,
    children: Vec<TraverseItem>,
) -> Result<(), NavError>
where
    N: Navigator + ?Sized,
{
    for child in children {
        match navigator.traverse(frame, child) {
            Ok(()) => {}
            Err(NavError::SkipDir) => break,
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Run `body` one level below `folder`, firing descend/ascend
/// notifications around it.
pub(crate) fn descend<F>(frame: &mut NavigationFrame, folder: &Arc<TraverseItem>, body: F) -> Result<(), NavError>
where
    F: FnOnce(&mut NavigationFrame) -> Result<(), NavError>,
{
    frame.periscope.descend();
    frame.notifier.descend(folder);
    let result = body(frame);
    frame.periscope.ascend();
    frame.notifier.ascend(folder);
    result
}

/// Deliver the read error of `folder` as a second invocation.
pub(crate) fn deliver_read_error(
    frame: &mut NavigationFrame,
    folder: &TraverseItem,
    error: NavError,
) -> Result<(), NavError> {
    frame.proxy_error(&Arc::new(folder.clone_with_error(error)))
}
