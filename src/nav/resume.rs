//! Resume strategies for a saved walk.
//!
//! Fastward re-walks from the root with the callback suppressed until it
//! gets past the saved node. Spawn rebuilds the unvisited frontier
//! directly: starting at the saved node it re-enters every later sibling,
//! then climbs one level and repeats until it reaches the root.
//!
//! Both strategies honour the saved [`NodeProgress`]. A node that was only
//! reached is visited again. A folder that was delivered has just its
//! contents walked. A completed node is left alone. Ancestors of the saved
//! node are never delivered again.

use std::cmp::Ordering;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::NavError;
use crate::nav::frame::NavigationFrame;
use crate::nav::hooks::compare_names;
use crate::nav::item::{file_name_of, TraverseItem};
use crate::nav::listen::FastwardTarget;
use crate::nav::metrics::{Metrics, TraverseResult};
use crate::nav::navigator::{deliver_read_error, descend, walk_children, Navigator};
use crate::nav::options::{SortBehaviour, SortOrder};
use crate::nav::persist::{ActiveState, NodeProgress};

/// How a saved walk is continued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResumeStrategy {
    /// Re-walk from the root, suppressing the callback until the saved node
    #[default]
    Fastward,
    /// Re-enter the siblings following the saved node, level by level
    Spawn,
}

impl std::fmt::Display for ResumeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fastward => f.write_str("fastward"),
            Self::Spawn => f.write_str("spawn"),
        }
    }
}

pub(crate) fn fastward(
    navigator: &dyn Navigator,
    frame: &mut NavigationFrame,
    active: &ActiveState,
) -> TraverseResult {
    log::debug!(
        "fastward resume: catching up to {} ({:?}, {:?})",
        active.node_path.display(),
        active.progress,
        active.listen
    );
    let target = FastwardTarget {
        path: active.node_path.clone(),
        is_dir: active.is_dir,
        progress: active.progress,
    };
    frame.fastward(target, active.listen);
    navigator.top(frame, &active.root)
}

pub(crate) fn spawn(
    navigator: &dyn Navigator,
    frame: &mut NavigationFrame,
    active: &ActiveState,
) -> TraverseResult {
    frame.restore_listening(active.listen);
    if active.node_path == active.root && active.progress == NodeProgress::Reached {
        log::debug!("spawn resume at the root, walking from the top");
        return navigator.top(frame, &active.root);
    }

    frame.notifier.begin(&active.root);
    let result = spawn_from(navigator, frame, active);
    frame.periscope.rebase(0);
    frame.notifier.end(&result);
    result
}

fn spawn_from(
    navigator: &dyn Navigator,
    frame: &mut NavigationFrame,
    active: &ActiveState,
) -> TraverseResult {
    let depth = active
        .node_path
        .strip_prefix(&active.root)
        .map_or(0, |rel| rel.components().count());

    let mut result = TraverseResult::default();
    if active.progress == NodeProgress::Delivered {
        let before = frame.metrics.clone();
        let outcome = spawn_contents(navigator, frame, &active.root, &active.node_path, depth);
        result.metrics.merge(&frame.metrics.since(&before));
        match outcome {
            Ok(()) | Err(NavError::SkipDir) => {}
            Err(e) => {
                if !e.is_control() {
                    result.error = Some(e);
                }
                return result;
            }
        }
    }

    let first = Anchor {
        is_dir: active.is_dir || active.progress == NodeProgress::Delivered,
        inclusive: active.progress == NodeProgress::Reached,
    };
    result.merge(spawn_levels(navigator, frame, active, depth, first))
}

/// Walk the contents of a folder the interrupted walk had already
/// delivered. A folder that has vanished since is passed over.
fn spawn_contents(
    navigator: &dyn Navigator,
    frame: &mut NavigationFrame,
    root: &Path,
    path: &Path,
    depth: usize,
) -> Result<(), NavError> {
    let agent = navigator.agent();
    frame.periscope.rebase(depth);
    let contents = match agent.read(path) {
        Ok(contents) => contents,
        Err(NavError::NotFound { .. }) => {
            log::debug!("spawn: {} vanished", path.display());
            return Ok(());
        }
        Err(e) => {
            let folder = agent.folder_item(root, path, depth, true);
            return deliver_read_error(frame, &folder, e);
        }
    };

    log::debug!("spawn: walking the contents of {}", path.display());
    let is_leaf = contents.folders.is_empty();
    let folder = Arc::new(agent.folder_item(root, path, depth, is_leaf));
    descend(frame, &folder, |frame| {
        let children = agent.children(frame, &folder, contents);
        walk_children(navigator, frame, children)
    })
}

/// Where re-entry starts among the siblings of an anchor.
#[derive(Debug, Clone, Copy)]
struct Anchor {
    is_dir: bool,
    inclusive: bool,
}

fn spawn_levels(
    navigator: &dyn Navigator,
    frame: &mut NavigationFrame,
    active: &ActiveState,
    mut depth: usize,
    first: Anchor,
) -> TraverseResult {
    let agent = navigator.agent();
    let root = active.root.as_path();
    let mut anchor = active.node_path.clone();
    let mut position = first;
    let mut result = TraverseResult::default();

    while anchor != root && depth > 0 {
        let Some(parent) = anchor.parent().map(Path::to_path_buf) else {
            break;
        };
        let parent_depth = depth - 1;

        match agent.read(&parent) {
            Err(e) => {
                frame.periscope.rebase(parent_depth);
                let folder = agent.folder_item(root, &parent, parent_depth, true);
                if let Err(e) = deliver_read_error(frame, &folder, e) {
                    return result.merge(TraverseResult::from_outcome(Err(e), Metrics::default()));
                }
            }
            Ok(contents) => {
                let is_leaf = contents.folders.is_empty();
                let parent_item = Arc::new(agent.folder_item(root, &parent, parent_depth, is_leaf));
                frame.periscope.rebase(depth);
                let siblings = agent.children(frame, &parent_item, contents);
                let start = resume_index(&siblings, &anchor, position, agent.sort());
                log::debug!(
                    "spawn: resuming {} at sibling {start} of {} (depth {depth})",
                    parent.display(),
                    siblings.len()
                );

                for sibling in siblings.into_iter().skip(start) {
                    let (outcome, metrics) = navigator.enter(frame, sibling);
                    result.metrics.merge(&metrics);
                    match outcome {
                        Ok(()) => {}
                        Err(NavError::SkipDir) => break,
                        Err(e) => {
                            if !e.is_control() {
                                result.error = Some(e);
                            }
                            return result;
                        }
                    }
                }
            }
        }

        // Every ancestor is a folder that has already been delivered.
        position = Anchor {
            is_dir: true,
            inclusive: false,
        };
        anchor = parent;
        depth = parent_depth;
    }
    result
}

/// Index of the first sibling to re-enter.
///
/// A vanished anchor resumes at the first sibling that would have been
/// listed after it: siblings of its own kind sort after it by name, and
/// every sibling of the kind listed second follows an anchor of the kind
/// listed first.
fn resume_index(siblings: &[TraverseItem], anchor: &Path, at: Anchor, sort: SortBehaviour) -> usize {
    if let Some(pos) = siblings.iter().position(|s| s.path == anchor) {
        return if at.inclusive { pos } else { pos + 1 };
    }

    let name = file_name_of(anchor);
    log::debug!("spawn: {} vanished, resuming after its name", anchor.display());
    let group = |is_dir: bool| match (sort.order, is_dir) {
        (SortOrder::FoldersFirst, true) | (SortOrder::FilesFirst, false) => 0,
        _ => 1,
    };
    let anchor_group = group(at.is_dir);
    siblings
        .iter()
        .position(|s| match group(s.is_dir()).cmp(&anchor_group) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => {
                compare_names(&s.name(), &name, sort.case_sensitive) == Ordering::Greater
            }
        })
        .unwrap_or(siblings.len())
}
