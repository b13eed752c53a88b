//! Structural scope of a node and the depth tracker that computes it.

use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// Bitmask classifying where a node sits in the tree.
    ///
    /// Depth 0 is `ROOT`, depth 1 is `TOP`, anything deeper is
    /// `INTERMEDIATE`. Exactly one of those three is set on every extended
    /// node; `LEAF` is added to folders without sub-folders and to files.
    /// `FILE` / `FOLDER` record the node kind. The empty mask is "undefined".
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct FilterScope: u32 {
        /// The traversal root.
        const ROOT = 1;
        /// Direct children of the root.
        const TOP = 1 << 1;
        /// Folders with no sub-folders, and files.
        const LEAF = 1 << 2;
        /// Nodes deeper than the top level.
        const INTERMEDIATE = 1 << 3;
        /// Caller-defined meaning.
        const CUSTOM = 1 << 4;
        /// The node is a file.
        const FILE = 1 << 5;
        /// The node is a folder.
        const FOLDER = 1 << 6;
        /// Every scope.
        const ALL = Self::ROOT.bits()
            | Self::TOP.bits()
            | Self::LEAF.bits()
            | Self::INTERMEDIATE.bits()
            | Self::CUSTOM.bits()
            | Self::FILE.bits()
            | Self::FOLDER.bits();
    }
}

impl FilterScope {
    /// The "undefined" scope (no bits).
    pub const UNDEFINED: Self = Self::empty();

    /// Compute the scope of a node from its root-relative depth.
    #[must_use]
    pub fn of(depth: usize, is_dir: bool, is_leaf: bool) -> Self {
        let mut scope = match depth {
            0 => Self::ROOT,
            1 => Self::TOP,
            _ => Self::INTERMEDIATE,
        };
        if is_leaf || !is_dir {
            scope |= Self::LEAF;
        }
        scope |= if is_dir { Self::FOLDER } else { Self::FILE };
        scope
    }
}

impl Default for FilterScope {
    fn default() -> Self {
        Self::ALL
    }
}

/// Tracks the depth of the node currently being visited.
///
/// `offset` lets a walk that re-enters below the real root (spawn resume)
/// keep reporting depths relative to that root.
#[derive(Debug, Clone, Default)]
pub(crate) struct Periscope {
    offset: usize,
    level: usize,
}

impl Periscope {
    pub(crate) fn depth(&self) -> usize {
        self.offset + self.level
    }

    pub(crate) fn descend(&mut self) {
        self.level += 1;
    }

    pub(crate) fn ascend(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    /// Restart tracking with the next entered node at `depth`.
    pub(crate) fn rebase(&mut self, depth: usize) {
        self.offset = depth;
        self.level = 0;
    }
}
