//! Per-node value objects carried through a walk.

use std::any::Any;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::SystemTime;

use crate::error::NavError;
use crate::nav::scope::FilterScope;

/// Caller-defined data attached to an [`ExtendedItem`].
pub type CustomData = Arc<dyn Any + Send + Sync>;

/// Status information about a node, independent of the backing file system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    /// Whether the node is a directory. Symlinks are never directories.
    pub is_dir: bool,
    /// Whether the node is a symbolic link (not followed).
    pub is_symlink: bool,
    /// Size in bytes.
    pub len: u64,
    /// Last modification time, if known.
    pub modified: Option<SystemTime>,
}

impl NodeInfo {
    /// Info for a directory.
    #[must_use]
    pub fn dir() -> Self {
        Self {
            is_dir: true,
            is_symlink: false,
            len: 0,
            modified: None,
        }
    }

    /// Info for a regular file of `len` bytes.
    #[must_use]
    pub fn file(len: u64) -> Self {
        Self {
            is_dir: false,
            is_symlink: false,
            len,
            modified: None,
        }
    }
}

impl From<&Metadata> for NodeInfo {
    fn from(metadata: &Metadata) -> Self {
        let file_type = metadata.file_type();
        Self {
            is_dir: file_type.is_dir(),
            is_symlink: file_type.is_symlink(),
            len: metadata.len(),
            modified: metadata.modified().ok(),
        }
    }
}

/// One entry returned by a directory listing.
#[derive(Debug, Clone)]
pub struct DirEntry {
    /// Base name of the entry
    pub name: String,
    /// Full path of the entry
    pub path: PathBuf,
    /// Whether the entry is a directory
    pub is_dir: bool,
    /// Resolved status, absent if resolution failed
    pub info: Option<NodeInfo>,
    /// Why status resolution failed
    pub status_error: Option<Arc<std::io::Error>>,
}

impl DirEntry {
    /// Entry with resolved status.
    #[must_use]
    pub fn new(path: PathBuf, info: NodeInfo) -> Self {
        Self {
            name: file_name_of(&path),
            is_dir: info.is_dir,
            path,
            info: Some(info),
            status_error: None,
        }
    }

    /// Entry whose status could not be resolved.
    #[must_use]
    pub fn unresolved(path: PathBuf, is_dir: bool, error: std::io::Error) -> Self {
        Self {
            name: file_name_of(&path),
            path,
            is_dir,
            info: None,
            status_error: Some(Arc::new(error)),
        }
    }
}

/// Derived metadata for a node, computed once when extension is enabled.
#[derive(Clone)]
pub struct ExtendedItem {
    /// Depth relative to the traversal root (root = 0)
    pub depth: usize,
    /// Folder without sub-folders, or a file
    pub is_leaf: bool,
    /// Base name
    pub name: String,
    /// Path of the containing folder
    pub parent: PathBuf,
    /// Path relative to the traversal root
    pub sub_path: PathBuf,
    /// Structural scope
    pub scope: FilterScope,
    /// Caller-defined extension slot
    pub custom: Option<CustomData>,
}

impl std::fmt::Debug for ExtendedItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtendedItem")
            .field("depth", &self.depth)
            .field("is_leaf", &self.is_leaf)
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("sub_path", &self.sub_path)
            .field("scope", &self.scope)
            .field("custom", &self.custom.as_ref().map(|_| "<custom>"))
            .finish()
    }
}

/// A node handed to the traversal callback.
#[derive(Debug)]
pub struct TraverseItem {
    /// Full path of the node
    pub path: PathBuf,
    /// Listing entry the node came from (absent for the walk root)
    pub entry: Option<DirEntry>,
    /// Status of the node
    pub info: Option<NodeInfo>,
    /// Derived metadata, present when extension is enabled
    pub extension: Option<ExtendedItem>,
    /// Error attached to this node
    pub error: Option<NavError>,
    /// The containing folder's item
    pub parent: Option<Arc<TraverseItem>>,
    children: OnceLock<Vec<DirEntry>>,
    pub(crate) admitted: bool,
}

impl TraverseItem {
    /// Item for a path whose status is known.
    #[must_use]
    pub fn new(path: PathBuf, info: Option<NodeInfo>, parent: Option<Arc<TraverseItem>>) -> Self {
        Self {
            path,
            entry: None,
            info,
            extension: None,
            error: None,
            parent,
            children: OnceLock::new(),
            admitted: false,
        }
    }

    /// Item created from a directory listing entry.
    #[must_use]
    pub fn from_entry(entry: DirEntry, parent: Option<Arc<TraverseItem>>) -> Self {
        let mut item = Self::new(entry.path.clone(), entry.info.clone(), parent);
        item.entry = Some(entry);
        item
    }

    /// Item standing for a path that could not be resolved at all.
    #[must_use]
    pub fn failed(path: PathBuf, error: NavError, parent: Option<Arc<TraverseItem>>) -> Self {
        let mut item = Self::new(path, None, parent);
        item.error = Some(error);
        item
    }

    /// Copy of this item carrying `error`, used to report a failure on a
    /// node that was already visited.
    #[must_use]
    pub fn clone_with_error(&self, error: NavError) -> Self {
        Self {
            path: self.path.clone(),
            entry: self.entry.clone(),
            info: self.info.clone(),
            extension: self.extension.clone(),
            error: Some(error),
            parent: self.parent.clone(),
            children: self.children.clone(),
            admitted: self.admitted,
        }
    }

    /// Whether the node is a directory.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.info
            .as_ref()
            .map(|i| i.is_dir)
            .or_else(|| self.entry.as_ref().map(|e| e.is_dir))
            .unwrap_or(false)
    }

    /// Base name of the node.
    #[must_use]
    pub fn name(&self) -> String {
        match &self.extension {
            Some(ext) => ext.name.clone(),
            None => file_name_of(&self.path),
        }
    }

    /// Scope of the node, undefined when the item is not extended.
    #[must_use]
    pub fn scope(&self) -> FilterScope {
        self.extension
            .as_ref()
            .map_or(FilterScope::UNDEFINED, |ext| ext.scope)
    }

    /// Depth of the node, if extended.
    #[must_use]
    pub fn depth(&self) -> Option<usize> {
        self.extension.as_ref().map(|ext| ext.depth)
    }

    /// Files attached to a folder in folders-with-files mode.
    #[must_use]
    pub fn children(&self) -> &[DirEntry] {
        self.children.get().map_or(&[], Vec::as_slice)
    }

    pub(crate) fn attach_children(&self, children: Vec<DirEntry>) {
        if self.children.set(children).is_err() {
            panic!(
                "children already attached to item: {}",
                self.path.display()
            );
        }
    }

    /// Set the extension.
    ///
    /// # Panics
    ///
    /// Panics if the item has already been extended.
    pub(crate) fn extend(&mut self, extension: ExtendedItem) {
        if self.extension.is_some() {
            panic!("item already extended: {}", self.path.display());
        }
        self.extension = Some(extension);
    }
}

pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
