//! Navigation agent: the file-system work shared by every navigator.
//!
//! The agent reads directories through the session hooks, classifies
//! failures into displayable errors, orders entries, computes extended
//! metadata and turns listings into child items (applying the compound
//! filter and the sampler on the way).

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::NavError;
use crate::nav::filter::CompoundFilter;
use crate::nav::frame::NavigationFrame;
use crate::nav::hooks::Hooks;
use crate::nav::item::{file_name_of, DirEntry, ExtendedItem, NodeInfo, TraverseItem};
use crate::nav::options::{SortBehaviour, SortOrder, Subscription};
use crate::nav::sampling::Sampler;
use crate::nav::scope::FilterScope;
use crate::text::{TextId, TextLookup};

/// A directory listing split by kind, each half in sorted order.
#[derive(Debug, Clone, Default)]
pub(crate) struct DirectoryContents {
    pub(crate) folders: Vec<DirEntry>,
    pub(crate) files: Vec<DirEntry>,
    order: SortOrder,
}

impl DirectoryContents {
    fn new(entries: Vec<DirEntry>, order: SortOrder) -> Self {
        let (folders, files) = entries.into_iter().partition(|e| e.is_dir);
        Self {
            folders,
            files,
            order,
        }
    }

    /// Every entry in listing order.
    pub(crate) fn all(self) -> Vec<DirEntry> {
        let (mut first, second) = match self.order {
            SortOrder::FoldersFirst => (self.folders, self.files),
            SortOrder::FilesFirst => (self.files, self.folders),
        };
        first.extend(second);
        first
    }
}

pub(crate) struct Agent {
    hooks: Hooks,
    sort: SortBehaviour,
    text: Arc<dyn TextLookup>,
    subscription: Subscription,
    do_extend: bool,
    children_filter: Option<Arc<dyn CompoundFilter>>,
    sampler: Option<Sampler>,
}

impl Agent {
    pub(crate) fn new(
        hooks: Hooks,
        sort: SortBehaviour,
        text: Arc<dyn TextLookup>,
        subscription: Subscription,
        do_extend: bool,
    ) -> Self {
        Self {
            hooks,
            sort,
            text,
            subscription,
            do_extend,
            children_filter: None,
            sampler: None,
        }
    }

    pub(crate) fn with_children_filter(mut self, filter: Option<Arc<dyn CompoundFilter>>) -> Self {
        self.children_filter = filter;
        self
    }

    pub(crate) fn with_sampler(mut self, sampler: Option<Sampler>) -> Self {
        self.sampler = sampler;
        self
    }

    pub(crate) fn subscription(&self) -> Subscription {
        self.subscription
    }

    pub(crate) fn sort(&self) -> SortBehaviour {
        self.sort
    }

    fn classify(&self, path: &Path, err: Arc<io::Error>, reading: bool) -> NavError {
        if err.kind() == io::ErrorKind::NotFound {
            return NavError::NotFound {
                path: path.to_path_buf(),
                text: self.text.text(TextId::PathNotFound, path, None),
            };
        }
        let detail = err.to_string();
        if reading {
            NavError::ReadDir {
                path: path.to_path_buf(),
                text: self.text.text(TextId::ReadDirFailed, path, Some(&detail)),
                source: err,
            }
        } else {
            NavError::QueryStatus {
                path: path.to_path_buf(),
                text: self.text.text(TextId::QueryStatusFailed, path, Some(&detail)),
                source: err,
            }
        }
    }

    /// Status of a single path.
    pub(crate) fn query_status(&self, path: &Path) -> Result<NodeInfo, NavError> {
        (self.hooks.query_status)(path).map_err(|e| self.classify(path, Arc::new(e), false))
    }

    /// Sorted contents of a directory.
    pub(crate) fn read(&self, path: &Path) -> Result<DirectoryContents, NavError> {
        let mut entries =
            (self.hooks.read_directory)(path).map_err(|e| self.classify(path, Arc::new(e), true))?;
        (self.hooks.sort)(&mut entries, self.sort.case_sensitive);
        Ok(DirectoryContents::new(entries, self.sort.order))
    }

    /// Item for the walk root; carries an error when its status is unknown.
    pub(crate) fn root_item(&self, path: &Path) -> TraverseItem {
        match self.query_status(path) {
            Ok(info) => TraverseItem::new(path.to_path_buf(), Some(info), None),
            Err(e) => TraverseItem::failed(path.to_path_buf(), e, None),
        }
    }

    /// Item for an ancestor folder re-entered by a spawn resume.
    pub(crate) fn folder_item(
        &self,
        root: &Path,
        path: &Path,
        depth: usize,
        is_leaf: bool,
    ) -> TraverseItem {
        let info = self.query_status(path).unwrap_or_else(|_| NodeInfo::dir());
        let mut item = TraverseItem::new(path.to_path_buf(), Some(info), None);
        self.extend(root, &mut item, depth, is_leaf);
        item
    }

    fn extend(&self, root: &Path, item: &mut TraverseItem, depth: usize, is_leaf: bool) {
        if !self.do_extend || item.extension.is_some() {
            return;
        }

        let name = file_name_of(&item.path);
        let parent = item
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let sub_path = item
            .path
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| PathBuf::from(&name));
        let mut extension = ExtendedItem {
            depth,
            is_leaf,
            name,
            parent,
            sub_path,
            scope: FilterScope::of(depth, item.is_dir(), is_leaf),
            custom: None,
        };
        if let Some(hook) = &self.hooks.custom_extension {
            extension.custom = hook(&item.path, &extension);
        }
        item.extend(extension);
    }

    /// Extend a folder about to be visited. The extension needs the
    /// listing to tell whether the folder is a leaf, so the folder is read
    /// here only when it gets extended; otherwise the read waits for
    /// [`Agent::contents`]. A folder that cannot be read counts as a leaf.
    pub(crate) fn open(
        &self,
        frame: &NavigationFrame,
        item: &mut TraverseItem,
    ) -> Option<Result<DirectoryContents, NavError>> {
        if !self.do_extend || item.extension.is_some() {
            return None;
        }
        let contents = self.read(&item.path);
        let is_leaf = contents.as_ref().map_or(true, |c| c.folders.is_empty());
        self.extend(&frame.root, item, frame.periscope.depth(), is_leaf);
        Some(contents)
    }

    /// Contents of a folder, unless [`Agent::open`] already read them.
    pub(crate) fn contents(
        &self,
        folder: &TraverseItem,
        opened: Option<Result<DirectoryContents, NavError>>,
    ) -> Result<DirectoryContents, NavError> {
        opened.unwrap_or_else(|| self.read(&folder.path))
    }

    /// Extend a file about to be visited.
    pub(crate) fn extend_file(&self, frame: &NavigationFrame, item: &mut TraverseItem) {
        self.extend(&frame.root, item, frame.periscope.depth(), true);
    }

    fn child(&self, parent: &Arc<TraverseItem>, entry: DirEntry) -> TraverseItem {
        let error = entry
            .status_error
            .clone()
            .map(|e| self.classify(&entry.path, e, false));
        let mut item = TraverseItem::from_entry(entry, Some(Arc::clone(parent)));
        item.error = error;
        item
    }

    fn preview(&self, root: &Path, parent: &Arc<TraverseItem>, entry: DirEntry, depth: usize) -> TraverseItem {
        let mut item = self.child(parent, entry);
        let is_leaf = if item.is_dir() {
            self.read(&item.path).map_or(true, |c| c.folders.is_empty())
        } else {
            true
        };
        self.extend(root, &mut item, depth, is_leaf);
        item
    }

    fn filter_files(&self, files: Vec<DirEntry>) -> Vec<DirEntry> {
        match &self.children_filter {
            Some(filter) if self.subscription != Subscription::Folders => filter.matching(files),
            _ => files,
        }
    }

    fn sample(
        &self,
        root: &Path,
        parent: &Arc<TraverseItem>,
        entries: Vec<DirEntry>,
        depth: usize,
    ) -> Vec<TraverseItem> {
        let mut build = |entry: DirEntry| self.child(parent, entry);
        match &self.sampler {
            None => entries.into_iter().map(build).collect(),
            Some(sampler) => {
                let mut preview = |entry: DirEntry| self.preview(root, parent, entry, depth);
                sampler.sample(entries, &mut build, &mut preview)
            }
        }
    }

    /// Child items of `parent` the navigator should visit, in order.
    ///
    /// Must be called once the frame has descended into `parent`.
    pub(crate) fn children(
        &self,
        frame: &NavigationFrame,
        parent: &Arc<TraverseItem>,
        contents: DirectoryContents,
    ) -> Vec<TraverseItem> {
        let depth = frame.periscope.depth();
        match self.subscription {
            Subscription::Folders | Subscription::FoldersWithFiles => {
                self.sample(&frame.root, parent, contents.folders, depth)
            }
            Subscription::Any | Subscription::Files => {
                let contents = DirectoryContents {
                    files: self.filter_files(contents.files),
                    ..contents
                };
                self.sample(&frame.root, parent, contents.all(), depth)
            }
        }
    }

    /// Attach the (filtered, sampled) files of `folder` to it. Called before
    /// the frame descends, so the files sit one level below the periscope.
    pub(crate) fn attach_files(
        &self,
        frame: &NavigationFrame,
        folder: &Arc<TraverseItem>,
        files: Vec<DirEntry>,
    ) {
        let files = self.filter_files(files);
        let depth = frame.periscope.depth() + 1;
        let attached = self
            .sample(&frame.root, folder, files, depth)
            .into_iter()
            .filter_map(|item| item.entry)
            .collect();
        folder.attach_children(attached);
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("hooks", &self.hooks)
            .field("sort", &self.sort)
            .field("subscription", &self.subscription)
            .field("do_extend", &self.do_extend)
            .field("sampler", &self.sampler)
            .finish_non_exhaustive()
    }
}
