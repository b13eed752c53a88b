//! File-system hook points.
//!
//! The engine touches the file system only through these hooks, so any
//! backend (native disk, in-memory tree, network share) can stand in by
//! replacing them. Each hook is replaceable on its own; the defaults read
//! the native disk without following symlinks.

use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use crate::nav::item::{CustomData, DirEntry, ExtendedItem, NodeInfo};

/// Query the status of a single path.
pub type QueryStatusHook = Arc<dyn Fn(&Path) -> io::Result<NodeInfo> + Send + Sync>;

/// List the entries of a directory (unordered).
pub type ReadDirectoryHook = Arc<dyn Fn(&Path) -> io::Result<Vec<DirEntry>> + Send + Sync>;

/// Order entries by name; the flag requests case-sensitive comparison.
pub type SortHook = Arc<dyn Fn(&mut Vec<DirEntry>, bool) + Send + Sync>;

/// Fill the caller-defined slot of a freshly computed extension.
pub type CustomExtensionHook =
    Arc<dyn Fn(&Path, &ExtendedItem) -> Option<CustomData> + Send + Sync>;

/// The set of hooks used by a session.
#[derive(Clone)]
pub struct Hooks {
    /// Status of the walk root
    pub query_status: QueryStatusHook,
    /// Directory listing
    pub read_directory: ReadDirectoryHook,
    /// Entry ordering
    pub sort: SortHook,
    /// Optional custom extension data
    pub custom_extension: Option<CustomExtensionHook>,
}

impl Default for Hooks {
    fn default() -> Self {
        Self {
            query_status: Arc::new(native_query_status),
            read_directory: Arc::new(native_read_directory),
            sort: Arc::new(sort_entries),
            custom_extension: None,
        }
    }
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("query_status", &"<hook>")
            .field("read_directory", &"<hook>")
            .field("sort", &"<hook>")
            .field(
                "custom_extension",
                &self.custom_extension.as_ref().map(|_| "<hook>"),
            )
            .finish()
    }
}

/// Status of `path` from the native disk. Symlinks are not followed.
pub fn native_query_status(path: &Path) -> io::Result<NodeInfo> {
    let metadata = fs::symlink_metadata(path)?;
    Ok(NodeInfo::from(&metadata))
}

/// Entries of `path` from the native disk.
///
/// A failure resolving one entry's status does not fail the listing; the
/// entry is returned unresolved and the error is reported on that node.
pub fn native_read_directory(path: &Path) -> io::Result<Vec<DirEntry>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let entry_path = entry.path();
        match entry.metadata() {
            Ok(metadata) => entries.push(DirEntry::new(entry_path, NodeInfo::from(&metadata))),
            Err(e) => {
                let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                log::debug!("Failed to resolve status of {}: {}", entry_path.display(), e);
                entries.push(DirEntry::unresolved(entry_path, is_dir, e));
            }
        }
    }
    Ok(entries)
}

/// Default ordering: by name, optionally ignoring case (ties broken by the
/// exact name so the order is total).
pub fn sort_entries(entries: &mut Vec<DirEntry>, case_sensitive: bool) {
    entries.sort_by(|a, b| compare_names(&a.name, &b.name, case_sensitive));
}

pub(crate) fn compare_names(a: &str, b: &str, case_sensitive: bool) -> Ordering {
    if case_sensitive {
        a.cmp(b)
    } else {
        a.to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| a.cmp(b))
    }
}
