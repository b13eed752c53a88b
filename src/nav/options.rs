//! Session options.
//!
//! [`OptionsStore`] holds everything declarative; it is what gets persisted
//! and what a configuration file can set. [`TraverseOptions`] wraps it with
//! the live pieces (callback, hooks, custom filters) that cannot be
//! serialized and must be re-attached by a restorer on resume.

use std::sync::Arc;

use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};

use crate::error::NavError;
use crate::nav::accelerate::{AccelerationOptions, JobOutput};
use crate::nav::filter::{CompoundFilter, FilterDefinitions, NodeFilter};
use crate::nav::hooks::Hooks;
use crate::nav::item::TraverseItem;
use crate::nav::listen::{ListenBehaviour, ListenDefinitions, ListenTriggers};
use crate::nav::notify::Notifications;
use crate::nav::sampling::{SamplingIteration, SamplingOptions};
use crate::signal::CancelToken;

/// The caller's per-node callback.
///
/// Returning [`NavError::SkipDir`] skips the children of a folder (or the
/// remaining siblings of a file); [`NavError::SkipAll`] ends the walk
/// without an error. Any other error aborts the walk.
pub type Callback = Arc<dyn Fn(&TraverseItem) -> Result<(), NavError> + Send + Sync>;

/// Which nodes a walk delivers to the callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Subscription {
    /// Files and folders
    #[default]
    Any,
    /// Folders only
    Folders,
    /// Folders, each carrying its files
    FoldersWithFiles,
    /// Files only
    Files,
}

impl std::fmt::Display for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Any => "any",
            Self::Folders => "folders",
            Self::FoldersWithFiles => "folders-with-files",
            Self::Files => "files",
        };
        f.write_str(name)
    }
}

/// Relative order of folders and files in a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Folders before files
    #[default]
    FoldersFirst,
    /// Files before folders
    FilesFirst,
}

/// Listing order settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SortBehaviour {
    /// Compare names case-sensitively
    pub case_sensitive: bool,
    /// Folders or files first
    pub order: SortOrder,
}

/// Behaviour flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Behaviours {
    /// Listing order
    pub sort: SortBehaviour,
    /// Listening boundaries
    pub listen: ListenBehaviour,
    /// Compute extended metadata for every node
    pub do_extend: bool,
}

/// Persistence settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistOptions {
    /// Marshalling format; only `json` is supported
    pub format: String,
}

impl Default for PersistOptions {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
        }
    }
}

/// Declarative options; persisted verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsStore {
    /// Which nodes reach the callback
    pub subscription: Subscription,
    /// Behaviour flags
    pub behaviours: Behaviours,
    /// Node and children filters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_defs: Option<FilterDefinitions>,
    /// Listening boundaries
    #[serde(skip_serializing_if = "ListenDefinitions::is_empty")]
    pub listen_defs: ListenDefinitions,
    /// Sampling settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampling: Option<SamplingOptions>,
    /// Accelerator settings
    pub acceleration: AccelerationOptions,
    /// Persistence settings
    pub persist: PersistOptions,
}

/// Filter objects supplied directly by the caller. They take precedence
/// over the declarative definitions and are not persisted.
#[derive(Clone, Default)]
pub struct CustomFilters {
    /// Per-node filter
    pub node: Option<Arc<dyn NodeFilter>>,
    /// Sibling filter applied to the files of each folder
    pub children: Option<Arc<dyn CompoundFilter>>,
}

impl std::fmt::Debug for CustomFilters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomFilters")
            .field("node", &self.node.as_ref().map(|n| n.description().to_string()))
            .field(
                "children",
                &self.children.as_ref().map(|c| c.description().to_string()),
            )
            .finish()
    }
}

/// Everything a session needs: the declarative store plus live pieces.
#[derive(Clone, Default)]
pub struct TraverseOptions {
    /// Declarative, persisted options
    pub store: OptionsStore,
    /// The per-node callback (required)
    pub callback: Option<Callback>,
    /// File-system hooks
    pub hooks: Hooks,
    /// Lifecycle notifications
    pub notify: Notifications,
    /// Caller supplied listen predicates
    pub listen: ListenTriggers,
    /// Caller supplied filters
    pub custom_filters: CustomFilters,
    /// Iteration used by custom sampling
    pub iteration: Option<SamplingIteration>,
    /// Cooperative cancellation
    pub cancel: CancelToken,
    /// Stream receiving accelerated callback results
    pub output: Option<Sender<JobOutput>>,
}

impl TraverseOptions {
    /// Default options invoking `callback` for every node.
    pub fn with_callback<F>(callback: F) -> Self
    where
        F: Fn(&TraverseItem) -> Result<(), NavError> + Send + Sync + 'static,
    {
        Self {
            callback: Some(Arc::new(callback)),
            ..Self::default()
        }
    }
}

impl std::fmt::Debug for TraverseOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraverseOptions")
            .field("store", &self.store)
            .field("callback", &self.callback.as_ref().map(|_| "<callback>"))
            .field("hooks", &self.hooks)
            .field("notify", &self.notify)
            .field("listen", &self.listen)
            .field("custom_filters", &self.custom_filters)
            .field("iteration", &self.iteration)
            .field("cancel", &self.cancel)
            .field("output", &self.output.as_ref().map(|_| "<sender>"))
            .finish()
    }
}
