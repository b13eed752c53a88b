//! Persisted walk state.
//!
//! A state file is a JSON object with exactly two members: `store`, the
//! declarative options of the session, and `active`, the position the walk
//! had reached. Live pieces (callback, hooks, custom filters) are not
//! persisted; a [`Restorer`] re-attaches them when the state is loaded.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::nav::listen::ListeningState;
use crate::nav::metrics::Metrics;
use crate::nav::options::{OptionsStore, TraverseOptions};

/// The only supported persistence format.
pub const JSON_FORMAT: &str = "json";

/// How far the walk got with the saved node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeProgress {
    /// Reached but not yet handed to the callback
    #[default]
    Reached,
    /// A folder that was handed to the callback; its contents are still due
    Delivered,
    /// Nothing below or at the node is due any more
    Completed,
}

/// Where a walk had got to when it was saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveState {
    /// Root of the walk
    pub root: PathBuf,
    /// Last node the walk reached
    pub node_path: PathBuf,
    /// Whether that node is a folder
    #[serde(default)]
    pub is_dir: bool,
    /// What had happened to that node
    #[serde(default)]
    pub progress: NodeProgress,
    /// Listening state at that node
    pub listen: ListeningState,
    /// Depth of that node relative to the root
    pub depth: usize,
    /// Callback invocations so far
    pub metrics: Metrics,
    /// When the state was captured
    pub saved_at: DateTime<Utc>,
}

/// Contents of a state file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PersistedState {
    /// Declarative options
    pub store: OptionsStore,
    /// Walk position
    pub active: ActiveState,
}

/// Re-attaches the non-serializable parts of the options (at least the
/// callback) to a loaded state. It may also adjust the active state.
pub type Restorer =
    Box<dyn FnOnce(&mut TraverseOptions, &mut ActiveState) -> Result<(), ConfigError> + Send>;

/// Reads and writes state files.
#[derive(Debug, Clone)]
pub struct StateMarshaller {
    format: String,
}

impl StateMarshaller {
    /// Marshaller for `format`; only `json` is accepted.
    pub fn new(format: &str) -> Result<Self, ConfigError> {
        if !format.eq_ignore_ascii_case(JSON_FORMAT) {
            return Err(ConfigError::UnsupportedPersistFormat(format.to_string()));
        }
        Ok(Self {
            format: JSON_FORMAT.to_string(),
        })
    }

    /// Marshaller chosen from a state file's extension. A missing extension
    /// is read as JSON.
    pub fn for_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension() {
            None => Self::new(JSON_FORMAT),
            Some(ext) => Self::new(&ext.to_string_lossy()),
        }
    }

    /// The format in use.
    #[must_use]
    pub fn format(&self) -> &str {
        &self.format
    }

    /// Write `store` and `active` to `path`.
    pub fn marshal(
        &self,
        path: &Path,
        store: &OptionsStore,
        active: &ActiveState,
    ) -> Result<(), ConfigError> {
        let fail = |reason: String| ConfigError::PersistedState {
            path: path.to_path_buf(),
            reason,
        };

        let state = PersistedState {
            store: store.clone(),
            active: active.clone(),
        };
        let json = serde_json::to_string_pretty(&state)
            .map_err(|e| fail(format!("failed to serialize state: {e}")))?;

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .map_err(|e| fail(format!("failed to create {}: {e}", dir.display())))?;
        }
        fs::write(path, json).map_err(|e| fail(format!("failed to write state: {e}")))?;
        log::debug!("saved walk state to {}", path.display());
        Ok(())
    }

    /// Read the state stored at `path`.
    pub fn unmarshal(&self, path: &Path) -> Result<PersistedState, ConfigError> {
        let fail = |reason: String| ConfigError::PersistedState {
            path: path.to_path_buf(),
            reason,
        };

        let content =
            fs::read_to_string(path).map_err(|e| fail(format!("failed to read state: {e}")))?;
        let state: PersistedState = serde_json::from_str(&content)
            .map_err(|e| fail(format!("invalid state file: {e}")))?;

        if !state.active.node_path.starts_with(&state.active.root) {
            return Err(fail(format!(
                "node {} is not below root {}",
                state.active.node_path.display(),
                state.active.root.display()
            )));
        }
        Ok(state)
    }
}

/// Rebuild options from a loaded state: defaults, overlaid with the
/// persisted store, then handed to `restorer`.
pub fn restore(
    state: PersistedState,
    restorer: Option<Restorer>,
) -> Result<(TraverseOptions, ActiveState), ConfigError> {
    let restorer = restorer.ok_or(ConfigError::MissingRestorer)?;
    let PersistedState { store, mut active } = state;

    let mut options = TraverseOptions {
        store,
        ..TraverseOptions::default()
    };
    restorer(&mut options, &mut active)?;
    Ok((options, active))
}
