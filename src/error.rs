//! Error types, exit codes and structured error reporting.
//!
//! Two families of errors exist:
//!
//! - [`NavError`]: everything that flows through a walk. Callbacks return it,
//!   hooks produce it, and [`crate::nav::TraverseResult`] carries the first
//!   unresolved one. Skip and terminate signals are modelled as variants so
//!   the callback contract stays a plain `Result`.
//! - [`ConfigError`]: fail-fast setup errors, returned from session
//!   construction before any I/O happens.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

/// Errors raised while walking a tree.
#[derive(thiserror::Error, Debug, Clone)]
pub enum NavError {
    /// Skip the children of the current folder (or the remaining siblings
    /// when returned for a file).
    #[error("skip directory")]
    SkipDir,

    /// Stop the whole walk without reporting a failure.
    #[error("skip all")]
    SkipAll,

    /// The listener has retired; the walk must unwind.
    #[error("traversal terminated")]
    Terminate,

    /// The walk was cancelled through its cancel token.
    #[error("traversal cancelled")]
    Cancelled,

    /// A path vanished or never existed.
    #[error("{text}")]
    NotFound {
        /// Path that could not be found
        path: PathBuf,
        /// Display text rendered by the session's text lookup
        text: String,
    },

    /// Reading the entries of a directory failed.
    #[error("{text}")]
    ReadDir {
        /// Directory being read
        path: PathBuf,
        /// Display text rendered by the session's text lookup
        text: String,
        /// The underlying I/O error
        #[source]
        source: Arc<std::io::Error>,
    },

    /// Querying the status of a path failed.
    #[error("{text}")]
    QueryStatus {
        /// Path being queried
        path: PathBuf,
        /// Display text rendered by the session's text lookup
        text: String,
        /// The underlying I/O error
        #[source]
        source: Arc<std::io::Error>,
    },

    /// A failure reported by the caller's callback.
    #[error("{0}")]
    Callback(Arc<dyn std::error::Error + Send + Sync + 'static>),
}

impl NavError {
    /// Wrap an arbitrary caller error.
    pub fn callback<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        Self::Callback(Arc::from(err.into()))
    }

    /// Skip and terminate signals are consumed by the walk itself.
    #[must_use]
    pub fn is_control(&self) -> bool {
        matches!(self, Self::SkipDir | Self::SkipAll | Self::Terminate)
    }

    /// Path associated with an I/O flavoured error.
    #[must_use]
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::NotFound { path, .. }
            | Self::ReadDir { path, .. }
            | Self::QueryStatus { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Configuration errors, all raised at session construction time.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// No client callback was supplied.
    #[error("missing callback: a traversal callback is required")]
    MissingCallback,

    /// A resume session was requested without a restorer.
    #[error("missing restorer: resume requires a restorer to re-attach the callback")]
    MissingRestorer,

    /// A glob pattern failed to compile.
    #[error("invalid glob pattern '{pattern}': {reason}")]
    InvalidGlob {
        /// Offending pattern
        pattern: String,
        /// Why it was rejected
        reason: String,
    },

    /// A regex pattern failed to compile.
    #[error("invalid regex pattern '{pattern}': {source}")]
    InvalidRegex {
        /// Offending pattern
        pattern: String,
        /// The underlying regex error
        #[source]
        source: regex::Error,
    },

    /// An extended glob was malformed.
    #[error("invalid extended glob '{pattern}': {reason}")]
    InvalidExtendedGlob {
        /// Offending pattern
        pattern: String,
        /// Why it was rejected
        reason: String,
    },

    /// A filter definition is incomplete.
    #[error("invalid filter definition: {0}")]
    InvalidFilterDef(String),

    /// Accelerator worker count outside the allowed range.
    #[error("invalid number of workers {requested}: must be between {min} and {max}")]
    InvalidWorkerCount {
        /// Requested pool size
        requested: usize,
        /// Minimum allowed
        min: usize,
        /// Maximum allowed
        max: usize,
    },

    /// The accelerator job queue must hold at least one job.
    #[error("invalid job queue size {0}: must be at least 1")]
    InvalidJobQueueSize(usize),

    /// An accelerator worker thread could not be started.
    #[error("failed to spawn accelerator worker: {0}")]
    WorkerSpawn(String),

    /// Only JSON persistence is supported.
    #[error("unsupported persistence format '{0}': only 'json' is supported")]
    UnsupportedPersistFormat(String),

    /// A persisted state file could not be read or written.
    #[error("persisted state error for {path}: {reason}")]
    PersistedState {
        /// State file path
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// A configuration file could not be loaded.
    #[error("configuration error: {0}")]
    File(String),

    /// The caller's restorer rejected the persisted state.
    #[error("restore failed: {0}")]
    Restore(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::File(err.to_string())
    }
}

/// Exit codes for the rustwalk binary.
///
/// - 0: Success (walk completed)
/// - 1: General error (setup failure or unexpected error)
/// - 3: Incomplete (the walk finished with an unresolved error)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// The walk completed normally.
    Success = 0,
    /// General error: An unexpected error occurred.
    GeneralError = 1,
    /// The walk stopped on an error reported by a node.
    Incomplete = 3,
    /// Interrupted: walk was interrupted by user (Ctrl+C).
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "RW000",
            Self::GeneralError => "RW001",
            Self::Incomplete => "RW003",
            Self::Interrupted => "RW130",
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "RW001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: err.to_string(),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
