//! Command-line interface definitions for rustwalk.
//!
//! The binary is a thin shell over the library: every flag maps onto a field
//! of [`OptionsStore`], applied on top of the loaded configuration.
//!
//! # Example
//!
//! ```bash
//! # Walk a tree, printing every node
//! rustwalk walk ~/Music
//!
//! # Only FLAC files, two per folder, saving state on Ctrl+C
//! rustwalk walk ~/Music --subscription files --glob '*.flac' --sample-files 2 --save walk.json
//!
//! # Pick up where the walk stopped
//! rustwalk resume walk.json --strategy spawn
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::nav::{
    CompoundFilterDef, CompoundFilterKind, FilterDef, FilterDefinitions, FilterKind, OptionsStore,
    ResumeStrategy, SampleQuota, SampleType, SamplingOptions, SortOrder, Subscription,
};

/// Resumable, filterable directory-tree walker.
#[derive(Debug, Parser)]
#[command(name = "rustwalk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Report errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Configuration file (TOML or JSON)
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Walk a directory tree
    Walk(WalkArgs),
    /// Continue a walk from a saved state file
    Resume(ResumeArgs),
}

/// Arguments for the walk subcommand.
#[derive(Debug, Args)]
pub struct WalkArgs {
    /// Root of the tree to walk
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,

    /// Which nodes are reported
    #[arg(short, long, value_enum)]
    pub subscription: Option<SubscriptionArg>,

    /// Report only nodes whose name matches this glob
    #[arg(long, value_name = "PATTERN", conflicts_with = "regex")]
    pub glob: Option<String>,

    /// Report only nodes whose name matches this regex
    #[arg(long, value_name = "PATTERN")]
    pub regex: Option<String>,

    /// Consider only the files of each folder matching this glob
    #[arg(long, value_name = "PATTERN")]
    pub files_glob: Option<String>,

    /// Visit at most N files per folder
    #[arg(long, value_name = "N")]
    pub sample_files: Option<usize>,

    /// Visit at most N sub-folders per folder
    #[arg(long, value_name = "N")]
    pub sample_folders: Option<usize>,

    /// Take samples from the end of each listing
    #[arg(long)]
    pub reverse: bool,

    /// Count only entries passing --glob/--regex towards the sample
    #[arg(long)]
    pub sample_by_filter: bool,

    /// Start reporting at the first node with this name
    #[arg(long, value_name = "NAME")]
    pub start: Option<String>,

    /// Stop the walk at the first reported node with this name
    #[arg(long, value_name = "NAME")]
    pub stop: Option<String>,

    /// Run the callback on N worker threads
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Write a resumable state file when the walk stops
    #[arg(long, value_name = "STATE_FILE")]
    pub save: Option<PathBuf>,

    /// Compare names case-sensitively when sorting
    #[arg(long)]
    pub case_sensitive: bool,

    /// List files before folders
    #[arg(long)]
    pub files_first: bool,
}

impl WalkArgs {
    /// Apply the flags on top of `store`.
    pub fn apply(&self, store: &mut OptionsStore) {
        if let Some(subscription) = self.subscription {
            store.subscription = subscription.into();
        }

        let node = match (&self.glob, &self.regex) {
            (Some(glob), _) => Some(FilterDef::new(FilterKind::Glob, glob.as_str())),
            (None, Some(regex)) => Some(FilterDef::new(FilterKind::Regex, regex.as_str())),
            (None, None) => None,
        };
        let children = self
            .files_glob
            .as_ref()
            .map(|glob| CompoundFilterDef::new(CompoundFilterKind::Glob, glob.as_str()));
        if node.is_some() || children.is_some() {
            let defs = store.filter_defs.get_or_insert_with(FilterDefinitions::default);
            if node.is_some() {
                defs.node = node;
            }
            if children.is_some() {
                defs.children = children;
            }
        }

        if self.sample_files.is_some() || self.sample_folders.is_some() {
            store.sampling = Some(SamplingOptions {
                sample_type: if self.sample_by_filter {
                    SampleType::Filter
                } else {
                    SampleType::Slice
                },
                in_reverse: self.reverse,
                no_of: SampleQuota {
                    files: self.sample_files,
                    folders: self.sample_folders,
                },
            });
        }

        if let Some(start) = &self.start {
            store.listen_defs.start_at = Some(FilterDef::new(FilterKind::Glob, start.as_str()));
        }
        if let Some(stop) = &self.stop {
            store.listen_defs.stop_at = Some(FilterDef::new(FilterKind::Glob, stop.as_str()));
        }

        if let Some(workers) = self.workers {
            store.acceleration.enabled = true;
            store.acceleration.workers = workers;
        }

        if self.case_sensitive {
            store.behaviours.sort.case_sensitive = true;
        }
        if self.files_first {
            store.behaviours.sort.order = SortOrder::FilesFirst;
        }
    }
}

/// Arguments for the resume subcommand.
#[derive(Debug, Args)]
pub struct ResumeArgs {
    /// State file written by an earlier walk
    #[arg(value_name = "STATE_FILE")]
    pub state: PathBuf,

    /// How to continue the walk
    #[arg(long, value_enum, default_value = "fastward")]
    pub strategy: StrategyArg,

    /// Write a resumable state file when the walk stops
    #[arg(long, value_name = "STATE_FILE")]
    pub save: Option<PathBuf>,
}

/// Subscription as a CLI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SubscriptionArg {
    /// Files and folders
    Any,
    /// Folders only
    Folders,
    /// Folders with their files
    FoldersWithFiles,
    /// Files only
    Files,
}

impl From<SubscriptionArg> for Subscription {
    fn from(arg: SubscriptionArg) -> Self {
        match arg {
            SubscriptionArg::Any => Self::Any,
            SubscriptionArg::Folders => Self::Folders,
            SubscriptionArg::FoldersWithFiles => Self::FoldersWithFiles,
            SubscriptionArg::Files => Self::Files,
        }
    }
}

/// Resume strategy as a CLI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Re-walk from the root, silent until the saved node
    Fastward,
    /// Rebuild the remaining frontier from the saved node
    Spawn,
}

impl From<StrategyArg> for ResumeStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Fastward => Self::Fastward,
            StrategyArg::Spawn => Self::Spawn,
        }
    }
}
