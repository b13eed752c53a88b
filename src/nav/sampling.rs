//! Sampling: bounding how many children of a directory are considered.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::nav::filter::NodeFilter;
use crate::nav::item::{DirEntry, TraverseItem};

/// How a sample is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SampleType {
    /// Keep the first (or last) N entries
    #[default]
    Slice,
    /// Keep the first (or last) N entries matching the node filter
    Filter,
    /// Keep entries chosen by a caller supplied iteration
    Custom,
}

/// Per-kind quotas. An absent quota leaves that kind unsampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SampleQuota {
    /// Number of files to keep
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<usize>,
    /// Number of folders to keep
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folders: Option<usize>,
}

/// Declarative sampling settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingOptions {
    /// Sampling mode
    pub sample_type: SampleType,
    /// Take the sample from the end of the listing
    pub in_reverse: bool,
    /// Quotas
    pub no_of: SampleQuota,
}

/// Running tally while a sample is collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleProgress {
    /// Files admitted so far
    pub files: usize,
    /// Folders admitted so far
    pub folders: usize,
    /// The quotas being filled
    pub quota: SampleQuota,
}

impl SampleProgress {
    /// Whether the file quota is met (an absent quota counts as met).
    #[must_use]
    pub fn files_full(&self) -> bool {
        self.quota.files.map_or(true, |n| self.files >= n)
    }

    /// Whether the folder quota is met (an absent quota counts as met).
    #[must_use]
    pub fn folders_full(&self) -> bool {
        self.quota.folders.map_or(true, |n| self.folders >= n)
    }

    fn is_full(&self, is_dir: bool) -> bool {
        if is_dir {
            self.folders_full()
        } else {
            self.files_full()
        }
    }

    fn admit(&mut self, is_dir: bool) {
        if is_dir {
            self.folders += 1;
        } else {
            self.files += 1;
        }
    }
}

/// Decides whether a previewed child is admitted.
pub type SampleEach = Arc<dyn Fn(&TraverseItem) -> bool + Send + Sync>;
/// Decides whether sampling should keep going.
pub type SampleWhile = Arc<dyn Fn(&SampleProgress) -> bool + Send + Sync>;

/// Caller supplied iteration used by [`SampleType::Custom`].
#[derive(Clone)]
pub struct SamplingIteration {
    /// Admission predicate
    pub each: SampleEach,
    /// Continuation predicate; `None` stops once every quota is met
    pub while_: Option<SampleWhile>,
}

impl std::fmt::Debug for SamplingIteration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SamplingIteration")
            .field("while_", &self.while_.as_ref().map(|_| "<predicate>"))
            .finish_non_exhaustive()
    }
}

fn default_while(progress: &SampleProgress) -> bool {
    !(progress.files_full() && progress.folders_full())
}

enum Strategy {
    Slice,
    Iterate {
        each: SampleEach,
        while_: SampleWhile,
    },
}

/// Sampling controller built once per session.
pub(crate) struct Sampler {
    options: SamplingOptions,
    strategy: Strategy,
}

impl Sampler {
    /// Build the controller, resolving the admission predicate.
    pub(crate) fn new(
        options: SamplingOptions,
        node_filter: Option<Arc<dyn NodeFilter>>,
        iteration: Option<&SamplingIteration>,
    ) -> Result<Self, ConfigError> {
        let strategy = match options.sample_type {
            SampleType::Slice => Strategy::Slice,
            SampleType::Filter => {
                let filter = node_filter.ok_or_else(|| {
                    ConfigError::InvalidFilterDef(
                        "filter sampling requires a node filter".into(),
                    )
                })?;
                Strategy::Iterate {
                    each: Arc::new(move |item: &TraverseItem| filter.is_match(item)),
                    while_: Arc::new(default_while),
                }
            }
            SampleType::Custom => {
                let iteration = iteration.ok_or_else(|| {
                    ConfigError::InvalidFilterDef(
                        "custom sampling requires a sampling iteration".into(),
                    )
                })?;
                Strategy::Iterate {
                    each: Arc::clone(&iteration.each),
                    while_: iteration
                        .while_
                        .clone()
                        .unwrap_or_else(|| Arc::new(default_while)),
                }
            }
        };
        Ok(Self { options, strategy })
    }

    /// Whether children must be previewed (extended ahead of the walk).
    pub(crate) fn previews(&self) -> bool {
        matches!(self.strategy, Strategy::Iterate { .. })
    }

    /// Reduce `entries` to the sample, preserving listing order.
    ///
    /// `build` turns an entry into an item; `preview` additionally extends
    /// it so predicates can inspect scope and depth. Entries of a kind
    /// without a quota pass through untouched.
    pub(crate) fn sample(
        &self,
        entries: Vec<DirEntry>,
        build: &mut dyn FnMut(DirEntry) -> TraverseItem,
        preview: &mut dyn FnMut(DirEntry) -> TraverseItem,
    ) -> Vec<TraverseItem> {
        let quota = self.options.no_of;
        let sampled = |e: &DirEntry| {
            if e.is_dir {
                quota.folders.is_some()
            } else {
                quota.files.is_some()
            }
        };

        let len = entries.len();
        let mut slots: Vec<Option<TraverseItem>> = Vec::with_capacity(len);
        let mut pending: Vec<(usize, DirEntry)> = Vec::new();
        for (i, entry) in entries.into_iter().enumerate() {
            if sampled(&entry) {
                slots.push(None);
                pending.push((i, entry));
            } else {
                slots.push(Some(build(entry)));
            }
        }

        if self.options.in_reverse {
            pending.reverse();
        }

        let mut progress = SampleProgress {
            files: 0,
            folders: 0,
            quota,
        };
        match &self.strategy {
            Strategy::Slice => {
                for (i, entry) in pending {
                    if progress.is_full(entry.is_dir) {
                        continue;
                    }
                    progress.admit(entry.is_dir);
                    slots[i] = Some(build(entry));
                }
            }
            Strategy::Iterate { each, while_ } => {
                for (i, entry) in pending {
                    if !while_(&progress) {
                        break;
                    }
                    let is_dir = entry.is_dir;
                    if progress.is_full(is_dir) {
                        continue;
                    }
                    let mut item = preview(entry);
                    if each(&item) {
                        progress.admit(is_dir);
                        item.admitted = true;
                        slots[i] = Some(item);
                    } else {
                        log::trace!("sampled out: {}", item.path.display());
                    }
                }
            }
        }

        slots.into_iter().flatten().collect()
    }
}

impl std::fmt::Debug for Sampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sampler")
            .field("options", &self.options)
            .field("previews", &self.previews())
            .finish()
    }
}
