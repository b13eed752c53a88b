//! Per-run counters and the traversal result.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::NavError;

/// Name of a counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// Files for which the callback was invoked
    Files,
    /// Folders for which the callback was invoked
    Folders,
}

/// Counters keyed by metric name.
///
/// Only the walking thread mutates these, so no synchronisation is needed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metrics {
    counts: BTreeMap<MetricKind, u64>,
}

impl Metrics {
    /// Increment a counter by one.
    pub fn tick(&mut self, kind: MetricKind) {
        *self.counts.entry(kind).or_insert(0) += 1;
    }

    /// Current value of a counter.
    #[must_use]
    pub fn count(&self, kind: MetricKind) -> u64 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Files invoked.
    #[must_use]
    pub fn files(&self) -> u64 {
        self.count(MetricKind::Files)
    }

    /// Folders invoked.
    #[must_use]
    pub fn folders(&self) -> u64 {
        self.count(MetricKind::Folders)
    }

    /// Add every counter of `other` into `self`.
    pub fn merge(&mut self, other: &Metrics) {
        for (kind, count) in &other.counts {
            *self.counts.entry(*kind).or_insert(0) += count;
        }
    }

    /// Counts accumulated since `before` was snapshotted.
    #[must_use]
    pub fn since(&self, before: &Metrics) -> Metrics {
        let counts = self
            .counts
            .iter()
            .map(|(kind, count)| (*kind, count.saturating_sub(before.count(*kind))))
            .filter(|(_, count)| *count > 0)
            .collect();
        Metrics { counts }
    }
}

/// Outcome of a walk: the first unresolved error and the metrics gathered,
/// which are kept even when the walk failed.
#[derive(Debug, Default)]
pub struct TraverseResult {
    /// First error that was not consumed by the walk
    pub error: Option<NavError>,
    /// Counters for this walk
    pub metrics: Metrics,
}

impl TraverseResult {
    /// Build a result from a raw traversal outcome. Skip and terminate
    /// signals are consumed here and never reported as failures.
    #[must_use]
    pub fn from_outcome(outcome: Result<(), NavError>, metrics: Metrics) -> Self {
        let error = match outcome {
            Err(e) if !e.is_control() => Some(e),
            _ => None,
        };
        Self { error, metrics }
    }

    /// Whether the walk ended without an unresolved error.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Combine two partial results: the first error wins, metrics add up.
    #[must_use]
    pub fn merge(mut self, other: TraverseResult) -> Self {
        if self.error.is_none() {
            self.error = other.error;
        }
        self.metrics.merge(&other.metrics);
        self
    }
}
