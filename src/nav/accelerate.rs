//! Concurrency accelerator.
//!
//! The walking thread keeps deciding recursion order; the callback runs on
//! a fixed pool of worker threads fed through a bounded job queue. Every
//! job carries its own reply channel and the walker blocks on it, so skip
//! decisions still apply in depth-first order while callback execution
//! overlaps with other jobs already in flight.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, NavError};
use crate::nav::item::TraverseItem;
use crate::nav::options::Callback;
use crate::signal::CancelToken;

/// Smallest worker pool accepted.
pub const MIN_WORKERS: usize = 1;

/// Largest worker pool accepted.
pub const MAX_WORKERS: usize = 64;

/// Default worker pool size.
pub const DEFAULT_WORKERS: usize = 4;

/// Default job queue capacity.
pub const DEFAULT_JOB_QUEUE_SIZE: usize = 64;

/// Accelerator settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccelerationOptions {
    /// Run the callback on the worker pool
    pub enabled: bool,
    /// Number of worker threads
    pub workers: usize,
    /// Capacity of the job queue
    pub job_queue_size: usize,
}

impl Default for AccelerationOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            workers: DEFAULT_WORKERS,
            job_queue_size: DEFAULT_JOB_QUEUE_SIZE,
        }
    }
}

impl AccelerationOptions {
    /// Check the pool and queue sizes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_WORKERS..=MAX_WORKERS).contains(&self.workers) {
            return Err(ConfigError::InvalidWorkerCount {
                requested: self.workers,
                min: MIN_WORKERS,
                max: MAX_WORKERS,
            });
        }
        if self.job_queue_size == 0 {
            return Err(ConfigError::InvalidJobQueueSize(self.job_queue_size));
        }
        Ok(())
    }
}

/// Result of one accelerated callback, published on the output stream.
#[derive(Debug, Clone)]
pub struct JobOutput {
    /// The node the callback ran for
    pub item: Arc<TraverseItem>,
    /// What the callback returned
    pub error: Option<NavError>,
}

struct Job {
    item: Arc<TraverseItem>,
    callback: Callback,
    reply: Sender<Result<(), NavError>>,
}

/// Fixed worker pool executing callbacks.
pub(crate) struct Accelerator {
    jobs: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl Accelerator {
    /// Validate `options` and start the workers.
    pub(crate) fn start(
        options: &AccelerationOptions,
        cancel: CancelToken,
        output: Option<Sender<JobOutput>>,
    ) -> Result<Self, ConfigError> {
        options.validate()?;

        let (sender, receiver) = bounded::<Job>(options.job_queue_size);
        let mut workers = Vec::with_capacity(options.workers);
        for id in 0..options.workers {
            let receiver = receiver.clone();
            let cancel = cancel.clone();
            let output = output.clone();
            let handle = thread::Builder::new()
                .name(format!("rustwalk-worker-{id}"))
                .spawn(move || worker_loop(&receiver, &cancel, output.as_ref()))
                .map_err(|e| ConfigError::WorkerSpawn(e.to_string()))?;
            workers.push(handle);
        }
        log::debug!(
            "accelerator started: {} workers, queue size {}",
            options.workers,
            options.job_queue_size
        );

        Ok(Self {
            jobs: Some(sender),
            workers,
        })
    }

    /// Run `callback` for `item` on the pool and wait for its result.
    pub(crate) fn invoke(&self, callback: &Callback, item: &Arc<TraverseItem>) -> Result<(), NavError> {
        let Some(jobs) = &self.jobs else {
            return Err(NavError::Cancelled);
        };

        let (reply, result) = bounded(1);
        let job = Job {
            item: Arc::clone(item),
            callback: Arc::clone(callback),
            reply,
        };
        jobs.send(job)
            .map_err(|_| NavError::callback("accelerator job queue closed"))?;
        result
            .recv()
            .unwrap_or_else(|_| Err(NavError::callback("accelerator worker exited")))
    }

    /// Close the job queue and wait for the workers to drain.
    pub(crate) fn shutdown(&mut self) {
        // Dropping the only sender disconnects the queue exactly once.
        if self.jobs.take().is_none() {
            return;
        }
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                log::warn!("accelerator worker panicked");
            }
        }
        log::debug!("accelerator stopped");
    }
}

impl Drop for Accelerator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for Accelerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Accelerator")
            .field("open", &self.jobs.is_some())
            .field("workers", &self.workers.len())
            .finish()
    }
}

fn worker_loop(jobs: &Receiver<Job>, cancel: &CancelToken, output: Option<&Sender<JobOutput>>) {
    for job in jobs.iter() {
        let result = if cancel.is_cancelled() {
            Err(NavError::Cancelled)
        } else {
            (job.callback)(job.item.as_ref())
        };

        if let Some(output) = output {
            let published = JobOutput {
                item: Arc::clone(&job.item),
                error: result.as_ref().err().cloned(),
            };
            if output.send(published).is_err() {
                log::trace!("job output receiver dropped");
            }
        }
        // The walker may already have unwound; a closed reply is fine.
        let _ = job.reply.send(result);
    }
}
