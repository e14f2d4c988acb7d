//! Background rebuilds triggered by course publishes.
//!
//! The content system reports publishes through a [`RebuildHandle`]; a
//! [`RebuildWorker`] running on tokio materializes each published course in
//! arrival order. Retry policy lives here, not in the builder: storage
//! failures are retried with exponential backoff, while a missing course or a
//! malformed tree fails immediately.

use std::sync::Arc;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use coursepath_core::{CourseKey, Error, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::PathCacheBuilder;

/// A course's content changed and its path cache is stale.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoursePublished {
    /// The published course.
    pub course_key: CourseKey,
}

/// Retry settings for rebuilds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: usize,
    /// Delay before the first retry, in milliseconds.
    pub initial_delay_ms: u64,
    /// Upper bound on the delay between retries, in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 1_000,
            max_delay_ms: 10_000,
        }
    }
}

impl RetryPolicy {
    /// Never retry.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Sets the number of retries.
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the initial delay between retries.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Sets the maximum delay between retries.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(self.initial_delay_ms))
            .with_max_delay(Duration::from_millis(self.max_delay_ms))
            .with_max_times(self.max_retries)
    }
}

/// Counts of what a worker did before it stopped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RebuildSummary {
    /// Courses materialized successfully.
    pub succeeded: usize,
    /// Courses that failed after all retries.
    pub failed: usize,
}

/// Sending side of the rebuild queue. Cheap to clone.
#[derive(Clone, Debug)]
pub struct RebuildHandle {
    tx: mpsc::Sender<CoursePublished>,
}

impl RebuildHandle {
    /// Queue a rebuild of `course`.
    ///
    /// Waits when the queue is full.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the worker has stopped.
    pub async fn publish(&self, course: CourseKey) -> Result<()> {
        self.tx
            .send(CoursePublished { course_key: course })
            .await
            .map_err(|e| Error::storage(format!("rebuild worker stopped: {e}")))
    }
}

/// Consumes publish events and materializes each course.
pub struct RebuildWorker {
    builder: Arc<PathCacheBuilder>,
    retry: RetryPolicy,
    rx: mpsc::Receiver<CoursePublished>,
}

impl RebuildWorker {
    /// Create a worker and its handle with a queue of `capacity` events.
    pub fn new(
        builder: Arc<PathCacheBuilder>,
        retry: RetryPolicy,
        capacity: usize,
    ) -> (RebuildHandle, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (RebuildHandle { tx }, Self { builder, retry, rx })
    }

    /// Create a worker and spawn it on the current tokio runtime.
    ///
    /// The task ends once every [`RebuildHandle`] is dropped and the queue is
    /// drained.
    pub fn spawn(
        builder: Arc<PathCacheBuilder>,
        retry: RetryPolicy,
        capacity: usize,
    ) -> (RebuildHandle, JoinHandle<RebuildSummary>) {
        let (handle, worker) = Self::new(builder, retry, capacity);
        (handle, tokio::spawn(worker.run()))
    }

    /// Process events until the queue closes.
    pub async fn run(mut self) -> RebuildSummary {
        let mut summary = RebuildSummary::default();
        while let Some(event) = self.rx.recv().await {
            match self.rebuild(&event.course_key).await {
                Ok(()) => summary.succeeded += 1,
                Err(e) => {
                    log::error!("Path cache rebuild for {} failed: {e}", event.course_key);
                    summary.failed += 1;
                }
            }
        }
        log::debug!(
            "Rebuild worker stopped: {} succeeded, {} failed",
            summary.succeeded,
            summary.failed
        );
        summary
    }

    /// Materialize one course, retrying transient failures.
    pub async fn rebuild(&self, course: &CourseKey) -> Result<()> {
        let builder = self.builder.clone();
        (|| async { builder.materialize(course).await })
            .retry(self.retry.backoff())
            .when(Error::is_retryable)
            .notify(|err, delay| {
                log::warn!("Rebuild of {course} failed ({err}), retrying in {delay:?}");
            })
            .await
            .map(|_| ())
    }
}
