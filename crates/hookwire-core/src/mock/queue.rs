//! Queue that records enqueued jobs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;

use crate::store::DispatchQueue;
use crate::types::DispatchJob;
use crate::{Error, Result};

/// Records every enqueued job instead of running it.
#[derive(Debug, Default)]
pub struct MemoryQueue {
    jobs: Mutex<Vec<(DispatchJob, Option<Duration>)>>,
    unavailable: AtomicBool,
}

impl MemoryQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following `enqueue` fail with a queue error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Returns the jobs enqueued so far, in order.
    pub async fn jobs(&self) -> Vec<DispatchJob> {
        self.jobs.lock().await.iter().map(|(job, _)| *job).collect()
    }

    /// Removes and returns the jobs enqueued so far.
    pub async fn drain(&self) -> Vec<DispatchJob> {
        self.jobs
            .lock()
            .await
            .drain(..)
            .map(|(job, _)| job)
            .collect()
    }
}

#[async_trait::async_trait]
impl DispatchQueue for MemoryQueue {
    async fn enqueue(&self, job: DispatchJob, delay: Option<Duration>) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Error::queue(std::io::Error::other("queue unavailable")));
        }

        self.jobs.lock().await.push((job, delay));
        Ok(())
    }
}
