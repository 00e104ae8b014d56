use std::time::Duration;

use hookwire_core::store::DispatchQueue;
use hookwire_core::types::DispatchJob;
use hookwire_nats::queue::{DispatchStream, Job, JobQueue};

use crate::service::DispatchConfig;

/// JetStream work queue carrying dispatch jobs.
pub type DispatchJobQueue = JobQueue<DispatchJob, DispatchStream>;

/// [`DispatchQueue`] backed by the NATS dispatch stream.
#[derive(Debug, Clone)]
pub struct NatsDispatchQueue {
    queue: DispatchJobQueue,
    max_retries: u32,
    retry_delay: Duration,
}

impl NatsDispatchQueue {
    /// Wraps a job queue, taking the retry policy from `config`.
    pub fn new(queue: DispatchJobQueue, config: &DispatchConfig) -> Self {
        Self {
            queue,
            max_retries: config.max_retries,
            retry_delay: config.retry_delay(),
        }
    }

    /// Returns the underlying job queue.
    #[inline]
    pub fn job_queue(&self) -> &DispatchJobQueue {
        &self.queue
    }
}

#[async_trait::async_trait]
impl DispatchQueue for NatsDispatchQueue {
    async fn enqueue(&self, job: DispatchJob, delay: Option<Duration>) -> hookwire_core::Result<()> {
        let mut job = Job::new(job)
            .with_max_retries(self.max_retries)
            .with_retry_delay(self.retry_delay);

        if let Some(delay) = delay {
            job = job.delayed_by(delay);
        }

        self.queue
            .submit(&job)
            .await
            .map_err(hookwire_core::Error::queue)
    }
}
