//! Job envelope carried through a work queue.

use std::time::Duration;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::JobOutcome;

/// Default number of retries after the first failed attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 1;

/// Default delay before a failed job is attempted again.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(180);

/// Job for background processing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job<T> {
    pub id: Uuid,
    pub payload: T,
    pub max_retries: u32,
    pub retry_count: u32,
    pub retry_delay: Duration,
    pub created_at: Timestamp,
    pub scheduled_for: Option<Timestamp>,
}

impl<T> Job<T> {
    /// Create a new job
    pub fn new(payload: T) -> Self {
        Self {
            id: Uuid::now_v7(),
            payload,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_count: 0,
            retry_delay: DEFAULT_RETRY_DELAY,
            created_at: Timestamp::now(),
            scheduled_for: None,
        }
    }

    /// Set maximum retries
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the delay between a failure and the next attempt
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Schedule job for later execution
    pub fn scheduled_for(mut self, timestamp: Timestamp) -> Self {
        self.scheduled_for = Some(timestamp);
        self
    }

    /// Schedule job to run once `delay` has passed
    pub fn delayed_by(self, delay: Duration) -> Self {
        let timestamp = Timestamp::now()
            .checked_add(delay)
            .unwrap_or(Timestamp::MAX);
        self.scheduled_for(timestamp)
    }

    /// Check if job can be retried
    pub fn can_retry(&self) -> bool {
        self.retry_count < self.max_retries
    }

    /// Returns the job for its next attempt, delayed by `retry_delay`.
    pub fn next_attempt(mut self) -> Self {
        self.retry_count += 1;
        let retry_delay = self.retry_delay;
        self.delayed_by(retry_delay)
    }

    /// Decides what follows a failed attempt.
    ///
    /// Returns the attempt to republish while retries remain, `None` once
    /// they are exhausted.
    pub fn on_failure(self) -> (JobOutcome, Option<Self>) {
        if self.can_retry() {
            let retry = self.next_attempt();
            let outcome = JobOutcome::Retrying {
                retry_count: retry.retry_count,
            };
            (outcome, Some(retry))
        } else {
            let outcome = JobOutcome::Exhausted {
                retry_count: self.retry_count,
            };
            (outcome, None)
        }
    }

    /// Check if job is ready to execute (not scheduled for future)
    pub fn is_ready(&self) -> bool {
        self.remaining_delay().is_none()
    }

    /// Time left until the job is due, `None` once it is.
    pub fn remaining_delay(&self) -> Option<Duration> {
        let scheduled = self.scheduled_for?;
        let remaining = scheduled.duration_since(Timestamp::now());
        Duration::try_from(remaining)
            .ok()
            .filter(|remaining| !remaining.is_zero())
    }
}
