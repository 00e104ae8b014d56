//! Dispatch worker.
//!
//! Pulls dispatch jobs from the NATS work queue and runs each referenced
//! delivery through the [`Dispatcher`].

use std::time::Duration;

use hookwire_core::Dispatcher;
use hookwire_nats::queue::JobOutcome;
use tokio_util::sync::CancellationToken;

use crate::Result;
use crate::service::{DispatchConfig, NatsDispatchQueue};

/// Tracing target for dispatch worker operations.
const TRACING_TARGET: &str = "hookwire_server::worker::dispatch";

/// Pause after a failed fetch before polling again.
const ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Dispatch worker.
///
/// Consumes the `HOOKWIRE_DISPATCH` stream. A job whose dispatch run fails
/// is retried through the queue's in-job retry policy; handler failures are
/// recorded on the delivery and never fail the job.
pub struct DispatchWorker {
    dispatcher: Dispatcher,
    queue: NatsDispatchQueue,
    config: DispatchConfig,
}

impl DispatchWorker {
    /// Create a new dispatch worker.
    pub fn new(dispatcher: Dispatcher, queue: NatsDispatchQueue, config: DispatchConfig) -> Self {
        Self {
            dispatcher,
            queue,
            config,
        }
    }

    /// Run the dispatch worker until cancelled.
    pub async fn run(&self, cancel: CancellationToken) -> Result<()> {
        tracing::info!(
            target: TRACING_TARGET,
            handlers = self.dispatcher.registry().len(),
            "Starting dispatch worker"
        );

        let result = self.run_inner(cancel).await;

        match &result {
            Ok(()) => {
                tracing::info!(
                    target: TRACING_TARGET,
                    "Dispatch worker stopped"
                );
            }
            Err(err) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %err,
                    "Dispatch worker failed"
                );
            }
        }

        result
    }

    async fn run_inner(&self, cancel: CancellationToken) -> Result<()> {
        let queue = self.queue.job_queue();
        let consumer = queue
            .consumer(self.config.ack_wait(), self.config.max_deliver)
            .await?;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!(
                        target: TRACING_TARGET,
                        "Dispatch worker shutdown requested"
                    );
                    break;
                }
                result = queue.fetch_next(&consumer) => {
                    match result {
                        Ok(Some(msg)) => {
                            // Runs outside the race: a started dispatch settles its message.
                            let processed = queue
                                .process(msg, |job| async move {
                                    self.dispatcher
                                        .dispatch_by_id(job.payload.delivery_id)
                                        .await
                                        .map(|_| ())
                                })
                                .await;

                            match processed {
                                Ok(outcome) => log_outcome(outcome),
                                Err(err) => {
                                    tracing::error!(
                                        target: TRACING_TARGET,
                                        error = %err,
                                        "Failed to settle dispatch job"
                                    );
                                }
                            }
                        }
                        Ok(None) => {
                            tokio::select! {
                                _ = cancel.cancelled() => {}
                                _ = tokio::time::sleep(self.config.poll_interval()) => {}
                            }
                        }
                        Err(err) => {
                            tracing::error!(
                                target: TRACING_TARGET,
                                error = %err,
                                "Error receiving dispatch job"
                            );
                            tokio::time::sleep(ERROR_BACKOFF).await;
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

fn log_outcome(outcome: JobOutcome) {
    match outcome {
        JobOutcome::Completed | JobOutcome::Deferred => {
            tracing::trace!(target: TRACING_TARGET, outcome = ?outcome, "Dispatch job handled");
        }
        JobOutcome::Retrying { retry_count } => {
            tracing::warn!(
                target: TRACING_TARGET,
                retry_count,
                "Dispatch run failed, job rescheduled"
            );
        }
        JobOutcome::Exhausted { retry_count } => {
            tracing::error!(
                target: TRACING_TARGET,
                retry_count,
                "Dispatch run failed, retries exhausted"
            );
        }
        JobOutcome::Discarded => {
            tracing::error!(target: TRACING_TARGET, "Undecodable dispatch job discarded");
        }
    }
}
