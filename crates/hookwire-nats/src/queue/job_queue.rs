//! Job queue management and worker processing.

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::time::Duration;

use async_nats::jetstream::consumer::PullConsumer;
use async_nats::jetstream::consumer::pull::Config as ConsumerConfig;
use async_nats::jetstream::{self, AckKind, Message, stream};
use futures::StreamExt;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{Job, JobStream};
use crate::{Error, Result, TRACING_TARGET_QUEUE};

/// What happened to the message handled by [`JobQueue::process`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// The handler succeeded and the message was acked.
    Completed,
    /// The job is not due yet and was handed back to the stream.
    Deferred,
    /// The handler failed; the job was republished for another attempt.
    Retrying { retry_count: u32 },
    /// The handler failed and no retries remain; the message was acked.
    Exhausted { retry_count: u32 },
    /// The message could not be decoded and was terminated.
    Discarded,
}

/// Work queue over a JetStream stream with work-queue retention.
pub struct JobQueue<T, S> {
    jetstream: jetstream::Context,
    _marker: PhantomData<fn() -> (T, S)>,
}

impl<T, S> JobQueue<T, S>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
    S: JobStream,
{
    /// Gets the stream for `S`, creating it when missing.
    #[tracing::instrument(skip(jetstream), target = TRACING_TARGET_QUEUE, fields(stream = S::NAME))]
    pub async fn new(jetstream: &jetstream::Context) -> Result<Self> {
        if jetstream.get_stream(S::NAME).await.is_err() {
            tracing::debug!(
                target: TRACING_TARGET_QUEUE,
                stream = S::NAME,
                "Creating job stream"
            );

            let stream_config = stream::Config {
                name: S::NAME.to_string(),
                subjects: vec![S::SUBJECT.to_string()],
                retention: stream::RetentionPolicy::WorkQueue,
                max_age: S::MAX_AGE.unwrap_or_default(),
                ..Default::default()
            };

            jetstream
                .create_stream(stream_config)
                .await
                .map_err(|e| Error::stream_error(S::NAME, e.to_string()))?;
        }

        Ok(Self {
            jetstream: jetstream.clone(),
            _marker: PhantomData,
        })
    }

    /// Publishes a job and waits for the stream to store it.
    #[tracing::instrument(skip(self, job), target = TRACING_TARGET_QUEUE, fields(job_id = %job.id))]
    pub async fn submit(&self, job: &Job<T>) -> Result<()> {
        let payload = serde_json::to_vec(job)?;

        self.jetstream
            .publish(S::SUBJECT, payload.into())
            .await
            .map_err(|e| Error::delivery_failed(S::SUBJECT, e.to_string()))?
            .await
            .map_err(|e| Error::operation("job_submit", e.to_string()))?;

        tracing::debug!(
            target: TRACING_TARGET_QUEUE,
            job_id = %job.id,
            retry_count = job.retry_count,
            scheduled_for = ?job.scheduled_for,
            "Submitted job to queue"
        );
        Ok(())
    }

    /// Gets or creates the durable pull consumer shared by all workers.
    ///
    /// `ack_wait` bounds how long a worker may hold a message; `max_deliver`
    /// bounds redeliveries of a message whose worker died before acking.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_QUEUE)]
    pub async fn consumer(&self, ack_wait: Duration, max_deliver: i64) -> Result<PullConsumer> {
        let stream = self
            .jetstream
            .get_stream(S::NAME)
            .await
            .map_err(|e| Error::stream_error(S::NAME, e.to_string()))?;

        let consumer_config = ConsumerConfig {
            durable_name: Some(S::CONSUMER_NAME.to_string()),
            description: Some(format!("{} worker", S::NAME)),
            ack_wait,
            max_deliver,
            ..Default::default()
        };

        stream
            .get_or_create_consumer(S::CONSUMER_NAME, consumer_config)
            .await
            .map_err(|e| Error::consumer_error(S::CONSUMER_NAME, e.to_string()))
    }

    /// Waits for the next message on `consumer`.
    ///
    /// Returns `None` when the fetch expired without a message. Dropping the
    /// future before it resolves leaves any pulled message unacked, so it is
    /// redelivered after `ack_wait`.
    pub async fn fetch_next(&self, consumer: &PullConsumer) -> Result<Option<Message>> {
        let mut messages = consumer
            .fetch()
            .max_messages(1)
            .messages()
            .await
            .map_err(|e| Error::operation("job_fetch", e.to_string()))?;

        match messages.next().await {
            Some(Ok(msg)) => Ok(Some(msg)),
            Some(Err(e)) => Err(Error::operation("job_fetch", e.to_string())),
            None => Ok(None),
        }
    }

    /// Runs `handler` on the job in `msg` and settles the message.
    ///
    /// The future acks, naks or terminates `msg` before resolving; callers
    /// drive it to completion.
    #[tracing::instrument(skip_all, target = TRACING_TARGET_QUEUE)]
    pub async fn process<F, Fut, E>(&self, msg: Message, handler: F) -> Result<JobOutcome>
    where
        T: Clone,
        F: FnOnce(Job<T>) -> Fut,
        Fut: Future<Output = std::result::Result<(), E>>,
        E: fmt::Display,
    {
        let job = match Intake::<T>::from_payload(&msg.payload) {
            Intake::Ready(job) => job,
            Intake::Deferred(remaining) => {
                msg.ack_with(AckKind::Nak(Some(remaining)))
                    .await
                    .map_err(|e| Error::operation("job_nak", e.to_string()))?;
                return Ok(JobOutcome::Deferred);
            }
            Intake::Undecodable(e) => {
                tracing::error!(
                    target: TRACING_TARGET_QUEUE,
                    error = %e,
                    "Failed to deserialize job, terminating message"
                );
                msg.ack_with(AckKind::Term)
                    .await
                    .map_err(|e| Error::operation("job_term", e.to_string()))?;
                return Ok(JobOutcome::Discarded);
            }
        };

        tracing::debug!(
            target: TRACING_TARGET_QUEUE,
            job_id = %job.id,
            retry_count = job.retry_count,
            "Processing job"
        );

        let outcome = match handler(job.clone()).await {
            Ok(()) => JobOutcome::Completed,
            Err(e) => {
                let (outcome, retry) = job.on_failure();
                tracing::warn!(
                    target: TRACING_TARGET_QUEUE,
                    outcome = ?outcome,
                    error = %e,
                    "Job failed"
                );

                // Republish first: a crash before the ack duplicates the job, never drops it.
                if let Some(retry) = retry {
                    self.submit(&retry).await?;
                }
                outcome
            }
        };

        msg.ack()
            .await
            .map_err(|e| Error::operation("job_ack", e.to_string()))?;

        Ok(outcome)
    }
}

/// What a fetched message holds, before its job runs.
#[derive(Debug)]
enum Intake<T> {
    /// The job is due.
    Ready(Job<T>),
    /// The job is scheduled this far in the future.
    Deferred(Duration),
    /// The payload is not a job.
    Undecodable(serde_json::Error),
}

impl<T: DeserializeOwned> Intake<T> {
    fn from_payload(payload: &[u8]) -> Self {
        match serde_json::from_slice::<Job<T>>(payload) {
            Ok(job) => match job.remaining_delay() {
                Some(remaining) => Self::Deferred(remaining),
                None => Self::Ready(job),
            },
            Err(e) => Self::Undecodable(e),
        }
    }
}

impl<T, S> Clone for JobQueue<T, S> {
    fn clone(&self) -> Self {
        Self {
            jetstream: self.jetstream.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T, S> fmt::Debug for JobQueue<T, S>
where
    S: JobStream,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobQueue")
            .field("stream", &S::NAME)
            .field("subject", &S::SUBJECT)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(job: &Job<u32>) -> anyhow::Result<Vec<u8>> {
        Ok(serde_json::to_vec(job)?)
    }

    #[test]
    fn due_job_is_ready() -> anyhow::Result<()> {
        let job = Job::new(7_u32);
        let payload = encode(&job)?;

        assert!(matches!(Intake::<u32>::from_payload(&payload), Intake::Ready(ready) if ready == job));
        Ok(())
    }

    #[test]
    fn scheduled_job_is_deferred_by_remaining_delay() -> anyhow::Result<()> {
        let job = Job::new(7_u32).delayed_by(Duration::from_secs(120));
        let payload = encode(&job)?;

        let Intake::Deferred(remaining) = Intake::<u32>::from_payload(&payload) else {
            anyhow::bail!("scheduled job was not deferred");
        };
        assert!(remaining > Duration::from_secs(110));
        assert!(remaining <= Duration::from_secs(120));
        Ok(())
    }

    #[test]
    fn garbage_payload_is_undecodable() {
        assert!(matches!(
            Intake::<u32>::from_payload(b"not a job"),
            Intake::Undecodable(_)
        ));
        assert!(matches!(
            Intake::<u32>::from_payload(br#"{"payload":1}"#),
            Intake::Undecodable(_)
        ));
    }
}
