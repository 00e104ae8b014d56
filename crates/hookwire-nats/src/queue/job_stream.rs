//! Stream configuration for JetStream work queues.

use std::time::Duration;

/// Marker trait for work queue streams.
///
/// Defines the JetStream stream a [`JobQueue`] publishes to and consumes from.
///
/// [`JobQueue`]: super::JobQueue
pub trait JobStream: Clone + Send + Sync + 'static {
    /// Stream name used in NATS JetStream.
    const NAME: &'static str;

    /// Subject jobs are published on.
    const SUBJECT: &'static str;

    /// Maximum age for messages in this stream.
    /// Returns `None` for streams where messages should not expire.
    const MAX_AGE: Option<Duration>;

    /// Durable consumer name shared by every worker.
    const CONSUMER_NAME: &'static str;
}

/// Stream for delivery dispatch jobs.
///
/// Messages expire after 7 days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DispatchStream;

impl JobStream for DispatchStream {
    const CONSUMER_NAME: &'static str = "dispatch-worker";
    const MAX_AGE: Option<Duration> = Some(Duration::from_secs(7 * 24 * 60 * 60));
    const NAME: &'static str = "HOOKWIRE_DISPATCH";
    const SUBJECT: &'static str = "hookwire.dispatch";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_stream() {
        assert_eq!(DispatchStream::NAME, "HOOKWIRE_DISPATCH");
        assert_eq!(DispatchStream::SUBJECT, "hookwire.dispatch");
        assert_eq!(DispatchStream::CONSUMER_NAME, "dispatch-worker");
        assert_eq!(
            DispatchStream::MAX_AGE,
            Some(Duration::from_secs(7 * 24 * 60 * 60))
        );
    }
}
