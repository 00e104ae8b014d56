//! Work queues for distributed job processing.

mod job;
mod job_queue;
mod job_stream;

pub use job::Job;
pub use job_queue::{JobOutcome, JobQueue};
pub use job_stream::{DispatchStream, JobStream};
