//! Background workers.

mod dispatch;

pub use dispatch::DispatchWorker;
