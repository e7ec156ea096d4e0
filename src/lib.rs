/// the mutex-guarded queue
pub mod queue;
pub use queue::SynchronizedQueue;

/// the queue interface
pub mod fifo;
pub use fifo::FifoQueue;

/// the errors
pub mod error;
pub use error::QueueError;

/// optional structured logging
pub mod trace;

/// Version of this crate, as published.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
