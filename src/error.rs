use thiserror::Error;

/// Errors reported by the `Result`-returning queue operations.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Error)]
pub enum QueueError {
    /// The queue held no elements at the moment it was checked.
    #[error("queue is empty")]
    EmptyQueue,
}
