/// The operations every FIFO queue in this crate offers.
///
/// The shape mirrors a blocking queue so a [`SynchronizedQueue`](crate::SynchronizedQueue)
/// can stand in where one is expected. Implementations never block: `pop` on an empty
/// queue returns `None` straight away.
pub trait FifoQueue<T> {
    /// Append `value` at the tail.
    fn push(&self, value: T);

    /// Remove and return the head, or `None` when the queue is empty.
    fn pop(&self) -> Option<T>;

    /// Number of elements currently queued.
    fn len(&self) -> usize;

    /// Whether the queue currently holds no elements.
    fn is_empty(&self) -> bool;

    /// Drop every queued element.
    fn clear(&self);

    /// Number of consumers blocked waiting for an element.
    fn waiting_consumer_count(&self) -> usize;
}
