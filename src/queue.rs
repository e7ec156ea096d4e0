use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::trace::{debug, trace};
use crate::{FifoQueue, QueueError};

/// Unbounded FIFO queue guarded by a single mutex.
///
/// Every operation takes the lock for its whole duration, so operations on one
/// queue are totally ordered across threads. Nothing ever waits for an element:
/// [`pop`](Self::pop) on an empty queue returns `None` immediately.
///
/// Share it between threads by reference (scoped threads) or through an `Arc`.
pub struct SynchronizedQueue<T> {
    items: Mutex<VecDeque<T>>,
}

impl<T> SynchronizedQueue<T> {
    /// Create an empty queue.
    ///
    /// # Examples
    /// ```
    /// use simple_queue::SynchronizedQueue;
    ///
    /// let queue = SynchronizedQueue::<u32>::new();
    /// assert!(queue.is_empty());
    /// ```
    pub fn new() -> Self {
        SynchronizedQueue {
            items: Mutex::new(VecDeque::new()),
        }
    }

    /// Take the queue lock.
    ///
    /// No operation leaves the deque half-mutated while holding the guard, so a
    /// lock poisoned by a panicking caller still protects consistent contents.
    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Discard every queued element, leaving the queue empty.
    ///
    /// The discarded elements are dropped after the lock is released, so an
    /// element's destructor may use this queue.
    ///
    /// # Examples
    /// ```
    /// use simple_queue::SynchronizedQueue;
    ///
    /// let queue = SynchronizedQueue::new();
    /// queue.push("foo");
    /// queue.push("foo");
    /// queue.clear();
    /// assert_eq!(queue.len(), 0);
    /// assert_eq!(queue.pop(), None);
    /// ```
    pub fn clear(&self) {
        let stale = std::mem::take(&mut *self.lock());
        debug!(dropped = stale.len(), "cleared queue");
        drop(stale);
    }

    /// Whether the queue currently holds no elements.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Number of elements currently queued.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Same as [`len`](Self::len).
    pub fn size(&self) -> usize {
        self.len()
    }

    /// Append `value` at the tail of the queue.
    ///
    /// The queue has no capacity bound, so this always succeeds and grows the
    /// length by exactly one.
    ///
    /// # Arguments
    /// * `value` - Element to enqueue. The queue takes ownership until it is popped.
    ///
    /// # Examples
    /// ```
    /// use simple_queue::SynchronizedQueue;
    ///
    /// let queue = SynchronizedQueue::new();
    /// queue.push(1);
    /// queue.push(2);
    /// assert_eq!(queue.len(), 2);
    /// ```
    pub fn push(&self, value: T) {
        let mut items = self.lock();
        items.push_back(value);
        trace!(len = items.len(), "push");
    }

    /// Same as [`push`](Self::push).
    pub fn enq(&self, value: T) {
        self.push(value)
    }

    /// Remove and return the oldest element.
    ///
    /// # Returns
    /// `Some(head)` when the queue has elements, or `None` when it is empty. An empty
    /// queue is left untouched and the call returns without waiting.
    ///
    /// # Examples
    /// ```
    /// use simple_queue::SynchronizedQueue;
    ///
    /// let queue = SynchronizedQueue::new();
    /// queue.push("foo");
    /// queue.push("bar");
    /// assert_eq!(queue.pop(), Some("foo"));
    /// assert_eq!(queue.pop(), Some("bar"));
    /// assert_eq!(queue.pop(), None);
    /// ```
    pub fn pop(&self) -> Option<T> {
        let mut items = self.lock();
        let head = items.pop_front();
        trace!(hit = head.is_some(), len = items.len(), "pop");
        head
    }

    /// Same as [`pop`](Self::pop).
    pub fn deq(&self) -> Option<T> {
        self.pop()
    }

    /// Same as [`pop`](Self::pop).
    pub fn shift(&self) -> Option<T> {
        self.pop()
    }

    /// Remove and return the oldest element, reporting an empty queue as an error.
    ///
    /// # Errors
    /// Returns `QueueError::EmptyQueue` when there is nothing to pop.
    ///
    /// # Examples
    /// ```
    /// use simple_queue::{QueueError, SynchronizedQueue};
    ///
    /// let queue = SynchronizedQueue::<u8>::new();
    /// assert_eq!(queue.try_pop(), Err(QueueError::EmptyQueue));
    /// ```
    pub fn try_pop(&self) -> Result<T, QueueError> {
        self.pop().ok_or(QueueError::EmptyQueue)
    }

    /// Number of consumers blocked waiting for an element.
    ///
    /// Always zero: this queue never blocks, so nobody ever waits on it.
    pub fn waiting_consumer_count(&self) -> usize {
        0
    }

    /// Consume the queue and return whatever is still queued, head first.
    pub fn into_inner(self) -> VecDeque<T> {
        self.items.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for SynchronizedQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for SynchronizedQueue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        SynchronizedQueue {
            items: Mutex::new(iter.into_iter().collect()),
        }
    }
}

impl<T> From<Vec<T>> for SynchronizedQueue<T> {
    fn from(values: Vec<T>) -> Self {
        SynchronizedQueue {
            items: Mutex::new(VecDeque::from(values)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for SynchronizedQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SynchronizedQueue")
            .field("items", &*self.lock())
            .finish()
    }
}

impl<T> FifoQueue<T> for SynchronizedQueue<T> {
    fn push(&self, value: T) {
        SynchronizedQueue::push(self, value)
    }

    fn pop(&self) -> Option<T> {
        SynchronizedQueue::pop(self)
    }

    fn len(&self) -> usize {
        SynchronizedQueue::len(self)
    }

    fn is_empty(&self) -> bool {
        SynchronizedQueue::is_empty(self)
    }

    fn clear(&self) {
        SynchronizedQueue::clear(self)
    }

    fn waiting_consumer_count(&self) -> usize {
        SynchronizedQueue::waiting_consumer_count(self)
    }
}
