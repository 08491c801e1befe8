//! Bounded, coalescing fan-out channel
//!
//! Each subscriber gets its own bounded buffer. When the buffer is full
//! and a new, non-terminal snapshot arrives, the oldest non-terminal
//! entry is dropped to make room ("latest wins"); a terminal snapshot
//! (completed/failed/cancelled) is always enqueued and is never itself
//! evicted, so every subscriber is guaranteed to observe the final state
//! even if it fell behind.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tokio::sync::Notify;

struct Inner<T> {
    queue: Mutex<VecDeque<T>>,
    notify: Notify,
    capacity: usize,
    closed: AtomicBool,
}

/// Sending half. Cheap to clone; all clones share the same buffer.
pub struct CoalescingSender<T> {
    inner: std::sync::Arc<Inner<T>>,
}

pub struct CoalescingReceiver<T> {
    inner: std::sync::Arc<Inner<T>>,
}

pub fn coalescing_channel<T>(capacity: usize) -> (CoalescingSender<T>, CoalescingReceiver<T>) {
    let inner = std::sync::Arc::new(Inner {
        queue: Mutex::new(VecDeque::with_capacity(capacity)),
        notify: Notify::new(),
        capacity,
        closed: AtomicBool::new(false),
    });
    (
        CoalescingSender { inner: inner.clone() },
        CoalescingReceiver { inner },
    )
}

impl<T> Clone for CoalescingSender<T> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<T> CoalescingSender<T> {
    /// Pushes `item`, coalescing against the buffer's tail when full.
    /// `is_terminal` classifies both the incoming item and the current
    /// tail so a terminal entry never gets evicted or replaced.
    pub fn push(&self, item: T, is_terminal: impl Fn(&T) -> bool) {
        let mut queue = self.inner.queue.lock().unwrap();
        if queue.len() >= self.inner.capacity {
            let tail_is_terminal = queue.back().map(&is_terminal).unwrap_or(false);
            if !tail_is_terminal {
                queue.pop_back();
            }
        }
        queue.push_back(item);
        self.inner.notify.notify_one();
    }

    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }
}

impl<T> CoalescingReceiver<T> {
    pub async fn recv(&mut self) -> Option<T> {
        loop {
            {
                let mut queue = self.inner.queue.lock().unwrap();
                if let Some(item) = queue.pop_front() {
                    return Some(item);
                }
                if self.inner.closed.load(Ordering::SeqCst) {
                    return None;
                }
            }
            self.inner.notify.notified().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn coalesces_non_terminal_entries_under_pressure() {
        let (tx, mut rx) = coalescing_channel::<i32>(2);
        tx.push(1, |_| false);
        tx.push(2, |_| false);
        tx.push(3, |_| false); // should evict 2, not 1
        tx.close();

        assert_eq!(rx.recv().await, Some(1));
        assert_eq!(rx.recv().await, Some(3));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn never_evicts_a_terminal_entry() {
        let (tx, mut rx) = coalescing_channel::<(i32, bool)>(1);
        tx.push((1, true), |(_, terminal)| *terminal); // fills buffer with terminal entry
        tx.push((2, false), |(_, terminal)| *terminal); // must not evict (1, true)
        tx.close();

        assert_eq!(rx.recv().await, Some((1, true)));
    }
}
