//! # Shared Replaying Store
//!
//! [`Store`] is the owned, mutable end of a broadcast: it holds the current value,
//! pushes every change to all live readers, and hands late readers the latest value
//! the moment they subscribe (replay-of-one).
//!
//! It sits on top of [`tokio::sync::watch`], so readers never see anything older than
//! the most recent value. Unchanged writes are dropped before they reach the channel,
//! which keeps downstream recomputation idempotent.

use std::sync::Arc;

use tokio::sync::watch;

use super::feed::Feed;

/// Owned broadcast container with replay-of-one semantics.
///
/// Cloning a `Store` clones the write handle, not the value: every clone writes to
/// the same channel.
pub struct Store<T> {
    sender: Arc<watch::Sender<T>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T> Store<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn new(initial: T) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Returns a reader that starts at the current value.
    pub fn subscribe(&self) -> Feed<T> {
        Feed::new(self.sender.subscribe())
    }

    /// Snapshot of the current value.
    pub fn get(&self) -> T {
        self.sender.borrow().clone()
    }

    /// Applies `mutate` to the current value and broadcasts the result.
    ///
    /// Returns `false` (and notifies nobody) when the mutation left the value unchanged.
    pub fn update(&self, mutate: impl FnOnce(&mut T)) -> bool {
        self.sender.send_if_modified(|value| {
            let before = value.clone();
            mutate(value);
            *value != before
        })
    }

    /// Replaces the whole value. Same no-op rule as [`Store::update`].
    pub fn set(&self, next: T) -> bool {
        self.sender.send_if_modified(|value| {
            if *value == next {
                false
            } else {
                *value = next;
                true
            }
        })
    }

    /// Number of readers currently attached.
    pub fn reader_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<T> std::fmt::Debug for Store<T>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("value", &*self.sender.borrow())
            .finish()
    }
}
