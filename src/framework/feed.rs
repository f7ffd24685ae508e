//! # Feeds
//!
//! A [`Feed`] is the read side of a [`Store`](super::Store) or of a composition task's
//! output. Feeds are cheap to clone and every clone observes the same upstream: cloning
//! never restarts the work that produces the values.
//!
//! Derived feeds ([`Feed::distinct_by`], [`Feed::map`]) run in their own task. That task
//! stops as soon as nobody reads the derived feed any more, releasing its upstream feed
//! in turn.

use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::watch;
use tracing::trace;

/// Cloneable, replaying reader of a single evolving value.
#[derive(Debug)]
pub struct Feed<T> {
    receiver: watch::Receiver<T>,
}

impl<T> Clone for Feed<T> {
    fn clone(&self) -> Self {
        Self {
            receiver: self.receiver.clone(),
        }
    }
}

impl<T> Feed<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(receiver: watch::Receiver<T>) -> Self {
        Self { receiver }
    }

    /// Opens a feed together with the sender that drives it.
    pub(crate) fn channel(initial: T) -> (watch::Sender<T>, Self) {
        let (sender, receiver) = watch::channel(initial);
        (sender, Self::new(receiver))
    }

    /// Current value, without marking it as seen.
    pub fn get(&self) -> T {
        self.receiver.borrow().clone()
    }

    /// Current value, marking it as seen.
    pub fn latest(&mut self) -> T {
        self.receiver.borrow_and_update().clone()
    }

    /// `true` when a value arrived that has not been seen through this handle yet.
    pub fn has_changed(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }

    /// Waits for the next unseen value. `None` once the producer is gone.
    pub async fn changed(&mut self) -> Option<T> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Waits until the current or a future value satisfies `predicate`.
    pub async fn wait_for(&mut self, predicate: impl FnMut(&T) -> bool) -> Option<T> {
        self.receiver
            .wait_for(predicate)
            .await
            .ok()
            .map(|value| T::clone(&value))
    }

    /// Forwards only values whose key differs from the previously forwarded one.
    pub fn distinct_by<K, F>(mut self, key: F) -> Feed<T>
    where
        K: PartialEq + Send + 'static,
        F: Fn(&T) -> K + Send + 'static,
    {
        let initial = self.latest();
        let mut last_key = key(&initial);
        let (sender, feed) = Feed::channel(initial);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = self.changed() => {
                        let Some(value) = changed else { break };
                        let next_key = key(&value);
                        if next_key == last_key {
                            continue;
                        }
                        last_key = next_key;
                        if sender.send(value).is_err() {
                            break;
                        }
                    }
                    _ = sender.closed() => break,
                }
            }
            trace!("distinct feed stopped");
        });

        feed
    }

    /// Projects every value through `project`.
    pub fn map<U, F>(mut self, project: F) -> Feed<U>
    where
        U: Clone + Send + Sync + 'static,
        F: Fn(&T) -> U + Send + 'static,
    {
        let (sender, feed) = Feed::channel(project(&self.latest()));

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = self.changed() => {
                        let Some(value) = changed else { break };
                        if sender.send(project(&value)).is_err() {
                            break;
                        }
                    }
                    _ = sender.closed() => break,
                }
            }
            trace!("mapped feed stopped");
        });

        feed
    }

    /// Turns the feed into a stream that yields the current value first, then every
    /// subsequent change.
    pub fn into_stream(self) -> BoxStream<'static, T> {
        stream::unfold((self, true), |(mut feed, first)| async move {
            let value = if first {
                feed.latest()
            } else {
                feed.changed().await?
            };
            Some((value, (feed, false)))
        })
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::Store;
    use std::time::Duration;

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn distinct_by_skips_values_with_equal_key() {
        let store = Store::new((1u32, "a"));
        let mut distinct = store.subscribe().distinct_by(|(key, _)| *key);

        store.set((1, "b"));
        settle().await;
        assert!(!distinct.has_changed());
        assert_eq!(distinct.get(), (1, "a"));

        store.set((2, "c"));
        assert_eq!(distinct.changed().await, Some((2, "c")));
    }

    #[tokio::test(start_paused = true)]
    async fn map_projects_current_and_future_values() {
        let store = Store::new(2u32);
        let mut doubled = store.subscribe().map(|n| n * 2);
        assert_eq!(doubled.latest(), 4);

        store.set(5);
        assert_eq!(doubled.changed().await, Some(10));
    }

    #[tokio::test(start_paused = true)]
    async fn derived_task_releases_upstream_when_dropped() {
        let store = Store::new(0u32);
        let derived = store.subscribe().map(|n| n + 1);
        assert_eq!(store.reader_count(), 1);

        drop(derived);
        settle().await;
        assert_eq!(store.reader_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stream_starts_with_current_value() {
        let store = Store::new("first".to_string());
        let mut stream = store.subscribe().into_stream();
        assert_eq!(stream.next().await.as_deref(), Some("first"));

        store.set("second".into());
        assert_eq!(stream.next().await.as_deref(), Some("second"));
    }
}
