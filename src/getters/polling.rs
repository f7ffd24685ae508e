//! # Poller
//!
//! Re-runs the wrapped getter on a fixed delay. The delay is measured from the end of
//! the previous response, not on a wall-clock tick: while a request is loading no poll
//! is scheduled, so a slow source is never asked twice at once.

use std::sync::Arc;
use std::time::Duration;

use futures::future::OptionFuture;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::framework::{DataGetter, Feed, FetchState};
use crate::model::TableDataParams;

pub struct Poller<G> {
    inner: Arc<G>,
    interval: Duration,
}

impl<G: DataGetter> Poller<G> {
    pub fn new(inner: G, interval: Duration) -> Self {
        Self {
            inner: Arc::new(inner),
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl<G: DataGetter> DataGetter for Poller<G> {
    type Data = G::Data;
    type Error = G::Error;

    fn get(&self, params: Feed<TableDataParams>) -> Feed<FetchState<G::Data, G::Error>> {
        let (sender, feed) = Feed::channel(FetchState::pending());
        tokio::spawn(run(self.inner.clone(), self.interval, params, sender));
        feed
    }
}

async fn run<G: DataGetter>(
    inner: Arc<G>,
    interval: Duration,
    params: Feed<TableDataParams>,
    sender: watch::Sender<FetchState<G::Data, G::Error>>,
) {
    info!(interval_ms = interval.as_millis() as u64, "Poller started");
    let mut upstream = inner.get(params.clone());
    let mut previous = None;
    let mut polls: u64 = 0;

    loop {
        let mut state = upstream.latest();
        // A fresh composition starts without a result: keep showing the last one.
        match &state.result {
            None => state.result = previous.clone(),
            Some(result) => previous = Some(result.clone()),
        }
        let next_poll = (!state.loading).then(|| tokio::time::sleep(interval));
        if sender.send(state).is_err() {
            break;
        }

        tokio::select! {
            changed = upstream.changed() => {
                if changed.is_none() {
                    break;
                }
            }
            Some(()) = OptionFuture::from(next_poll) => {
                polls += 1;
                debug!(polls, "Polling");
                upstream = inner.get(params.clone());
            }
            _ = sender.closed() => break,
        }
    }

    info!(polls, "Poller stopped");
}
