//! # Base Fetcher
//!
//! Lifts a single-request [`Fetch`] into the [`DataGetter`] contract.
//!
//! For every new request id the fetcher publishes a loading state (keeping the previous
//! result visible), starts the request, and publishes the outcome. A newer request id
//! drops the in-flight request, so at most one request result is ever live: its
//! completion can never overwrite a newer state. Page, page size and search phrase
//! changes alone do not fetch.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, OptionFuture};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::framework::{DataGetter, Feed, Fetch, FetchState};
use crate::model::{RequestId, TableDataParams};

type State<F> = FetchState<<F as Fetch>::Data, <F as Fetch>::Error>;

pub struct BaseFetcher<F> {
    fetch: Arc<F>,
}

impl<F: Fetch> BaseFetcher<F> {
    pub fn new(fetch: F) -> Self {
        Self {
            fetch: Arc::new(fetch),
        }
    }
}

impl<F: Fetch> DataGetter for BaseFetcher<F> {
    type Data = F::Data;
    type Error = F::Error;

    fn get(&self, params: Feed<TableDataParams>) -> Feed<State<F>> {
        let (sender, feed) = Feed::channel(FetchState::pending());
        tokio::spawn(run(self.fetch.clone(), params, sender));
        feed
    }
}

fn start<F: Fetch>(
    fetch: &Arc<F>,
    params: TableDataParams,
) -> BoxFuture<'static, Result<F::Data, F::Error>> {
    let fetch = fetch.clone();
    async move { fetch.fetch(params).await }.boxed()
}

async fn run<F: Fetch>(
    fetch: Arc<F>,
    mut params: Feed<TableDataParams>,
    sender: watch::Sender<State<F>>,
) {
    let current = params.latest();
    let mut request_id: RequestId = current.request_id;
    let mut state: State<F> = FetchState::pending();
    let mut in_flight = Some(start(&fetch, current));
    info!(%request_id, "Fetcher started");

    loop {
        tokio::select! {
            changed = params.changed() => {
                let Some(next) = changed else { break };
                if next.request_id == request_id {
                    continue;
                }
                if in_flight.is_some() {
                    debug!(superseded = %request_id, "Cancelling in-flight request");
                }
                request_id = next.request_id;
                debug!(%request_id, page = next.page, page_size = next.page_size, "Fetch");
                in_flight = Some(start(&fetch, next));
                state = state.reloading();
                if sender.send(state.clone()).is_err() {
                    break;
                }
            }
            Some(result) = OptionFuture::from(in_flight.as_mut()) => {
                in_flight = None;
                match &result {
                    Ok(_) => debug!(%request_id, "Fetch ok"),
                    Err(e) => warn!(%request_id, error = ?e, "Fetch failed"),
                }
                state = FetchState::settled(result);
                if sender.send(state.clone()).is_err() {
                    break;
                }
            }
            _ = sender.closed() => break,
        }
    }

    info!(%request_id, "Fetcher stopped");
}
