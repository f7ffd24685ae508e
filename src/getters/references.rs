//! # Reference Resolver
//!
//! Joins the main fetch with named auxiliary sources ("references"), such as a user
//! directory needed to show the author of each row.
//!
//! Every reference starts as [`Reference::Pending`], so the resolver runs and produces a
//! partial result before any reference has emitted. The output is recomputed whenever
//! the main result *or* any single reference changes (join-on-latest). A new request id
//! drops every reference subscription and subscribes again from scratch. A failed main
//! fetch is passed through without calling the resolver.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::stream::{BoxStream, SelectAll, Stream, StreamExt};
use tokio::sync::watch;
use tracing::{debug, trace};

use crate::framework::{DataGetter, Feed, FetchState, Store};
use crate::model::TableDataParams;

// =============================================================================
// 1. REFERENCE VALUES
// =============================================================================

/// Latest value of one reference, or the marker that it has not arrived yet.
#[derive(Debug, Clone, PartialEq)]
pub enum Reference<V> {
    Pending,
    Ready(V),
}

impl<V> Reference<V> {
    pub fn ready(&self) -> Option<&V> {
        match self {
            Reference::Ready(value) => Some(value),
            Reference::Pending => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Reference::Pending)
    }
}

/// Name → latest value of every reference of a resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferencesMap<V> {
    entries: BTreeMap<String, Reference<V>>,
}

impl<V> ReferencesMap<V> {
    fn pending<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            entries: names
                .into_iter()
                .map(|name| (name.to_string(), Reference::Pending))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Reference<V>> {
        self.entries.get(name)
    }

    /// Latest value of `name`, if it has arrived.
    pub fn value(&self, name: &str) -> Option<&V> {
        self.entries.get(name).and_then(Reference::ready)
    }

    /// Unknown names read as pending.
    pub fn is_pending(&self, name: &str) -> bool {
        self.value(name).is_none()
    }

    /// `true` once every reference has emitted at least once.
    pub fn is_complete(&self) -> bool {
        self.entries.values().all(|reference| !reference.is_pending())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Reference<V>)> {
        self.entries.iter().map(|(name, reference)| (name.as_str(), reference))
    }

    fn set(&mut self, name: &str, value: V) {
        self.entries.insert(name.to_string(), Reference::Ready(value));
    }
}

// =============================================================================
// 2. REFERENCE SOURCES
// =============================================================================

/// Something that emits values over time and can be subscribed to again.
pub trait ReferenceSource<V>: Send + Sync + 'static {
    /// A fresh subscription. Called again after every refresh.
    fn subscribe(&self) -> BoxStream<'static, V>;
}

impl<V> ReferenceSource<V> for Store<V>
where
    V: Clone + PartialEq + Send + Sync + 'static,
{
    fn subscribe(&self) -> BoxStream<'static, V> {
        Store::subscribe(self).into_stream()
    }
}

/// [`ReferenceSource`] backed by a closure creating a new stream per subscription.
pub struct SourceFn<F> {
    subscribe: F,
}

pub fn source_fn<V, S, F>(subscribe: F) -> SourceFn<F>
where
    F: Fn() -> S + Send + Sync + 'static,
    S: Stream<Item = V> + Send + 'static,
{
    SourceFn { subscribe }
}

impl<V, S, F> ReferenceSource<V> for SourceFn<F>
where
    F: Fn() -> S + Send + Sync + 'static,
    S: Stream<Item = V> + Send + 'static,
{
    fn subscribe(&self) -> BoxStream<'static, V> {
        (self.subscribe)().boxed()
    }
}

/// Named set of reference sources handed to a [`RefResolver`].
pub struct ReferenceSet<V> {
    sources: Vec<(String, Arc<dyn ReferenceSource<V>>)>,
}

impl<V> Default for ReferenceSet<V> {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
        }
    }
}

impl<V> ReferenceSet<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, source: impl ReferenceSource<V>) -> Self {
        self.sources.push((name.into(), Arc::new(source)));
        self
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

// =============================================================================
// 3. THE RESOLVER
// =============================================================================

type ResolveFn<D, V, R> = dyn Fn(&D, &ReferencesMap<V>) -> R + Send + Sync;

pub struct RefResolver<G: DataGetter, V, R> {
    inner: G,
    sources: Arc<Vec<(String, Arc<dyn ReferenceSource<V>>)>>,
    resolve: Arc<ResolveFn<G::Data, V, R>>,
}

impl<G, V, R> RefResolver<G, V, R>
where
    G: DataGetter,
    V: Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
{
    pub fn new(
        inner: G,
        references: ReferenceSet<V>,
        resolve: impl Fn(&G::Data, &ReferencesMap<V>) -> R + Send + Sync + 'static,
    ) -> Self {
        Self {
            inner,
            sources: Arc::new(references.sources),
            resolve: Arc::new(resolve),
        }
    }
}

impl<G, V, R> DataGetter for RefResolver<G, V, R>
where
    G: DataGetter,
    V: Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
{
    type Data = R;
    type Error = G::Error;

    fn get(&self, params: Feed<TableDataParams>) -> Feed<FetchState<R, G::Error>> {
        let main = self.inner.get(params.clone());
        let (sender, feed) = Feed::channel(FetchState::pending());
        let join = Join {
            sources: self.sources.clone(),
            resolve: self.resolve.clone(),
        };
        tokio::spawn(join.run(main, params, sender));
        feed
    }
}

/// The task-side half of a resolver composition.
struct Join<D, V, R> {
    sources: Arc<Vec<(String, Arc<dyn ReferenceSource<V>>)>>,
    resolve: Arc<ResolveFn<D, V, R>>,
}

impl<D, V, R> Join<D, V, R>
where
    D: Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
{
    fn resubscribe(&self) -> (ReferencesMap<V>, SelectAll<BoxStream<'static, (usize, V)>>) {
        let references = ReferencesMap::pending(self.sources.iter().map(|(name, _)| name.as_str()));
        let streams = self
            .sources
            .iter()
            .enumerate()
            .map(|(index, (_, source))| {
                source
                    .subscribe()
                    .map(move |value| (index, value))
                    .boxed()
            });
        (references, futures::stream::select_all(streams))
    }

    fn resolve_state<E: Clone>(
        &self,
        main: &FetchState<D, E>,
        references: &ReferencesMap<V>,
    ) -> FetchState<R, E> {
        FetchState {
            loading: main.loading,
            result: match &main.result {
                None => None,
                Some(Err(error)) => Some(Err(error.clone())),
                Some(Ok(data)) => Some(Ok((self.resolve)(data, references))),
            },
        }
    }

    async fn run<E: Clone + Send + Sync + 'static>(
        self,
        mut main: Feed<FetchState<D, E>>,
        mut params: Feed<TableDataParams>,
        sender: watch::Sender<FetchState<R, E>>,
    ) {
        let mut request_id = params.latest().request_id;
        let (mut references, mut updates) = self.resubscribe();
        let mut state = main.latest();
        debug!(%request_id, references = self.sources.len(), "Resolving references");
        if sender.send(self.resolve_state(&state, &references)).is_err() {
            return;
        }

        loop {
            tokio::select! {
                changed = params.changed() => {
                    let Some(next) = changed else { break };
                    if next.request_id == request_id {
                        continue;
                    }
                    request_id = next.request_id;
                    debug!(%request_id, "Resubscribing references");
                    (references, updates) = self.resubscribe();
                }
                changed = main.changed() => {
                    let Some(next) = changed else { break };
                    state = next;
                }
                Some((index, value)) = updates.next() => {
                    let name = &self.sources[index].0;
                    trace!(reference = %name, "Reference updated");
                    references.set(name, value);
                }
                _ = sender.closed() => break,
            }

            if sender.send(self.resolve_state(&state, &references)).is_err() {
                break;
            }
        }

        debug!(%request_id, "Reference resolver stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::MockFetch;
    use crate::getters::BaseFetcher;
    use crate::model::ParamsPatch;
    use futures::channel::mpsc;
    use std::sync::Mutex;
    use std::time::Duration;

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    /// Source whose subscriptions are driven by the test.
    #[derive(Clone, Default)]
    struct ManualSource {
        senders: Arc<Mutex<Vec<mpsc::UnboundedSender<String>>>>,
    }

    impl ManualSource {
        fn emit(&self, value: &str) {
            let senders = self.senders.lock().unwrap();
            let latest = senders.last().expect("no subscription yet");
            latest.unbounded_send(value.to_string()).unwrap();
        }

        fn subscriptions(&self) -> usize {
            self.senders.lock().unwrap().len()
        }
    }

    impl ReferenceSource<String> for ManualSource {
        fn subscribe(&self) -> BoxStream<'static, String> {
            let (sender, receiver) = mpsc::unbounded();
            self.senders.lock().unwrap().push(sender);
            receiver.boxed()
        }
    }

    fn describe(rows: &Vec<u32>, refs: &ReferencesMap<String>) -> Vec<String> {
        rows.iter()
            .map(|row| {
                let owner = refs.value("owners").map(String::as_str).unwrap_or("?");
                let tag = refs.value("tags").map(String::as_str).unwrap_or("?");
                format!("{row}:{owner}:{tag}")
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn resolves_with_pending_references_before_any_emission() {
        let mock = MockFetch::<Vec<u32>, String>::new();
        mock.otherwise_return(Ok(vec![1, 2]));
        let owners = ManualSource::default();
        let refs = ReferenceSet::new().with("owners", owners.clone());
        let params = Store::new(TableDataParams::default());

        let resolver = RefResolver::new(
            BaseFetcher::new(mock),
            refs,
            |rows: &Vec<u32>, refs: &ReferencesMap<String>| {
                assert!(refs.is_pending("owners"));
                assert!(!refs.is_complete());
                let names: Vec<&str> = refs.iter().map(|(name, _)| name).collect();
                assert_eq!(names, vec!["owners"]);
                rows.len()
            },
        );
        let mut feed = resolver.get(params.subscribe());

        let state = feed.wait_for(|s| !s.loading).await.unwrap();
        assert_eq!(state.data(), Some(&2));
        assert_eq!(owners.subscriptions(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn single_reference_update_recomputes_only_its_fields() {
        let mock = MockFetch::<Vec<u32>, String>::new();
        mock.otherwise_return(Ok(vec![1]));
        let owners = ManualSource::default();
        let tags = ManualSource::default();
        let refs = ReferenceSet::new()
            .with("owners", owners.clone())
            .with("tags", tags.clone());
        let params = Store::new(TableDataParams::default());
        let mut feed =
            RefResolver::new(BaseFetcher::new(mock), refs, describe).get(params.subscribe());

        let state = feed.wait_for(|s| !s.loading).await.unwrap();
        assert_eq!(state.data(), Some(&vec!["1:?:?".to_string()]));

        owners.emit("ada");
        let state = feed.changed().await.unwrap();
        assert_eq!(state.data(), Some(&vec!["1:ada:?".to_string()]));

        tags.emit("urgent");
        let state = feed.changed().await.unwrap();
        assert_eq!(state.data(), Some(&vec!["1:ada:urgent".to_string()]));
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_resubscribes_every_reference() {
        let mock = MockFetch::<Vec<u32>, String>::new();
        mock.otherwise_return(Ok(vec![1]));
        let owners = ManualSource::default();
        let refs = ReferenceSet::new().with("owners", owners.clone());
        let params = Store::new(TableDataParams::default());
        let mut feed =
            RefResolver::new(BaseFetcher::new(mock), refs, describe).get(params.subscribe());

        feed.wait_for(|s| !s.loading).await.unwrap();
        owners.emit("ada");
        feed.wait_for(|s| s.data() == Some(&vec!["1:ada:?".to_string()]))
            .await
            .unwrap();

        params.update(|p| ParamsPatch::page(2).apply(p));
        settle().await;
        assert_eq!(owners.subscriptions(), 1);

        params.update(|p| ParamsPatch::refresh().apply(p));
        settle().await;
        assert_eq!(owners.subscriptions(), 2);
        assert_eq!(feed.latest().data(), Some(&vec!["1:?:?".to_string()]));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_main_fetch_skips_resolver() {
        let mock = MockFetch::<Vec<u32>, String>::new();
        mock.otherwise_return(Err("offline".into()));
        let refs = ReferenceSet::new().with("owners", ManualSource::default());
        let params = Store::new(TableDataParams::default());
        let resolver = RefResolver::new(
            BaseFetcher::new(mock),
            refs,
            |_: &Vec<u32>, _: &ReferencesMap<String>| -> usize {
                panic!("resolver must not run on failures")
            },
        );
        let mut feed = resolver.get(params.subscribe());

        let state = feed.wait_for(|s| !s.loading).await.unwrap();
        assert_eq!(state.error().map(String::as_str), Some("offline"));
    }
}
