use std::fmt::Debug;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use super::config::TableConfig;
use crate::framework::{DataGetter, Feed, FetchState, Store, SystemError};
use crate::model::{
    ExpansionKind, ParamsPatch, RequestId, RowId, Rows, TableDataParams, TableState, UiOnlyState,
};

/// The state composer of one table instance.
///
/// `TableStateProvider` is responsible for:
/// - **Ownership**: It creates the parameter store and the UI-only store and is the
///   only writer of both
/// - **Wiring**: It attaches the data getter to the parameter feed exactly once
/// - **Combining**: A task merges parameters, fetch state and UI-only state into one
///   [`TableState`] whenever any of them changes
///
/// # Example
///
/// ```ignore
/// let table = TableStateProvider::new(getter, TableConfig::default());
/// let mut states = table.subscribe();
///
/// table.set_search_phrase("milk");
/// table.refresh();
/// let state = states.wait_for(|s| !s.loading()).await;
///
/// table.shutdown().await?;
/// ```
pub struct TableStateProvider<D, E> {
    params: Store<TableDataParams>,
    ui: Store<UiOnlyState>,
    state: Feed<TableState<D, E>>,
    stop: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl<D, E> TableStateProvider<D, E>
where
    D: Rows + Clone + Send + Sync + 'static,
    E: Clone + Debug + Send + Sync + 'static,
{
    /// Creates the stores, attaches `getter` and starts the combine task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new<G>(getter: G, config: TableConfig) -> Self
    where
        G: DataGetter<Data = D, Error = E>,
    {
        let initial = config.initial_params();
        info!(
            page = initial.page,
            page_size = initial.page_size,
            request_id = %initial.request_id,
            "Table started"
        );

        let params = Store::new(initial.clone());
        let ui = Store::new(UiOnlyState::default());
        let fetch = getter.get(params.subscribe());

        let (sender, state) = Feed::channel(TableState {
            params: initial,
            fetch: FetchState::pending(),
            ui: UiOnlyState::default(),
        });
        let (stop, stopped) = oneshot::channel();
        let combine = Combine {
            params: params.clone(),
            reset_empty_page: config.reset_empty_page,
        };
        let handle = tokio::spawn(combine.run(
            params.subscribe(),
            fetch,
            ui.subscribe(),
            sender,
            stopped,
        ));

        Self {
            params,
            ui,
            state,
            stop,
            handle,
        }
    }

    // =========================================================================
    // Parameter operations (never fetch by themselves)
    // =========================================================================

    #[instrument(skip(self))]
    pub fn set_page(&self, page: usize) -> bool {
        self.merge(ParamsPatch::page(page))
    }

    #[instrument(skip(self))]
    pub fn set_page_size(&self, page_size: usize) -> bool {
        self.merge(ParamsPatch::page_size(page_size))
    }

    #[instrument(skip(self))]
    pub fn set_search_phrase(&self, phrase: &str) -> bool {
        self.merge(ParamsPatch::search_phrase(phrase))
    }

    /// Issues a new request id, which is what makes the pipeline fetch again.
    #[instrument(skip(self))]
    pub fn refresh(&self) -> RequestId {
        let request_id = RequestId::new();
        self.merge(ParamsPatch {
            request_id: Some(request_id),
            ..ParamsPatch::default()
        });
        info!(%request_id, "Refresh");
        request_id
    }

    /// Shallow-merges `patch` into the parameters. Returns `false` for a no-op.
    ///
    /// A request id in `patch` is ignored: only [`refresh`](Self::refresh) issues one.
    pub fn apply(&self, patch: ParamsPatch) -> bool {
        if patch.request_id.is_some() {
            warn!("Ignoring request id in params patch, use refresh()");
        }
        self.merge(ParamsPatch {
            request_id: None,
            ..patch
        })
    }

    /// Replaces the parameters through `mutate`. Returns `false` for a no-op.
    ///
    /// The request id is kept as it was.
    pub fn update_params(&self, mutate: impl FnOnce(&mut TableDataParams)) -> bool {
        self.params.update(|params| {
            let request_id = params.request_id;
            mutate(params);
            params.request_id = request_id;
            params.page = params.page.max(1);
            params.page_size = params.page_size.max(1);
        })
    }

    fn merge(&self, patch: ParamsPatch) -> bool {
        let changed = self.params.update(|params| patch.apply(params));
        if changed {
            debug!(params = ?self.params.get(), "Params updated");
        }
        changed
    }

    // =========================================================================
    // UI-only operations
    // =========================================================================

    #[instrument(skip(self))]
    pub fn toggle_expanded_row(&self, row: RowId, kind: ExpansionKind) {
        self.ui.update(|ui| ui.toggle_expanded(row, kind));
    }

    #[instrument(skip(self))]
    pub fn toggle_row_selection(&self, row: RowId) {
        self.ui.update(|ui| ui.toggle_selected(row));
    }

    #[instrument(skip(self))]
    pub fn clear_selection(&self) -> bool {
        self.ui.update(UiOnlyState::clear_selection)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn params(&self) -> TableDataParams {
        self.params.get()
    }

    pub fn ui_state(&self) -> UiOnlyState {
        self.ui.get()
    }

    /// Latest composed snapshot.
    pub fn state(&self) -> TableState<D, E> {
        self.state.get()
    }

    /// A reader of composed snapshots, starting at the latest one.
    pub fn subscribe(&self) -> Feed<TableState<D, E>> {
        self.state.clone()
    }

    /// Stops the combine task, which tears down the whole getter composition.
    ///
    /// # Returns
    ///
    /// - `Ok(())` if the combine task stopped cleanly
    /// - `Err(SystemError::TaskFailed)` if it panicked
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down table...");

        // The task may already be gone; nothing to signal then.
        let _ = self.stop.send(());
        drop(self.state);

        if let Err(e) = self.handle.await {
            error!("Combine task failed: {:?}", e);
            return Err(SystemError::TaskFailed(e.to_string()));
        }

        info!("Table shutdown complete.");
        Ok(())
    }
}

/// The task-side half of the composer.
struct Combine {
    params: Store<TableDataParams>,
    reset_empty_page: bool,
}

impl Combine {
    fn is_empty_later_page<D: Rows, E>(&self, state: &TableState<D, E>) -> bool {
        self.reset_empty_page
            && !state.fetch.loading
            && state.params.page != 1
            && state.data().is_some_and(|data| data.row_count() == 0)
    }

    async fn run<D, E>(
        self,
        mut params: Feed<TableDataParams>,
        mut fetch: Feed<FetchState<D, E>>,
        mut ui: Feed<UiOnlyState>,
        sender: watch::Sender<TableState<D, E>>,
        mut stopped: oneshot::Receiver<()>,
    ) where
        D: Rows + Clone + Send + Sync + 'static,
        E: Clone + Send + Sync + 'static,
    {
        let mut current = TableState {
            params: params.latest(),
            fetch: fetch.latest(),
            ui: ui.latest(),
        };
        // The empty-page check only runs on passes woken by the getter, so a page the
        // user just picked is never judged by a result produced for an older page.
        let mut fetch_pass = true;

        loop {
            let reset = fetch_pass && self.is_empty_later_page(&current);
            if sender.send(current.clone()).is_err() {
                break;
            }
            if reset {
                info!(page = current.params.page, "Empty page, going back to page 1");
                self.params.update(|p| ParamsPatch::page(1).apply(p));
            }

            tokio::select! {
                changed = params.changed() => {
                    let Some(next) = changed else { break };
                    current.params = next;
                    fetch_pass = false;
                }
                changed = fetch.changed() => {
                    let Some(next) = changed else { break };
                    current.fetch = next;
                    if params.has_changed() {
                        current.params = params.latest();
                    }
                    fetch_pass = true;
                }
                changed = ui.changed() => {
                    let Some(next) = changed else { break };
                    current.ui = next;
                    fetch_pass = false;
                }
                _ = &mut stopped => break,
            }
        }

        info!("Combine task stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::MockFetch;
    use crate::getters::BaseFetcher;
    use std::time::Duration;

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    type Table = TableStateProvider<Vec<u32>, String>;

    fn table(mock: &MockFetch<Vec<u32>, String>, config: TableConfig) -> Table {
        TableStateProvider::new(BaseFetcher::new(mock.clone()), config)
    }

    #[tokio::test(start_paused = true)]
    async fn combines_params_fetch_and_ui_state() {
        let mock = MockFetch::new();
        mock.otherwise_return(Ok(vec![1, 2, 3]));
        let table = table(&mock, TableConfig::default());
        let mut states = table.subscribe();

        let state = states.wait_for(|s| !s.loading()).await.unwrap();
        assert_eq!(state.data(), Some(&vec![1, 2, 3]));
        assert_eq!((state.page(), state.page_size()), (1, 15));

        table.toggle_row_selection(RowId::from(2u64));
        let state = states.changed().await.unwrap();
        assert!(state.selected_rows().contains(&RowId::from("2")));
        assert_eq!(state.data(), Some(&vec![1, 2, 3]));
    }

    #[tokio::test(start_paused = true)]
    async fn setters_do_not_fetch_and_ignore_unchanged_values() {
        let mock = MockFetch::new();
        mock.otherwise_return(Ok(vec![1]));
        let table = table(&mock, TableConfig::default());
        let mut states = table.subscribe();
        states.wait_for(|s| !s.loading()).await.unwrap();

        assert!(table.set_search_phrase("milk"));
        assert!(!table.set_search_phrase("milk"));
        assert!(!table.set_page(1));
        assert!(table.set_page_size(30));
        settle().await;

        let state = states.latest();
        assert_eq!(state.search_phrase(), "milk");
        assert_eq!(state.page_size(), 30);
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_issues_a_fresh_request_id() {
        let mock = MockFetch::new();
        mock.otherwise_return(Ok(vec![1]));
        let table = table(&mock, TableConfig::default());
        let first = table.params().request_id;

        let second = table.refresh();
        assert_ne!(first, second);
        assert_eq!(table.params().request_id, second);
        settle().await;

        let requests = mock.requests();
        assert_eq!(requests.last().map(|p| p.request_id), Some(second));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_later_page_resets_to_first_page() {
        let mock = MockFetch::new();
        mock.otherwise_return(Ok(vec![]));
        let config = TableConfig {
            page: 3,
            ..TableConfig::default()
        };
        let table = table(&mock, config);
        let mut states = table.subscribe();

        let state = states.wait_for(|s| !s.loading() && s.page() == 1).await.unwrap();
        assert_eq!(state.data(), Some(&vec![]));
        assert_eq!(table.params().page, 1);
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_page_is_kept_when_reset_is_disabled() {
        let mock = MockFetch::new();
        mock.otherwise_return(Ok(vec![]));
        let config = TableConfig {
            page: 3,
            reset_empty_page: false,
            ..TableConfig::default()
        };
        let table = table(&mock, config);
        let mut states = table.subscribe();

        states.wait_for(|s| !s.loading()).await.unwrap();
        settle().await;
        assert_eq!(table.params().page, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn later_page_is_judged_by_its_own_result() {
        let mock = MockFetch::new();
        mock.expect_fetch().return_ok(vec![]);
        mock.expect_fetch().return_ok(vec![7]);
        let table = table(&mock, TableConfig::default());
        let mut states = table.subscribe();
        states.wait_for(|s| !s.loading()).await.unwrap();

        table.set_page(3);
        settle().await;
        assert_eq!(table.params().page, 3);

        table.refresh();
        let state = states.wait_for(|s| s.data() == Some(&vec![7])).await.unwrap();
        assert_eq!(state.page(), 3);
        let pages: Vec<usize> = mock.requests().iter().map(|p| p.page).collect();
        assert_eq!(pages, vec![1, 3]);
        mock.verify();
    }

    #[tokio::test(start_paused = true)]
    async fn request_id_only_changes_through_refresh() {
        let mock = MockFetch::new();
        mock.otherwise_return(Ok(vec![1]));
        let table = table(&mock, TableConfig::default());
        let request_id = table.params().request_id;

        assert!(!table.apply(ParamsPatch::refresh()));
        assert!(table.apply(ParamsPatch {
            page: Some(2),
            request_id: Some(RequestId::new()),
            ..ParamsPatch::default()
        }));
        assert!(table.update_params(|p| {
            p.page_size = 40;
            p.request_id = RequestId::new();
        }));
        settle().await;

        let params = table.params();
        assert_eq!((params.page, params.page_size), (2, 40));
        assert_eq!(params.request_id, request_id);
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn ui_toggles_and_clear_selection() {
        let mock = MockFetch::new();
        mock.otherwise_return(Ok(vec![1]));
        let table = table(&mock, TableConfig::default());

        table.toggle_expanded_row(RowId::from("a"), ExpansionKind::from("details"));
        table.toggle_row_selection(RowId::from("a"));
        table.toggle_row_selection(RowId::from("b"));
        assert_eq!(
            table.ui_state().expansion(&RowId::from("a")).map(ExpansionKind::as_str),
            Some("details")
        );
        assert_eq!(table.ui_state().selected_rows.len(), 2);

        assert!(table.clear_selection());
        assert!(!table.clear_selection());
        settle().await;
        assert!(table.state().selected_rows().is_empty());
        assert_eq!(table.state().expanded_rows().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_in_flight_requests() {
        let mock = MockFetch::new();
        let responder = mock.expect_fetch().deferred();
        let table = table(&mock, TableConfig::default());
        settle().await;
        assert!(!responder.is_cancelled());

        table.shutdown().await.unwrap();
        settle().await;
        assert!(responder.is_cancelled());
    }
}
