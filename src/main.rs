//! # Table Dataflow Demo
//!
//! An in-memory todo table in client-side mode:
//! 1. The whole todo list is "fetched" once per refresh.
//! 2. Owner names are joined in from a user directory that fills in later.
//! 3. Search and paging are applied locally, without refetching.
//! 4. The table polls its source every two seconds.

use std::collections::BTreeMap;
use std::time::Duration;

use table_dataflow::framework::{fetch_fn, FetchError, Store, SystemError, WithCount};
use table_dataflow::getters::{BaseFetcher, Comparator, DataGetterExt, ReferenceSet, ReferencesMap};
use table_dataflow::lifecycle::{setup_tracing, PollingConfig, TableConfig, TableStateProvider};
use table_dataflow::model::{RowId, TableDataParams, TableDataWithCount};
use tracing::{debug, info, Instrument};

type Users = BTreeMap<u32, String>;

#[derive(Debug, Clone)]
struct Todo {
    id: u32,
    user_id: u32,
    title: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
struct TodoRow {
    id: u32,
    title: String,
    owner: Option<String>,
}

fn todos() -> Vec<Todo> {
    [
        (1, 1, "buy milk"),
        (2, 2, "walk dog"),
        (3, 1, "water plants"),
        (4, 3, "feed dog"),
        (5, 2, "pay rent"),
        (6, 3, "book flights"),
        (7, 1, "call mom"),
    ]
    .into_iter()
    .map(|(id, user_id, title)| Todo { id, user_id, title })
    .collect()
}

fn resolve_owners(
    data: &TableDataWithCount<Todo>,
    refs: &ReferencesMap<Users>,
) -> TableDataWithCount<TodoRow> {
    if !refs.is_complete() {
        let pending: Vec<&str> = refs
            .iter()
            .filter(|(_, reference)| reference.is_pending())
            .map(|(name, _)| name)
            .collect();
        debug!(?pending, "Rendering todos before every reference arrived");
    }
    let users = refs.value("users");
    let rows = data
        .rows
        .iter()
        .map(|todo| TodoRow {
            id: todo.id,
            title: todo.title.to_string(),
            owner: users.and_then(|users| users.get(&todo.user_id).cloned()),
        })
        .collect();
    TableDataWithCount {
        rows,
        total_count: data.total_count,
    }
}

async fn show(label: &str, table: &TableStateProvider<TableDataWithCount<TodoRow>, FetchError>) {
    tokio::time::sleep(Duration::from_millis(50)).await;
    let state = table.state();
    let rows: Vec<String> = state
        .data()
        .map(|data| {
            data.rows
                .iter()
                .map(|row| {
                    let owner = row.owner.as_deref().unwrap_or("…");
                    format!("#{} {} ({owner})", row.id, row.title)
                })
                .collect()
        })
        .unwrap_or_default();
    info!(
        page = state.page(),
        search = state.search_phrase(),
        loading = state.loading(),
        total = state.data().map(|data| data.total_count),
        selected = state.selected_rows().len(),
        ?rows,
        "{label}"
    );
}

#[tokio::main]
async fn main() -> Result<(), SystemError> {
    setup_tracing();
    info!("Starting todo table demo");

    let users = Store::new(Users::new());
    let source = WithCount::new(fetch_fn(|params: TableDataParams| async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        info!(request_id = %params.request_id, "Serving todo list");
        Ok::<_, FetchError>(todos())
    }));
    let polling = PollingConfig { interval_ms: 2_000 };

    let getter = BaseFetcher::new(source)
        .resolve_references(ReferenceSet::new().with("users", users.clone()), resolve_owners)
        .paginate_locally(
            |row: &TodoRow, phrase: &str| row.title.contains(phrase),
            Some(Box::new(|a: &TodoRow, b: &TodoRow| a.title.cmp(&b.title)) as Comparator<TodoRow>),
        )
        .poll(polling.interval());

    let config = TableConfig {
        page_size: 3,
        ..TableConfig::default()
    };
    let table = TableStateProvider::new(getter, config);
    show("Initial load", &table).await;

    users.set(
        [(1, "Ada"), (2, "Grace"), (3, "Linus")]
            .into_iter()
            .map(|(id, name)| (id, name.to_string()))
            .collect(),
    );
    show("Owners resolved", &table).await;

    let span = tracing::info_span!("browsing");
    async {
        table.set_search_phrase("dog");
        show("Searched for dog", &table).await;

        table.set_search_phrase("");
        table.set_page(3);
        show("Page 3", &table).await;

        table.toggle_row_selection(RowId::from(7u64));
        show("Selected a row", &table).await;
    }
    .instrument(span)
    .await;

    table.refresh();
    show("Refreshed", &table).await;

    tokio::time::sleep(polling.interval()).await;
    show("After a poll", &table).await;

    table.shutdown().await?;
    info!("Demo completed successfully");
    Ok(())
}
