#![cfg(feature = "http")]

use serde::Deserialize;
use table_dataflow::clients::{HttpFetch, QueryMapper};
use table_dataflow::framework::{Fetch, FetchError, WithCount};
use table_dataflow::getters::{BaseFetcher, DataGetterExt};
use table_dataflow::lifecycle::{HttpSettings, TableConfig, TableStateProvider};
use table_dataflow::model::{ParamsPatch, TableDataParams};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Todo {
    user_id: u32,
    id: u32,
    title: String,
    completed: bool,
}

fn todos_json() -> serde_json::Value {
    serde_json::json!([
        { "userId": 1, "id": 1, "title": "buy milk", "completed": false },
        { "userId": 1, "id": 2, "title": "walk dog", "completed": true }
    ])
}

fn fetcher(server: &MockServer, query: QueryMapper) -> HttpFetch<Vec<Todo>> {
    HttpFetch::new(&format!("{}/todos", server.uri()), query, &HttpSettings::default())
        .expect("Failed to build fetcher")
}

#[tokio::test]
async fn test_sends_search_and_pagination_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/todos"))
        .and(query_param("title_like", "dog"))
        .and(query_param("_page", "2"))
        .and(query_param("_limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(todos_json()))
        .expect(1)
        .mount(&server)
        .await;

    let mut params = TableDataParams::new(10, 2);
    ParamsPatch::search_phrase("dog").apply(&mut params);
    let todos = fetcher(&server, QueryMapper::default())
        .fetch(params)
        .await
        .expect("Fetch failed");

    assert_eq!(todos.len(), 2);
    assert_eq!(todos[1].title, "walk dog");
    assert!(todos[1].completed);
}

#[tokio::test]
async fn test_non_success_status_is_an_error_value() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = fetcher(&server, QueryMapper::unpaginated())
        .fetch(TableDataParams::default())
        .await;
    assert_eq!(result, Err(FetchError::HttpStatus(503)));
}

#[tokio::test]
async fn test_malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = fetcher(&server, QueryMapper::unpaginated())
        .fetch(TableDataParams::default())
        .await;
    assert!(matches!(result, Err(FetchError::Decode(_))), "got {result:?}");
}

#[tokio::test]
async fn test_unreachable_server_is_a_network_error() {
    let server = MockServer::start().await;
    let url = format!("{}/todos", server.uri());
    drop(server);

    let fetch =
        HttpFetch::<Vec<Todo>>::new(&url, QueryMapper::unpaginated(), &HttpSettings::default())
            .expect("Failed to build fetcher");
    let result = fetch.fetch(TableDataParams::default()).await;
    assert!(
        matches!(result, Err(FetchError::Network(_)) | Err(FetchError::Timeout(_))),
        "got {result:?}"
    );
}

/// Client-side table over a real HTTP source: the whole list is fetched once and
/// searched locally.
#[tokio::test]
async fn test_client_side_table_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/todos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(todos_json()))
        .expect(1)
        .mount(&server)
        .await;

    let getter = BaseFetcher::new(WithCount::new(fetcher(&server, QueryMapper::unpaginated())))
        .paginate_locally(|todo: &Todo, phrase: &str| todo.title.contains(phrase), None);
    let table = TableStateProvider::new(getter, TableConfig::default());
    let mut states = table.subscribe();

    let state = states.wait_for(|s| !s.loading()).await.unwrap();
    assert_eq!(state.data().map(|d| d.total_count), Some(2));

    table.set_search_phrase("milk");
    let state = states
        .wait_for(|s| s.data().is_some_and(|d| d.total_count == 1))
        .await
        .unwrap();
    assert_eq!(state.data().unwrap().rows[0].id, 1);

    table.shutdown().await.expect("Failed to shutdown table");
}
