//! Data table behaviour against a scripted transport.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::oneshot;

use envmon_lib::api::query::PageRequest;
use envmon_lib::api::query::QueryKey;
use envmon_lib::api::query::RemoteCollectionQuery;
use envmon_lib::api::query::SortSpec;
use envmon_lib::api::query::Transport;
use envmon_lib::api::resources;
use envmon_lib::cache::QueryCache;
use envmon_lib::cache::RevalidateReason;
use envmon_lib::columns;
use envmon_lib::error::ApiError;
use envmon_lib::error::Error;
use envmon_lib::model::NodeData;
use envmon_lib::model::SubscribedCompany;
use envmon_lib::model::SubscribedNode;
use envmon_lib::model::markers;
use envmon_lib::table::ActionOutcome;
use envmon_lib::table::Applied;
use envmon_lib::table::DataTable;
use envmon_lib::table::EmptyMessage;
use envmon_lib::table::TableBody;
use envmon_lib::table::TableHandle;
use envmon_lib::table::TableOptions;

/// Transport answering from fixed bodies, or from gates the test opens.
#[derive(Default)]
struct ScriptedTransport {
    bodies: Mutex<HashMap<String, String>>,
    gates: Mutex<HashMap<String, oneshot::Receiver<String>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    fn respond(&self, path: &str, body: &str) {
        self.bodies
            .lock()
            .unwrap()
            .insert(path.to_string(), body.to_string());
    }

    /// The next GET of `path` waits until the returned sender fires.
    fn gate(&self, path: &str) -> oneshot::Sender<String> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(path.to_string(), rx);
        tx
    }

    fn calls_to(&self, path: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == path).count()
    }

    async fn wait_for(&self, path: &str) {
        self.wait_for_calls(path, 1).await;
    }

    async fn wait_for_calls(&self, path: &str, n: usize) {
        while self.calls_to(path) < n {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, path: &str) -> Result<Vec<u8>, Error> {
        self.calls.lock().unwrap().push(path.to_string());

        let gate = self.gates.lock().unwrap().remove(path);
        if let Some(gate) = gate {
            return match gate.await {
                Ok(body) => Ok(body.into_bytes()),
                Err(_) => Err(ApiError::http(503, "gate dropped").into()),
            };
        }

        match self.bodies.lock().unwrap().get(path) {
            Some(body) => Ok(body.clone().into_bytes()),
            None => Err(ApiError::http(404, format!("no route for {}", path)).into()),
        }
    }
}

fn company_rows(ids: &[i64]) -> String {
    let rows: Vec<String> = ids
        .iter()
        .map(|id| {
            format!(
                r#"{{"companyId":{id},"name":"PT {id}","type":"industry","joinedAt":"2024-01-0{id}T00:00:00Z"}}"#
            )
        })
        .collect();
    format!(r#"{{"rows":[{}],"total":{}}}"#, rows.join(","), ids.len())
}

fn companies_table(
    transport: &Arc<ScriptedTransport>,
    cache: &QueryCache,
    node_id: i64,
) -> DataTable<SubscribedCompany> {
    let query = RemoteCollectionQuery::new(transport.clone(), cache.clone());
    DataTable::new(
        resources::node_companies(node_id),
        columns::company_subscriptions_columns(|_| {}),
        query,
        TableOptions::default(),
    )
}

#[tokio::test]
async fn test_later_request_wins_when_earlier_resolves_last() {
    let transport = Arc::new(ScriptedTransport::default());
    let cache = QueryCache::new();
    let handle = TableHandle::new(companies_table(&transport, &cache, 42));

    let k1 = "/nodes/42/companies?page=1&pageSize=10&sortField=name&sortOrder=ASC";
    let k2 = "/nodes/42/companies?page=2&pageSize=10&sortField=name&sortOrder=ASC";
    let gate1 = transport.gate(k1);
    let gate2 = transport.gate(k2);

    let first = tokio::spawn({
        let handle = handle.clone();
        async move { handle.refresh().await }
    });
    transport.wait_for(k1).await;

    handle.lock().await.set_page(2);
    let second = tokio::spawn({
        let handle = handle.clone();
        async move { handle.refresh().await }
    });
    transport.wait_for(k2).await;

    gate2.send(company_rows(&[2])).unwrap();
    assert_eq!(second.await.unwrap(), Applied::Applied);

    gate1.send(company_rows(&[1])).unwrap();
    assert_eq!(first.await.unwrap(), Applied::Superseded);

    let table = handle.lock().await;
    assert_eq!(table.rows().len(), 1);
    assert_eq!(table.rows()[0].company_id, 2);
    assert_eq!(table.page(), 2);

    // The late response still fills the cache for its own key.
    let cached = cache.keys().await;
    assert!(cached.iter().any(|k| k == k1));
}

#[tokio::test]
async fn test_prefix_invalidation_refetches_matching_tables_only() {
    let transport = Arc::new(ScriptedTransport::default());
    let k42 = "/nodes/42/companies?page=1&pageSize=10&sortField=name&sortOrder=ASC";
    let k99 = "/nodes/99/companies?page=1&pageSize=10&sortField=name&sortOrder=ASC";
    transport.respond(k42, &company_rows(&[1, 2]));
    transport.respond(k99, &company_rows(&[3]));

    let cache = QueryCache::new();
    let mut t42 = companies_table(&transport, &cache, 42);
    let mut t99 = companies_table(&transport, &cache, 99);
    assert_eq!(t42.sync().await, Some(Applied::Applied));
    assert_eq!(t99.sync().await, Some(Applied::Applied));

    cache.invalidate_prefix("/nodes/42/companies").await;

    assert_eq!(t42.sync().await, Some(Applied::Applied));
    assert_eq!(t99.sync().await, None);
    assert_eq!(transport.calls_to(k42), 2);
    assert_eq!(transport.calls_to(k99), 1);
}

#[tokio::test]
async fn test_fetch_in_flight_during_invalidation_is_not_cached() {
    let transport = Arc::new(ScriptedTransport::default());
    let key = "/nodes/42/companies?page=1&pageSize=10&sortField=name&sortOrder=ASC";
    let gate = transport.gate(key);
    transport.respond(key, &company_rows(&[2]));

    let cache = QueryCache::new();
    let query = RemoteCollectionQuery::new(transport.clone(), cache.clone());
    let request = PageRequest::new(SortSpec::asc("name"));
    let in_flight = tokio::spawn({
        let query = query.clone();
        let request = request.clone();
        async move {
            query
                .fetch_page::<SubscribedCompany>("/nodes/42/companies", &request)
                .await
        }
    });
    transport.wait_for(key).await;

    cache.invalidate_prefix("/nodes/42/companies").await;
    gate.send(company_rows(&[7])).unwrap();
    let old = in_flight.await.unwrap().unwrap();
    assert_eq!(old.data().rows()[0].company_id, 7);
    assert!(cache.keys().await.is_empty());

    let fresh = query
        .fetch_page::<SubscribedCompany>("/nodes/42/companies", &request)
        .await
        .unwrap();
    assert!(fresh.cache.is_miss());
    assert_eq!(fresh.data().rows()[0].company_id, 2);
    assert_eq!(transport.calls_to(key), 2);
}

#[tokio::test]
async fn test_table_refetches_from_network_after_invalidation_mid_fetch() {
    let transport = Arc::new(ScriptedTransport::default());
    let key = "/nodes/42/companies?page=1&pageSize=10&sortField=name&sortOrder=ASC";
    let gate = transport.gate(key);
    transport.respond(key, &company_rows(&[2]));

    let cache = QueryCache::new();
    let handle = TableHandle::new(companies_table(&transport, &cache, 42));
    let first = tokio::spawn({
        let handle = handle.clone();
        async move { handle.refresh().await }
    });
    transport.wait_for(key).await;

    cache.invalidate_prefix("/nodes/42/companies").await;
    gate.send(company_rows(&[7])).unwrap();
    assert_eq!(first.await.unwrap(), Applied::Applied);

    // Something else writes the old body back after the invalidation.
    let stale = QueryKey::derive("/nodes/42/companies", &PageRequest::new(SortSpec::asc("name")));
    cache.put(&stale, company_rows(&[7]).into_bytes()).await;

    assert_eq!(handle.sync().await, Some(Applied::Applied));
    assert_eq!(handle.lock().await.rows()[0].company_id, 2);
    assert_eq!(transport.calls_to(key), 2);
}

#[tokio::test]
async fn test_handle_retry_recovers_without_holding_the_lock() {
    let transport = Arc::new(ScriptedTransport::default());
    let key = "/nodes/42/companies?page=1&pageSize=10&sortField=name&sortOrder=ASC";

    let cache = QueryCache::new();
    let handle = TableHandle::new(companies_table(&transport, &cache, 42));
    assert_eq!(handle.retry().await, None);

    handle.refresh().await;
    assert!(handle.lock().await.state().is_error());

    let gate = transport.gate(key);
    let retry = tokio::spawn({
        let handle = handle.clone();
        async move { handle.retry().await }
    });
    transport.wait_for_calls(key, 2).await;

    // The lock is free while the retry is in flight.
    assert!(matches!(handle.view().await.body, TableBody::Loading { .. }));

    gate.send(company_rows(&[3])).unwrap();
    assert_eq!(retry.await.unwrap(), Some(Applied::Applied));
    assert_eq!(handle.lock().await.rows()[0].company_id, 3);
    assert_eq!(handle.retry().await, None);
}

#[tokio::test]
async fn test_revalidate_on_focus_refetches_every_table() {
    let transport = Arc::new(ScriptedTransport::default());
    let key = "/nodes/42/companies?page=1&pageSize=10&sortField=name&sortOrder=ASC";
    transport.respond(key, &company_rows(&[1]));

    let cache = QueryCache::new();
    let mut table = companies_table(&transport, &cache, 42);
    table.load().await;

    assert_eq!(cache.revalidate(RevalidateReason::Focus).await, Some(1));
    assert_eq!(table.sync().await, Some(Applied::Applied));
    assert_eq!(transport.calls_to(key), 2);
}

#[tokio::test]
async fn test_zero_total_renders_empty_message_without_pager() {
    let transport = Arc::new(ScriptedTransport::default());
    transport.respond(
        "/nodes?page=1&pageSize=10&sortField=name&sortOrder=ASC",
        r#"{"rows":[],"total":0}"#,
    );

    let query = RemoteCollectionQuery::new(transport.clone(), QueryCache::new());
    let options = TableOptions::default()
        .with_page_size(10)
        .with_empty_msg(EmptyMessage::new("Belum ada Node").with_subtitle("Tambahkan Node sekarang"));
    let mut table = DataTable::<NodeData>::new(resources::NODES, columns::nodes_columns(), query, options);
    table.load().await;

    let view = table.view();
    assert_eq!(
        view.body,
        TableBody::Empty {
            title: "Belum ada Node".to_string(),
            subtitle: Some("Tambahkan Node sekarang".to_string()),
        }
    );
    assert!(view.pager.is_none());
}

#[tokio::test]
async fn test_hidden_pagination_fetches_all_and_publishes_once() {
    let transport = Arc::new(ScriptedTransport::default());
    transport.respond(
        "/companies/3/nodes?all=true&sortField=name&sortOrder=ASC",
        r#"{"rows":[
            {"subscriptionId":7,"nodeId":42,"name":"A","status":"active","joinedAt":"2024-01-01T00:00:00Z","coordinate":[-7.5,110.1]},
            {"subscriptionId":8,"nodeId":43,"name":"B","status":"nonactive","joinedAt":"2024-01-02T00:00:00Z"},
            {"subscriptionId":9,"nodeId":44,"name":"C","status":"active","joinedAt":"2024-01-03T00:00:00Z","coordinate":[-7.6,110.2]}
        ],"total":3}"#,
    );

    let removed = Arc::new(Mutex::new(Vec::new()));
    let sink = removed.clone();
    let query = RemoteCollectionQuery::new(transport.clone(), QueryCache::new());
    let mut table = DataTable::<SubscribedNode>::new(
        resources::company_nodes(3),
        columns::subscribed_nodes_columns(move |id| sink.lock().unwrap().push(id)),
        query,
        TableOptions::default().with_hidden_pagination(true),
    );
    let mut rows_rx = table.subscribe();

    assert_eq!(table.load().await, Applied::Applied);

    let view = table.view();
    assert_eq!(view.rows().len(), 3);
    assert!(view.pager.is_none());

    let mirrored = rows_rx.try_recv().unwrap();
    assert_eq!(mirrored.len(), 3);
    assert!(rows_rx.try_recv().is_err());

    let map: Vec<i64> = markers(mirrored.as_slice()).iter().map(|m| m.node_id).collect();
    assert_eq!(map, vec![42, 44]);

    assert_eq!(
        table.invoke_action(0, "actions", columns::REMOVE),
        Some(ActionOutcome::Handled)
    );
    assert_eq!(*removed.lock().unwrap(), vec![7]);
    assert_eq!(
        table.invoke_action(0, "actions", columns::VIEW),
        Some(ActionOutcome::Navigate("/nodes/42".to_string()))
    );
}

#[tokio::test]
async fn test_failed_fetch_keeps_stale_rows_and_retry_recovers() {
    let transport = Arc::new(ScriptedTransport::default());
    let page1 = "/nodes/42/companies?page=1&pageSize=10&sortField=name&sortOrder=ASC";
    let page1_desc = "/nodes/42/companies?page=1&pageSize=10&sortField=name&sortOrder=DESC";
    transport.respond(page1, &company_rows(&[1, 2]));

    let cache = QueryCache::new();
    let mut table = companies_table(&transport, &cache, 42);
    table.load().await;

    assert!(table.toggle_sort("name"));
    table.sync().await;

    match table.view().body {
        TableBody::Error { error, rows } => {
            assert!(error.message.contains("404"));
            assert_eq!(rows.len(), 2);
        }
        other => panic!("expected error body, got {:?}", other),
    }

    transport.respond(page1_desc, &company_rows(&[2, 1]));
    assert_eq!(table.retry().await, Some(Applied::Applied));
    assert_eq!(table.rows()[0].company_id, 2);
}

#[tokio::test]
async fn test_url_change_drops_stale_rows() {
    let transport = Arc::new(ScriptedTransport::default());
    transport.respond(
        "/nodes/42/companies?page=1&pageSize=10&sortField=name&sortOrder=ASC",
        &company_rows(&[1]),
    );

    let cache = QueryCache::new();
    let mut table = companies_table(&transport, &cache, 42);
    table.load().await;

    table.set_api_url(resources::node_companies(99));
    assert_eq!(table.view().body, TableBody::Idle);

    table.sync().await;
    assert!(matches!(table.view().body, TableBody::Error { ref rows, .. } if rows.is_empty()));
}
