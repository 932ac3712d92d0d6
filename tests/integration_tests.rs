//! Integration tests using mock HTTP server
//!
//! Tests the full flow: paginated API → sync engine → DuckDB store → HTTP read path

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use catalog_sync::kinds::{PriceRecord, ProductRecord};
use catalog_sync::server::{self, ProductResponse};
use catalog_sync::{
    ApiConfig, Error, HttpClient, KvStore, ProductKind, RetryPolicy, SyncConfig, SyncEngine,
};
use serde_json::{json, Value};
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helpers
// ============================================================================

fn envelope(endpoint: &str, page: u32, last: u32, total: u64, entities: Value) -> Value {
    json!({
        "links": [
            {"rel": "first", "href": format!("/{endpoint}?Page=1")},
            {"rel": "self", "href": format!("/{endpoint}?Page={page}")},
            {"rel": "last", "href": format!("/{endpoint}?Page={last}")}
        ],
        "metadata": {"totalRecords": total, "currentPageRecords": entities.as_array().map_or(0, Vec::len)},
        "entities": entities
    })
}

async fn mount_page(server: &MockServer, endpoint: &str, page: u32, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/{endpoint}")))
        .and(query_param("Page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn engine_for(server: &MockServer) -> (TempDir, SyncEngine<HttpClient>) {
    let dir = tempfile::tempdir().unwrap();
    let api = ApiConfig::new(server.uri(), "Basic dXNlcjpwYXNz", "client-1", "3423300")
        .with_limit(2);
    let client = HttpClient::new(api).unwrap();
    let config = SyncConfig::new()
        .with_retry(RetryPolicy::new(3, Duration::from_millis(5)))
        .with_page_delay(Duration::from_millis(1));
    let store = KvStore::new(dir.path().join("catalog.duckdb"));
    (dir, SyncEngine::new(client, store).with_config(config))
}

async fn get_json(store: KvStore, uri: &str) -> (StatusCode, Value) {
    let response = server::router(store)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

// ============================================================================
// End-to-end
// ============================================================================

#[tokio::test]
async fn test_two_skus_synced_twice_leaves_two_records() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "products",
        1,
        envelope(
            "products",
            1,
            1,
            2,
            json!([
                {"sku": "A", "consumerDescription": "Chair", "seriesId": "D100"},
                {"sku": "B", "consumerDescription": "Table", "seriesId": "D200"}
            ]),
        ),
    )
    .await;
    mount_page(
        &mock_server,
        "Prices",
        1,
        envelope(
            "Prices",
            1,
            1,
            1,
            json!([{"sku": "A", "sellPrice": "120.00", "totalNetPrice": "97.93"}]),
        ),
    )
    .await;

    let (_dir, engine) = engine_for(&mock_server);
    engine.sync_cycle().await.unwrap();
    engine.sync_cycle().await.unwrap();

    let store = engine.store().clone();
    assert_eq!(store.count("products").unwrap(), 2);
    assert_eq!(store.count("prices").unwrap(), 1);

    let (status, body) = get_json(store, "/products").await;
    assert_eq!(status, StatusCode::OK);
    let merged: Vec<ProductResponse> = serde_json::from_value(body).unwrap();
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].clave, "A");
    assert_eq!(merged[0].nombre, "Chair");
    assert_eq!(merged[0].modelo, "D100");
    assert_eq!(merged[0].costo, 120.0);
    assert_eq!(merged[0].costo2, 97.93);
    assert_eq!(merged[0].proveedor, "Ashley Furniture");
    assert_eq!(merged[1].clave, "B");
    assert_eq!(merged[1].costo, 0.0);
}

#[tokio::test]
async fn test_multi_page_listing_with_auth_headers() {
    let mock_server = MockServer::start().await;

    for page in 1..=3u32 {
        let skus: Vec<Value> = (0..2)
            .map(|i| json!({"sku": format!("P{page}-{i}")}))
            .collect();
        Mock::given(method("GET"))
            .and(path("/products"))
            .and(query_param("customer", "3423300"))
            .and(query_param("Limit", "2"))
            .and(query_param("Page", page.to_string()))
            .and(header("Authorization", "Basic dXNlcjpwYXNz"))
            .and(header("Client_Id", "client-1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(envelope("products", page, 3, 6, Value::Array(skus))),
            )
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let (_dir, engine) = engine_for(&mock_server);
    let stats = engine.sync_all(&ProductKind).await.unwrap();

    assert_eq!(stats.pages_fetched, 3);
    assert_eq!(stats.records_synced, 6);
    assert_eq!(stats.total_records_reported, 6);

    let stored: ProductRecord = engine.store().read_one("products", "P2-1").unwrap();
    assert_eq!(stored.supplier, "Ashley Furniture");
}

#[tokio::test]
async fn test_transient_upstream_failures_are_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Prices"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        "Prices",
        1,
        envelope("Prices", 1, 1, 1, json!([{"sku": "A", "sellPrice": "bogus"}])),
    )
    .await;

    let (_dir, engine) = engine_for(&mock_server);
    let stats = engine
        .sync_kind(catalog_sync::KindId::Prices)
        .await
        .unwrap();

    assert_eq!(stats.records_synced, 1);
    assert_eq!(stats.malformed_fields, 1);
    let price: PriceRecord = engine.store().read_one("prices", "A").unwrap();
    assert_eq!(price.sell_price, 0.0);
}

#[tokio::test]
async fn test_persistent_failure_aborts_the_cycle() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(500).set_body_string("down"))
        .expect(3)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Prices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope("Prices", 1, 1, 0, json!([]))))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (_dir, engine) = engine_for(&mock_server);
    let err = engine.sync_cycle().await.unwrap_err();

    match err {
        Error::Page { page, source, .. } => {
            assert_eq!(page, 1);
            assert!(matches!(*source, Error::RetriesExhausted { attempts: 3, .. }));
        }
        other => panic!("Expected Page error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unauthorized_is_still_bounded_by_attempts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let (_dir, engine) = engine_for(&mock_server);
    let err = engine.sync_all(&ProductKind).await.unwrap_err();

    assert!(err.to_string().contains("failed after 3 attempts"));
    assert!(err.to_string().contains("HTTP 401"));
}

#[tokio::test]
async fn test_single_product_lookup_over_http() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "products",
        1,
        envelope("products", 1, 1, 1, json!([{"sku": "A", "consumerDescription": "Chair"}])),
    )
    .await;
    mount_page(&mock_server, "Prices", 1, envelope("Prices", 1, 1, 0, json!([]))).await;

    let (_dir, engine) = engine_for(&mock_server);
    engine.sync_cycle().await.unwrap();

    let (status, body) = get_json(engine.store().clone(), "/products/A").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nombre"], "Chair");
    assert_eq!(body["costo"], 0.0);

    let (status, _) = get_json(engine.store().clone(), "/products/ZZZ").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reads_during_a_sync_see_whole_pages() {
    const PAGES: u32 = 25;
    const PAGE_SIZE: usize = 10;

    let mock_server = MockServer::start().await;
    for page in 1..=PAGES {
        let entities: Vec<Value> = (0..PAGE_SIZE)
            .map(|i| json!({"sku": format!("P{page:02}-{i}")}))
            .collect();
        mount_page(
            &mock_server,
            "products",
            page,
            envelope("products", page, PAGES, 250, Value::Array(entities)),
        )
        .await;
    }

    let (_dir, engine) = engine_for(&mock_server);
    engine.store().ensure_collection("products").unwrap();
    let store = engine.store().clone();

    let sync = engine.sync_all(&ProductKind);
    let reads = async {
        let mut observed = Vec::new();
        for _ in 0..40 {
            let (status, body) = get_json(store.clone(), "/products").await;
            assert_eq!(status, StatusCode::OK, "read failed during sync: {body}");
            let merged: Vec<ProductResponse> = serde_json::from_value(body).unwrap();
            observed.push(merged.len());
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        observed
    };
    let (stats, observed) = tokio::join!(sync, reads);

    assert_eq!(stats.unwrap().records_synced, 250);
    for len in observed {
        assert_eq!(len % PAGE_SIZE, 0, "read saw a partial page");
    }
    assert_eq!(engine.store().count("products").unwrap(), 250);
}
