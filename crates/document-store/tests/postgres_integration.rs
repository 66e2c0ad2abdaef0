//! PostgreSQL integration tests
//!
//! These tests share one PostgreSQL container and truncate the documents
//! table before each test, so they run serially.
//!
//! ```bash
//! cargo test -p document-store --test postgres_integration
//! ```

use std::sync::Arc;

use document_store::{
    Document, DocumentId, DocumentQuery, DocumentStore, DocumentStoreError, DocumentStoreExt,
    PostgresDocumentStore, Version, WriteOp,
};
use serial_test::serial;
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_documents_table.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

async fn get_test_store() -> PostgresDocumentStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE documents")
        .execute(&pool)
        .await
        .unwrap();

    PostgresDocumentStore::new(pool)
}

fn delivery(station: &str, quantity: i64) -> Document {
    Document::new(
        "deliveries",
        DocumentId::new(),
        serde_json::json!({"stationId": station, "quantity": quantity, "status": "Pending"}),
    )
}

#[tokio::test]
#[serial]
async fn insert_and_get_document() {
    let store = get_test_store().await;
    let doc = delivery("s1", 500);
    let id = doc.id;

    let version = store.insert(doc).await.unwrap();
    assert_eq!(version, Version::first());

    let loaded = store.get("deliveries", id).await.unwrap().unwrap();
    assert_eq!(loaded.version, Version::first());
    assert_eq!(loaded.body["quantity"], 500);
    assert_eq!(loaded.collection, "deliveries");
}

#[tokio::test]
#[serial]
async fn get_missing_document_returns_none() {
    let store = get_test_store().await;
    let loaded = store.get("deliveries", DocumentId::new()).await.unwrap();
    assert!(loaded.is_none());
}

#[tokio::test]
#[serial]
async fn duplicate_insert_is_rejected() {
    let store = get_test_store().await;
    let doc = delivery("s1", 10);

    store.insert(doc.clone()).await.unwrap();
    let result = store.insert(doc).await;

    assert!(matches!(
        result,
        Err(DocumentStoreError::AlreadyExists { .. })
    ));
}

#[tokio::test]
#[serial]
async fn replace_checks_version() {
    let store = get_test_store().await;
    let doc = delivery("s1", 10);
    let id = doc.id;
    store.insert(doc).await.unwrap();

    let read = store.get("deliveries", id).await.unwrap().unwrap();
    let stale = read.clone();

    let version = store
        .replace(read.with_body(&serde_json::json!({"quantity": 20})).unwrap())
        .await
        .unwrap();
    assert_eq!(version, Version::new(2));

    let result = store
        .replace(stale.with_body(&serde_json::json!({"quantity": 30})).unwrap())
        .await;
    match result {
        Err(DocumentStoreError::ConcurrencyConflict {
            expected, actual, ..
        }) => {
            assert_eq!(expected, Version::first());
            assert_eq!(actual, Version::new(2));
        }
        other => panic!("expected conflict, got {other:?}"),
    }

    let current = store.get("deliveries", id).await.unwrap().unwrap();
    assert_eq!(current.body["quantity"], 20);
}

#[tokio::test]
#[serial]
async fn replace_missing_document_is_not_found() {
    let store = get_test_store().await;
    let mut doc = delivery("s1", 10);
    doc.version = Version::first();

    let result = store.replace(doc).await;
    assert!(matches!(result, Err(DocumentStoreError::NotFound { .. })));
}

#[tokio::test]
#[serial]
async fn failed_commit_rolls_back() {
    let store = get_test_store().await;
    let existing = delivery("s1", 10);
    store.insert(existing.clone()).await.unwrap();

    let fresh = delivery("s1", 99);
    let fresh_id = fresh.id;
    let result = store
        .commit(vec![
            WriteOp::Insert(fresh),
            WriteOp::Replace(existing.with_body(&serde_json::json!({})).unwrap()),
        ])
        .await;

    assert!(result.is_err());
    assert!(!store.exists("deliveries", fresh_id).await.unwrap());
}

#[tokio::test]
#[serial]
async fn delete_removes_document() {
    let store = get_test_store().await;
    let doc = delivery("s1", 10);
    let id = doc.id;
    store.insert(doc).await.unwrap();

    let stale = store
        .commit(vec![WriteOp::Delete {
            collection: "deliveries".into(),
            id,
            expected: Some(Version::new(5)),
        }])
        .await;
    assert!(matches!(
        stale,
        Err(DocumentStoreError::ConcurrencyConflict { .. })
    ));

    store.delete("deliveries", id).await.unwrap();
    assert!(store.get("deliveries", id).await.unwrap().is_none());

    let again = store.delete("deliveries", id).await;
    assert!(matches!(again, Err(DocumentStoreError::NotFound { .. })));
}

#[tokio::test]
#[serial]
async fn find_filters_by_body_fields() {
    let store = get_test_store().await;
    for (station, qty) in [("s1", 1), ("s2", 2), ("s1", 3), ("s3", 4)] {
        store.insert(delivery(station, qty)).await.unwrap();
    }

    let s1 = store
        .find(DocumentQuery::new("deliveries").field_eq("stationId", "s1"))
        .await
        .unwrap();
    assert_eq!(s1.len(), 2);
    assert_eq!(s1[0].body["quantity"], 1);
    assert_eq!(s1[1].body["quantity"], 3);

    let some = store
        .find(DocumentQuery::new("deliveries").field_in("stationId", ["s2", "s3"]))
        .await
        .unwrap();
    assert_eq!(some.len(), 2);

    let page = store
        .find(DocumentQuery::new("deliveries").offset(1).limit(2))
        .await
        .unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].body["quantity"], 2);

    let none = store
        .find(DocumentQuery::new("stations"))
        .await
        .unwrap();
    assert!(none.is_empty());
}
