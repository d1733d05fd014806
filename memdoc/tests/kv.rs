use memdoc::prelude::*;

#[tokio::test]
async fn test_kv_lifecycle() {
    let db = Memdoc::new();
    let kv = db.kv();

    kv.set("k", "v", None).await.unwrap();
    assert!(matches!(
        kv.set("k", "v2", None).await,
        Err(DocumentStoreError::KeyExists(_))
    ));

    kv.delete("k").await.unwrap();
    assert!(matches!(kv.get("k").await, Err(DocumentStoreError::KeyNotFound(_))));

    kv.set("a", &1, Some(Duration::from_secs(60))).await.unwrap();
    kv.set("b", &json!({ "nested": true }), None).await.unwrap();
    assert_eq!(kv.size().await, 2);
    assert_eq!(kv.keys().await.len(), kv.size().await);
    assert_eq!(kv.type_of("b").await.unwrap(), "map");
}

#[tokio::test]
async fn test_kv_is_independent_from_documents() {
    let db = Memdoc::new();

    db.kv().set("users", "not a collection", None).await.unwrap();
    db.collection("users")
        .unwrap()
        .insert_one(&json!({ "name": "John" }))
        .await
        .unwrap();

    assert_eq!(db.kv().size().await, 1);
    assert_eq!(db.documents().len().await, 1);

    db.kv().clear().await;
    assert_eq!(db.documents().len().await, 1);
}

#[tokio::test]
async fn test_kv_purge_expired() {
    let kv = KvStore::builder().build().await.unwrap();

    kv.set("short", &1, Some(Duration::from_millis(1))).await.unwrap();
    kv.set("long", &2, Some(Duration::from_secs(3600))).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(kv.get("short").await.unwrap(), json!(1));
    assert_eq!(kv.purge_expired().await, 1);
    assert_eq!(kv.keys().await, vec!["long"]);
}
