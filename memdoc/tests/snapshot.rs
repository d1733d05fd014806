use memdoc::prelude::*;
use tempfile::TempDir;

#[tokio::test]
async fn test_file_snapshot_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("memdocstorage.json");

    let store = DocumentStore::builder().snapshot_path(&path).build().await.unwrap();
    let users = store.collection("users").unwrap();
    users.insert_one(&json!({ "name": "John", "age": 35 })).await.unwrap();
    users.insert_one(&json!({ "name": "Jane", "age": 35 })).await.unwrap();
    users
        .update(Predicate::new().eq("name", "Jane"), &json!({ "age": 36 }))
        .one()
        .await
        .unwrap();

    assert_eq!(store.save().await.unwrap(), 2);
    assert!(path.exists());

    let restored = DocumentStore::builder().snapshot_path(&path).build().await.unwrap();
    assert!(restored.is_empty().await);
    assert_eq!(restored.load().await.unwrap(), 2);
    assert_eq!(restored.records().await, store.records().await);

    let jane = restored
        .collection("users")
        .unwrap()
        .find(Predicate::new().eq("name", "Jane"))
        .first()
        .await
        .unwrap();
    assert!(jane.updated_at().is_some());
}

#[tokio::test]
async fn test_load_without_snapshot_is_not_found() {
    let dir = TempDir::new().unwrap();
    let store = DocumentStore::builder()
        .snapshot_path(dir.path().join("missing.json"))
        .build()
        .await
        .unwrap();

    assert!(matches!(store.load().await, Err(DocumentStoreError::NotFound(_))));
}

#[tokio::test]
async fn test_insert_from_file() {
    let dir = TempDir::new().unwrap();
    let many = dir.path().join("users.json");
    let one = dir.path().join("user.json");
    let scalar = dir.path().join("scalar.json");

    std::fs::write(&many, r#"[{"name": "John", "age": 35}, {"name": "Jane", "age": 35}]"#).unwrap();
    std::fs::write(&one, r#"{"name": "Jim", "age": 20}"#).unwrap();
    std::fs::write(&scalar, "42").unwrap();

    let store = DocumentStore::new();
    let users = store.collection("users").unwrap();

    assert_eq!(users.insert_from_file(&many).await.unwrap().len(), 2);
    assert_eq!(users.batch().from_file(&one).await.unwrap().len(), 1);
    assert_eq!(users.find(Predicate::new().eq("age", 35)).count().await, 2);

    assert!(matches!(
        users.insert_from_file(&scalar).await,
        Err(DocumentStoreError::InvalidFormat(_))
    ));
    assert!(matches!(
        users.insert_from_file(dir.path().join("absent.json")).await,
        Err(DocumentStoreError::Io(_))
    ));
    assert!(matches!(
        users.insert(&json!({ "name": "Jo" })).from_file(&one).await,
        Err(DocumentStoreError::ConflictingArguments(_))
    ));
    assert_eq!(store.len().await, 3);
}

#[tokio::test]
async fn test_memdoc_shutdown_writes_final_snapshot() {
    let sink = MemorySink::new();
    let db = Memdoc::builder().sink(sink.clone()).build().await.unwrap();

    db.collection("user")
        .unwrap()
        .insert_one(&json!({ "name": "John" }))
        .await
        .unwrap();
    assert_eq!(db.autosave_period(), None);
    assert_eq!(db.shutdown().await.unwrap(), 1);

    let restored = Memdoc::builder().sink(sink).build().await.unwrap();
    assert_eq!(restored.documents().load().await.unwrap(), 1);
}

#[tokio::test]
async fn test_memdoc_autosave() {
    let sink = MemorySink::new();
    let db = Memdoc::builder()
        .sink(sink.clone())
        .autosave(Duration::from_millis(10))
        .build()
        .await
        .unwrap();

    assert_eq!(db.autosave_period(), Some(Duration::from_millis(10)));
    db.collection("user")
        .unwrap()
        .insert_one(&json!({ "name": "John" }))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(sink.read().await.unwrap().is_some());
}
