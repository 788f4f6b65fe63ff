//! Integration tests for the encrypted mapping store.

use std::sync::Arc;

use veil::{Category, KdfConfig, MappingStore, Secret};

const FAST: KdfConfig = KdfConfig {
    log_n: 4,
    r: 8,
    p: 1,
};

async fn file_store(dir: &tempfile::TempDir, secret: &Secret) -> MappingStore {
    MappingStore::open(dir.path().join("mappings.enc"), secret, FAST)
        .await
        .unwrap()
}

#[tokio::test]
async fn payload_is_three_hex_fields() {
    let dir = tempfile::tempdir().unwrap();
    let secret = Secret::generate();
    let store = file_store(&dir, &secret).await;
    store
        .remember(Category::Email, "ns", "jane@example.com", || "kqz@wvrt.xq".to_string())
        .await
        .unwrap();

    let payload = std::fs::read_to_string(dir.path().join("mappings.enc")).unwrap();
    let parts: Vec<&str> = payload.trim().split(':').collect();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0].len(), 24, "96-bit nonce");
    assert_eq!(parts[1].len(), 32, "128-bit tag");
    for part in &parts {
        assert!(part.chars().all(|c| c.is_ascii_hexdigit()));
    }
    assert!(!payload.contains("jane"));
}

#[tokio::test]
async fn corrupted_store_reads_empty_and_recovers() {
    let dir = tempfile::tempdir().unwrap();
    let secret = Secret::generate();
    let path = dir.path().join("mappings.enc");
    std::fs::write(&path, "not:a:store").unwrap();

    let store = file_store(&dir, &secret).await;
    assert!(store.is_empty().await);
    assert!(store.list_namespaces().await.is_empty());

    store
        .remember(Category::Word, "ns", "cat", || "MASKWORD_A".to_string())
        .await
        .unwrap();
    let reopened = file_store(&dir, &secret).await;
    assert_eq!(reopened.len().await, 1);
}

#[tokio::test]
async fn lookups_and_namespaces() {
    let store = MappingStore::in_memory(&Secret::generate(), FAST).await.unwrap();
    store
        .remember(Category::Ident, "zeta", "total", || "vAbc".to_string())
        .await
        .unwrap();
    store
        .remember(Category::Ident, "alpha", "total", || "vXyz".to_string())
        .await
        .unwrap();

    assert_eq!(store.list_namespaces().await, ["alpha", "zeta"]);

    let entry = store.reverse_lookup("vAbc").await.unwrap();
    assert_eq!(entry.namespace, "zeta");
    assert_eq!(entry.kind, Category::Ident);
    assert!(store.reverse_lookup_in_namespace("vAbc", "alpha").await.is_none());
    assert_eq!(
        store
            .reverse_lookup_in_namespace("vXyz", "alpha")
            .await
            .map(|e| e.original),
        Some("total".to_string())
    );
}

#[tokio::test]
async fn kinds_are_keyed_separately() {
    let store = MappingStore::in_memory(&Secret::generate(), FAST).await.unwrap();
    let word = store
        .remember(Category::Word, "ns", "42", || "MASKWORD_Q".to_string())
        .await
        .unwrap();
    let num = store
        .remember(Category::Num, "ns", "42", || "17".to_string())
        .await
        .unwrap();
    assert_ne!(word, num);
    assert_eq!(store.entries("ns").await.len(), 2);
}

#[tokio::test]
async fn wipe_namespace_keeps_others() {
    let dir = tempfile::tempdir().unwrap();
    let secret = Secret::generate();
    let store = file_store(&dir, &secret).await;
    store
        .remember(Category::Word, "a", "x", || "MASKWORD_1".to_string())
        .await
        .unwrap();
    store
        .remember(Category::Word, "b", "x", || "MASKWORD_2".to_string())
        .await
        .unwrap();

    assert_eq!(store.wipe_namespace("a").await.unwrap(), 1);
    assert_eq!(store.wipe_namespace("a").await.unwrap(), 0);

    let reopened = file_store(&dir, &secret).await;
    assert_eq!(reopened.list_namespaces().await, ["b"]);
    assert!(reopened.reverse_lookup("MASKWORD_1").await.is_none());
    assert!(reopened.reverse_lookup("MASKWORD_2").await.is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn writers_on_one_store_are_serialized() {
    let store = Arc::new(MappingStore::in_memory(&Secret::generate(), FAST).await.unwrap());

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .remember(Category::Word, "ns", &format!("w{i}"), || format!("MASKWORD_{i}"))
                    .await
                    .unwrap()
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(store.len().await, 16);
}

#[cfg(unix)]
#[tokio::test]
async fn store_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir, &Secret::generate()).await;
    store
        .remember(Category::Word, "ns", "x", || "MASKWORD_1".to_string())
        .await
        .unwrap();

    let mode = std::fs::metadata(dir.path().join("mappings.enc"))
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o600);
}
