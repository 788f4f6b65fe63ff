//! Encrypted mapping store.
//!
//! The store persists `(kind, namespace, original) -> token` associations so
//! the same value always receives the same token and tokens can be turned
//! back into originals. The whole record set is serialized and sealed with
//! AES-256-GCM on every write; the key is derived from the installation
//! secret with scrypt.
//!
//! # Failure policy
//!
//! Reads never fail: a missing, unreadable, undecryptable or malformed store
//! is logged and treated as empty. Writes do fail, because a token that was
//! not recorded cannot be unmasked later.
//!
//! # Concurrency
//!
//! Every write is a full load-modify-save cycle. Writers sharing one
//! [`MappingStore`] value are serialized by an internal async mutex. Separate
//! processes (or separate `MappingStore` values) writing the same file are
//! not coordinated and the last writer wins.

mod codec;
mod records;
pub mod secret;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex as StdMutex, PoisonError};

use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};
use veil_token::Category;
use zeroize::Zeroizing;

pub use records::MappingEntry;
pub use secret::{
    FileSecretProvider, MemorySecretProvider, Secret, SecretProvider, SecretResolver,
    SecretSource,
};

use crate::config::KdfConfig;
use crate::error::StoreError;
use codec::StoreKey;
use records::RecordSet;

/// Where the sealed payload lives.
#[derive(Debug)]
enum Backing {
    File(PathBuf),
    Memory(StdMutex<Option<String>>),
}

/// Encrypted, persistent mapping from originals to tokens.
#[derive(Debug)]
pub struct MappingStore {
    backing: Backing,
    key: StoreKey,
    writer: Mutex<()>,
}

impl MappingStore {
    /// Open a store backed by `path`. The file is created on first write.
    pub async fn open(
        path: impl Into<PathBuf>,
        secret: &Secret,
        kdf: KdfConfig,
    ) -> Result<Self, StoreError> {
        Self::with_backing(Backing::File(path.into()), secret, kdf).await
    }

    /// Create a store that keeps its sealed payload in memory.
    pub async fn in_memory(secret: &Secret, kdf: KdfConfig) -> Result<Self, StoreError> {
        Self::with_backing(Backing::Memory(StdMutex::new(None)), secret, kdf).await
    }

    async fn with_backing(
        backing: Backing,
        secret: &Secret,
        kdf: KdfConfig,
    ) -> Result<Self, StoreError> {
        let material = Zeroizing::new(secret.as_bytes().to_vec());
        let key = StoreKey::derive_async(material, kdf).await?;
        Ok(Self {
            backing,
            key,
            writer: Mutex::new(()),
        })
    }

    /// The store file, `None` for in-memory stores.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match &self.backing {
            Backing::File(path) => Some(path),
            Backing::Memory(_) => None,
        }
    }

    /// Return the token for `(kind, namespace, original)`, minting it with
    /// `factory` and persisting it on a miss.
    pub async fn remember<F>(
        &self,
        kind: Category,
        namespace: &str,
        original: &str,
        factory: F,
    ) -> Result<String, StoreError>
    where
        F: FnOnce() -> String,
    {
        let mut session = self.begin().await;
        let token = session.remember(kind, namespace, original, factory);
        session.commit().await?;
        Ok(token)
    }

    /// Start a load-once, write-once session.
    ///
    /// Holds the writer lock until the session is committed or dropped.
    pub async fn begin(&self) -> StoreSession<'_> {
        let guard = self.writer.lock().await;
        let records = self.load().await;
        StoreSession {
            store: self,
            _guard: guard,
            records,
            added: 0,
        }
    }

    /// Find the entry whose token is `token`, in any namespace.
    pub async fn reverse_lookup(&self, token: &str) -> Option<MappingEntry> {
        self.load().await.iter().find(|e| e.token == token).cloned()
    }

    /// Find the entry whose token is `token` within `namespace`.
    pub async fn reverse_lookup_in_namespace(
        &self,
        token: &str,
        namespace: &str,
    ) -> Option<MappingEntry> {
        self.load()
            .await
            .in_namespace(namespace)
            .find(|e| e.token == token)
            .cloned()
    }

    /// Namespaces with at least one entry, sorted.
    pub async fn list_namespaces(&self) -> Vec<String> {
        self.load().await.namespaces().into_iter().collect()
    }

    /// Entries of `namespace` in insertion order.
    pub async fn entries(&self, namespace: &str) -> Vec<MappingEntry> {
        self.load().await.in_namespace(namespace).cloned().collect()
    }

    /// Token to original map for `namespace`.
    pub async fn token_map(&self, namespace: &str) -> HashMap<String, String> {
        self.load()
            .await
            .in_namespace(namespace)
            .map(|e| (e.token.clone(), e.original.clone()))
            .collect()
    }

    /// Total number of entries across namespaces.
    pub async fn len(&self) -> usize {
        self.load().await.len()
    }

    /// Whether the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Delete every entry of `namespace`. Returns the number removed.
    pub async fn wipe_namespace(&self, namespace: &str) -> Result<usize, StoreError> {
        let _guard = self.writer.lock().await;
        let mut records = self.load().await;
        let removed = records.remove_namespace(namespace);
        if removed > 0 {
            self.save(&records).await?;
        }
        info!(namespace, removed, "wiped namespace");
        Ok(removed)
    }

    /// Delete every entry and the backing file.
    pub async fn wipe_all(&self) -> Result<(), StoreError> {
        let _guard = self.writer.lock().await;
        match &self.backing {
            Backing::File(path) => match tokio::fs::remove_file(path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(StoreError::io("removing mapping store", path, e)),
            },
            Backing::Memory(slot) => {
                slot.lock().unwrap_or_else(PoisonError::into_inner).take();
            }
        }
        info!("wiped mapping store");
        Ok(())
    }

    async fn read_payload(&self) -> Result<Option<String>, StoreError> {
        match &self.backing {
            Backing::File(path) => match tokio::fs::read_to_string(path).await {
                Ok(payload) => Ok(Some(payload)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(StoreError::io("reading mapping store", path, e)),
            },
            Backing::Memory(slot) => Ok(read_slot(slot)),
        }
    }

    async fn load(&self) -> RecordSet {
        let payload = match self.read_payload().await {
            Ok(Some(payload)) if !payload.trim().is_empty() => payload,
            Ok(_) => return RecordSet::default(),
            Err(e) => {
                warn!(error = %e, "mapping store unreadable, continuing with an empty mapping");
                return RecordSet::default();
            }
        };

        match codec::open(&self.key, &payload).and_then(|plain| RecordSet::from_json(&plain)) {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "mapping store could not be opened, continuing with an empty mapping");
                RecordSet::default()
            }
        }
    }

    async fn save(&self, records: &RecordSet) -> Result<(), StoreError> {
        let plain = Zeroizing::new(records.to_json()?);
        let payload = codec::seal(&self.key, &plain)?;

        match &self.backing {
            Backing::File(path) => write_private(path, payload.as_bytes())
                .await
                .map_err(|e| StoreError::io("writing mapping store", path, e))?,
            Backing::Memory(slot) => {
                *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(payload);
            }
        }
        debug!(entries = records.len(), "saved mapping store");
        Ok(())
    }
}

/// A single load-modify-save cycle over the store.
///
/// Lookups and insertions work on the loaded copy; nothing reaches the
/// backing until [`StoreSession::commit`]. Dropping a session discards its
/// insertions.
#[derive(Debug)]
pub struct StoreSession<'a> {
    store: &'a MappingStore,
    _guard: MutexGuard<'a, ()>,
    records: RecordSet,
    added: usize,
}

impl StoreSession<'_> {
    /// Look up an existing token.
    #[must_use]
    pub fn lookup(&self, kind: Category, namespace: &str, original: &str) -> Option<&str> {
        self.records.token(kind, namespace, original)
    }

    /// Look up an entry whose original equals `original` ignoring case.
    ///
    /// An exact match wins; otherwise the first folded match in insertion
    /// order. Returns the stored original and its token.
    #[must_use]
    pub fn lookup_folded(
        &self,
        kind: Category,
        namespace: &str,
        original: &str,
    ) -> Option<(&str, &str)> {
        if let Some(token) = self.records.token(kind, namespace, original) {
            return self
                .records
                .in_namespace(namespace)
                .find(|e| e.token == token)
                .map(|e| (e.original.as_str(), e.token.as_str()));
        }
        let folded = original.to_lowercase();
        self.records
            .in_namespace(namespace)
            .find(|e| e.kind == kind && e.original.to_lowercase() == folded)
            .map(|e| (e.original.as_str(), e.token.as_str()))
    }

    /// Return the stored token or record the one `factory` mints.
    pub fn remember<F>(&mut self, kind: Category, namespace: &str, original: &str, factory: F) -> String
    where
        F: FnOnce() -> String,
    {
        if let Some(token) = self.records.token(kind, namespace, original) {
            return token.to_string();
        }
        let token = factory();
        self.records.insert(MappingEntry {
            kind,
            namespace: namespace.to_string(),
            original: original.to_string(),
            token: token.clone(),
        });
        self.added += 1;
        debug!(namespace, kind = %kind, "recorded new token");
        token
    }

    /// Every token already stored for `namespace`.
    #[must_use]
    pub fn tokens_in_namespace(&self, namespace: &str) -> Vec<String> {
        self.records
            .in_namespace(namespace)
            .map(|e| e.token.clone())
            .collect()
    }

    /// Number of entries recorded in this session.
    #[must_use]
    pub const fn added(&self) -> usize {
        self.added
    }

    /// Persist the session. Returns the number of new entries written.
    pub async fn commit(self) -> Result<usize, StoreError> {
        if self.added > 0 {
            self.store.save(&self.records).await?;
        }
        Ok(self.added)
    }
}

fn read_slot(slot: &StdMutex<Option<String>>) -> Option<String> {
    slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
}

/// Write `contents` to `path` via a sibling temp file and rename.
///
/// Parent directories are created. On Unix the file is owner read/write only.
pub(crate) async fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let written = async {
        let mut file = options.open(&tmp).await?;
        file.write_all(contents).await?;
        file.sync_all().await
    }
    .await;

    if let Err(e) = written {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e);
    }
    tokio::fs::rename(&tmp, path).await
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAST: KdfConfig = KdfConfig { log_n: 4, r: 8, p: 1 };

    #[tokio::test]
    async fn remember_is_stable() {
        let store = MappingStore::in_memory(&Secret::generate(), FAST).await.unwrap();
        let first = store
            .remember(Category::Word, "ns", "cat", || "MASKWORD_A".to_string())
            .await
            .unwrap();
        let second = store
            .remember(Category::Word, "ns", "cat", || "MASKWORD_B".to_string())
            .await
            .unwrap();
        assert_eq!(first, "MASKWORD_A");
        assert_eq!(second, "MASKWORD_A");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn session_commits_once() {
        let store = MappingStore::in_memory(&Secret::generate(), FAST).await.unwrap();
        let mut session = store.begin().await;
        session.remember(Category::Ident, "ns", "a", || "vA".to_string());
        session.remember(Category::Ident, "ns", "b", || "vB".to_string());
        session.remember(Category::Ident, "ns", "a", || "vC".to_string());
        assert_eq!(session.tokens_in_namespace("ns"), ["vA", "vB"]);
        assert_eq!(session.commit().await.unwrap(), 2);
        assert_eq!(store.token_map("ns").await.get("vB").map(String::as_str), Some("b"));
    }

    #[tokio::test]
    async fn folded_lookup_prefers_exact_spelling() {
        let store = MappingStore::in_memory(&Secret::generate(), FAST).await.unwrap();
        let mut session = store.begin().await;
        session.remember(Category::Ident, "ns", "Widget", || "VAbc".to_string());
        session.remember(Category::Ident, "ns", "widget", || "vDef".to_string());

        assert_eq!(
            session.lookup_folded(Category::Ident, "ns", "widget"),
            Some(("widget", "vDef"))
        );
        assert_eq!(
            session.lookup_folded(Category::Ident, "ns", "WIDGET"),
            Some(("Widget", "VAbc"))
        );
        assert_eq!(session.lookup_folded(Category::Word, "ns", "widget"), None);
        assert_eq!(session.lookup_folded(Category::Ident, "other", "widget"), None);
    }

    #[tokio::test]
    async fn dropped_session_discards() {
        let store = MappingStore::in_memory(&Secret::generate(), FAST).await.unwrap();
        {
            let mut session = store.begin().await;
            session.remember(Category::Word, "ns", "x", || "t".to_string());
        }
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn wrong_secret_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mappings.enc");
        let store = MappingStore::open(&path, &Secret::generate(), FAST).await.unwrap();
        store
            .remember(Category::Email, "ns", "a@b.io", || "x@y.zz".to_string())
            .await
            .unwrap();

        let other = MappingStore::open(&path, &Secret::generate(), FAST).await.unwrap();
        assert!(other.is_empty().await);
        assert!(other.reverse_lookup("x@y.zz").await.is_none());
    }

    #[tokio::test]
    async fn write_failure_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes the rename fail.
        let path = dir.path().join("taken");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("child"), "x").unwrap();
        let store = MappingStore::open(&path, &Secret::generate(), FAST).await.unwrap();
        let err = store
            .remember(Category::Word, "ns", "cat", || "MASKWORD_A".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }

    #[tokio::test]
    async fn wipe_all_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mappings.enc");
        let store = MappingStore::open(&path, &Secret::generate(), FAST).await.unwrap();
        store
            .remember(Category::Num, "ns", "42", || "17".to_string())
            .await
            .unwrap();
        assert!(path.exists());
        store.wipe_all().await.unwrap();
        assert!(!path.exists());
        store.wipe_all().await.unwrap();
    }
}
