//! Plaintext record set behind the encrypted store.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use veil_token::Category;

use crate::error::StoreError;

/// Current serialized format version.
const FORMAT_VERSION: u32 = 1;

/// A persisted association from an original value to its token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Category of the value.
    pub kind: Category,
    /// Namespace the token is scoped to.
    pub namespace: String,
    /// The original value.
    pub original: String,
    /// The token that replaced it.
    pub token: String,
}

#[derive(Serialize, Deserialize)]
struct Document {
    version: u32,
    entries: Vec<MappingEntry>,
}

type EntryKey = (Category, String, String);

/// Indexed, insertion-ordered collection of entries.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordSet {
    entries: Vec<MappingEntry>,
    index: HashMap<EntryKey, usize>,
}

impl RecordSet {
    pub(crate) fn from_json(bytes: &[u8]) -> Result<Self, StoreError> {
        let doc: Document =
            serde_json::from_slice(bytes).map_err(|e| StoreError::malformed(e.to_string()))?;
        if doc.version != FORMAT_VERSION {
            return Err(StoreError::malformed(format!(
                "unsupported format version {}",
                doc.version
            )));
        }
        let mut set = Self::default();
        for entry in doc.entries {
            set.insert(entry);
        }
        Ok(set)
    }

    pub(crate) fn to_json(&self) -> Result<Vec<u8>, StoreError> {
        let doc = Document {
            version: FORMAT_VERSION,
            entries: self.entries.clone(),
        };
        Ok(serde_json::to_vec(&doc)?)
    }

    pub(crate) fn token(&self, kind: Category, namespace: &str, original: &str) -> Option<&str> {
        let key = (kind, namespace.to_string(), original.to_string());
        self.index
            .get(&key)
            .map(|&slot| self.entries[slot].token.as_str())
    }

    /// Insert unless the key exists. Returns whether it was inserted.
    pub(crate) fn insert(&mut self, entry: MappingEntry) -> bool {
        let key = (entry.kind, entry.namespace.clone(), entry.original.clone());
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key, self.entries.len());
        self.entries.push(entry);
        true
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &MappingEntry> {
        self.entries.iter()
    }

    pub(crate) fn in_namespace<'a, 'n>(
        &'a self,
        namespace: &'n str,
    ) -> impl Iterator<Item = &'a MappingEntry> + use<'a, 'n> {
        self.entries.iter().filter(move |e| e.namespace == namespace)
    }

    pub(crate) fn namespaces(&self) -> BTreeSet<String> {
        self.entries.iter().map(|e| e.namespace.clone()).collect()
    }

    /// Drop every entry of `namespace`, returning how many were removed.
    pub(crate) fn remove_namespace(&mut self, namespace: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.namespace != namespace);
        let removed = before - self.entries.len();
        if removed > 0 {
            self.reindex();
        }
        removed
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    fn reindex(&mut self) {
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(slot, e)| ((e.kind, e.namespace.clone(), e.original.clone()), slot))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(kind: Category, ns: &str, original: &str, token: &str) -> MappingEntry {
        MappingEntry {
            kind,
            namespace: ns.to_string(),
            original: original.to_string(),
            token: token.to_string(),
        }
    }

    #[test]
    fn first_insert_wins() {
        let mut set = RecordSet::default();
        assert!(set.insert(entry(Category::Word, "a", "cat", "MASKWORD_1")));
        assert!(!set.insert(entry(Category::Word, "a", "cat", "MASKWORD_2")));
        assert_eq!(set.token(Category::Word, "a", "cat"), Some("MASKWORD_1"));
        assert_eq!(set.token(Category::Ident, "a", "cat"), None);
    }

    #[test]
    fn json_keeps_order_and_categories() {
        let mut set = RecordSet::default();
        set.insert(entry(Category::Email, "b", "x@y.io", "a@b.cd"));
        set.insert(entry(Category::Ident, "a", "foo", "vBar"));
        let json = set.to_json().unwrap();
        let text = String::from_utf8(json.clone()).unwrap();
        assert!(text.contains("\"EMAIL\""));

        let back = RecordSet::from_json(&json).unwrap();
        assert_eq!(back.iter().map(|e| e.original.as_str()).collect::<Vec<_>>(), ["x@y.io", "foo"]);
        assert_eq!(back.namespaces().into_iter().collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn namespace_entries_outlive_the_query_string() {
        let mut set = RecordSet::default();
        set.insert(entry(Category::Num, "a", "42", "74"));
        set.insert(entry(Category::Num, "b", "7", "3"));

        let found = {
            let namespace = String::from("a");
            let mut entries = set.in_namespace(&namespace);
            entries.next()
        };
        assert_eq!(found.map(|e| e.token.as_str()), Some("74"));
    }

    #[test]
    fn remove_namespace_reindexes() {
        let mut set = RecordSet::default();
        set.insert(entry(Category::Word, "a", "one", "t1"));
        set.insert(entry(Category::Word, "b", "two", "t2"));
        set.insert(entry(Category::Word, "a", "three", "t3"));
        assert_eq!(set.remove_namespace("a"), 2);
        assert_eq!(set.remove_namespace("a"), 0);
        assert_eq!(set.token(Category::Word, "b", "two"), Some("t2"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn rejects_unknown_version() {
        assert!(RecordSet::from_json(br#"{"version":9,"entries":[]}"#).is_err());
        assert!(RecordSet::from_json(b"not json").is_err());
    }
}
