//! In-memory document store.
//!
//! Append-only while a load is in progress, read-only once
//! [`mark_loaded`](DocumentStore::mark_loaded) has been called. There is no
//! update or delete. A store that never reached the loaded state answers
//! every search with nothing.

use crate::models::Document;

#[derive(Debug, Default)]
pub struct DocumentStore {
    docs: Vec<Document>,
    loaded: bool,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a document. Ignored once the store is loaded.
    pub(crate) fn push(&mut self, doc: Document) -> bool {
        if self.loaded {
            tracing::warn!(file = %doc.file, "store is sealed, document ignored");
            return false;
        }
        self.docs.push(doc);
        true
    }

    pub(crate) fn mark_loaded(&mut self) {
        self.loaded = true;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn contains(&self, file: &str) -> bool {
        self.docs.iter().any(|d| d.file == file)
    }

    pub fn get(&self, file: &str) -> Option<&Document> {
        self.docs.iter().find(|d| d.file == file)
    }

    /// Documents in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.docs.iter()
    }

    /// Build a loaded store directly from documents.
    pub fn from_documents(docs: Vec<Document>) -> Self {
        Self { docs, loaded: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategorySet, Language};

    fn doc(file: &str) -> Document {
        Document {
            file: file.to_string(),
            url: format!("txt/{}", file),
            text: String::new(),
            lang: Language::Pt,
            cats: CategorySet::new(),
        }
    }

    #[test]
    fn sealed_after_load() {
        let mut store = DocumentStore::new();
        assert!(!store.is_loaded());
        assert!(store.push(doc("a")));
        store.mark_loaded();
        assert!(!store.push(doc("b")));
        assert_eq!(store.len(), 1);
        assert!(store.contains("a"));
        assert!(store.get("b").is_none());
    }

    #[test]
    fn keeps_insertion_order() {
        let store = DocumentStore::from_documents(vec![doc("z"), doc("a"), doc("m")]);
        let files: Vec<_> = store.iter().map(|d| d.file.as_str()).collect();
        assert_eq!(files, vec!["z", "a", "m"]);
    }
}
