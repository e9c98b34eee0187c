//! Court-index workflow store.

use tracing::debug;

use crate::models::{CourtIndexDocument, DocumentUpdate};

/// Tracks the in-flight court document and the session's upload history.
#[derive(Debug, Default, Clone)]
pub struct CourtIndexStore {
    current: Option<CourtIndexDocument>,
    documents: Vec<CourtIndexDocument>,
}

impl CourtIndexStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the active document.
    pub fn set_current_document(&mut self, doc: CourtIndexDocument) {
        debug!("Current court-index document: {}", doc.id);
        self.current = Some(doc);
    }

    /// Append a document to the session history. No dedup key.
    pub fn add_document(&mut self, doc: CourtIndexDocument) {
        self.documents.push(doc);
    }

    /// Merge `update` into every history entry with `id` and into the
    /// current document when its id matches.
    pub fn update_document(&mut self, id: &str, update: &DocumentUpdate) {
        for doc in self.documents.iter_mut().filter(|d| d.id == id) {
            doc.apply(update);
        }
        if let Some(current) = self.current.as_mut().filter(|d| d.id == id) {
            current.apply(update);
        }
    }

    /// Drop the active document; history is untouched.
    pub fn clear_current(&mut self) {
        self.current = None;
    }

    pub fn current_document(&self) -> Option<&CourtIndexDocument> {
        self.current.as_ref()
    }

    pub fn documents(&self) -> &[CourtIndexDocument] {
        &self.documents
    }

    pub fn find(&self, id: &str) -> Option<&CourtIndexDocument> {
        self.documents.iter().find(|d| d.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentStatus;

    fn doc(id: &str) -> CourtIndexDocument {
        CourtIndexDocument::new(id.into(), "TRV-00000000-AAAA".into(), "a.pdf".into(), None)
    }

    #[test]
    fn test_update_reaches_history_and_current() {
        let mut store = CourtIndexStore::new();
        store.set_current_document(doc("d1"));
        store.add_document(doc("d1"));

        store.update_document("d1", &DocumentUpdate::failed("No file found"));

        assert_eq!(store.current_document().unwrap().status, DocumentStatus::Failed);
        let stored = store.find("d1").unwrap();
        assert_eq!(stored.status, DocumentStatus::Failed);
        assert_eq!(stored.error.as_deref(), Some("No file found"));
    }

    #[test]
    fn test_update_other_id_leaves_current() {
        let mut store = CourtIndexStore::new();
        store.set_current_document(doc("d1"));
        store.add_document(doc("d2"));

        store.update_document("d2", &DocumentUpdate::failed("x"));

        assert_eq!(
            store.current_document().unwrap().status,
            DocumentStatus::Processing
        );
        assert_eq!(store.find("d2").unwrap().status, DocumentStatus::Failed);
    }

    #[test]
    fn test_clear_current_keeps_history() {
        let mut store = CourtIndexStore::new();
        store.set_current_document(doc("d1"));
        store.add_document(doc("d1"));
        store.add_document(doc("d1"));
        store.clear_current();

        assert!(store.current_document().is_none());
        assert_eq!(store.documents().len(), 2);
    }
}
