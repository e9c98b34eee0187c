//! Court-index document models.
//!
//! A document is created on upload, mutated in place while it is being
//! indexed and lives only for the session.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Processing status of a court-index document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Processing,
    Completed,
    Failed,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// One row of a generated court index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub section: String,
    pub description: String,
    pub page: u32,
}

/// Structured index attached to a processed document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexData {
    pub entries: Vec<IndexEntry>,
    pub remarks: Option<String>,
}

/// The uploaded file backing a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFile {
    pub path: PathBuf,
    pub size: u64,
}

/// A court document moving through upload, indexing and download.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourtIndexDocument {
    pub id: String,
    pub case_id: String,
    pub file_name: String,
    pub upload_date: DateTime<Utc>,
    pub status: DocumentStatus,
    pub page_count: Option<u32>,
    pub index_data: Option<IndexData>,
    pub file: Option<DocumentFile>,
    pub original_base64: Option<String>,
    pub processed_base64: Option<String>,
    pub error: Option<String>,
}

impl CourtIndexDocument {
    /// A freshly uploaded document, ready for processing.
    pub fn new(id: String, case_id: String, file_name: String, file: Option<DocumentFile>) -> Self {
        Self {
            id,
            case_id,
            file_name,
            upload_date: Utc::now(),
            status: DocumentStatus::Processing,
            page_count: None,
            index_data: None,
            file,
            original_base64: None,
            processed_base64: None,
            error: None,
        }
    }

    /// Merge the `Some` fields of `update` into this document.
    pub fn apply(&mut self, update: &DocumentUpdate) {
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(page_count) = update.page_count {
            self.page_count = Some(page_count);
        }
        if let Some(ref index_data) = update.index_data {
            self.index_data = Some(index_data.clone());
        }
        if let Some(ref original) = update.original_base64 {
            self.original_base64 = Some(original.clone());
        }
        if let Some(ref processed) = update.processed_base64 {
            self.processed_base64 = Some(processed.clone());
        }
        if let Some(ref error) = update.error {
            self.error = Some(error.clone());
        }
    }

    /// Filename for the indexed output: `{case_id}_indexed_{file_name}`.
    pub fn processed_file_name(&self) -> String {
        format!("{}_indexed_{}", self.case_id, self.file_name)
    }

    /// Filename for the exported index table.
    pub fn index_csv_file_name(&self) -> String {
        format!("{}_index.csv", self.case_id)
    }

    pub fn index_entries(&self) -> &[IndexEntry] {
        self.index_data
            .as_ref()
            .map(|d| d.entries.as_slice())
            .unwrap_or(&[])
    }
}

/// Partial update for a [`CourtIndexDocument`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentUpdate {
    pub status: Option<DocumentStatus>,
    pub page_count: Option<u32>,
    pub index_data: Option<IndexData>,
    pub original_base64: Option<String>,
    pub processed_base64: Option<String>,
    pub error: Option<String>,
}

impl DocumentUpdate {
    /// Mark a document failed with the given message.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: Some(DocumentStatus::Failed),
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> CourtIndexDocument {
        CourtIndexDocument::new(
            "DOC-1".into(),
            "TRV-12345678-ABCD".into(),
            "brief.pdf".into(),
            None,
        )
    }

    #[test]
    fn test_apply_merges_only_set_fields() {
        let mut d = doc();
        d.page_count = Some(12);
        d.apply(&DocumentUpdate {
            status: Some(DocumentStatus::Completed),
            processed_base64: Some("QQ==".into()),
            ..Default::default()
        });
        assert_eq!(d.status, DocumentStatus::Completed);
        assert_eq!(d.processed_base64.as_deref(), Some("QQ=="));
        assert_eq!(d.page_count, Some(12));
        assert_eq!(d.error, None);
    }

    #[test]
    fn test_failed_update() {
        let mut d = doc();
        d.apply(&DocumentUpdate::failed("boom"));
        assert_eq!(d.status, DocumentStatus::Failed);
        assert_eq!(d.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_output_file_names() {
        let d = doc();
        assert_eq!(d.processed_file_name(), "TRV-12345678-ABCD_indexed_brief.pdf");
        assert_eq!(d.index_csv_file_name(), "TRV-12345678-ABCD_index.csv");
        assert!(d.index_entries().is_empty());
    }
}
