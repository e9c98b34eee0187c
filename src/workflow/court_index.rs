//! Court-index wizard: upload, processing, result and download.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::bytes::Regex;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::WorkflowError;
use crate::api::{decode_payload, encode_file, DocumentIndexer};
use crate::models::{
    CourtIndexDocument, DocumentFile, DocumentStatus, DocumentUpdate, IndexData, IndexEntry,
};
use crate::store::CourtIndexStore;
use crate::utils::{detect_mime, format_size, generate_case_id, generate_document_id, FileKind};

/// Largest accepted court document.
pub const MAX_DOCUMENT_BYTES: u64 = 50 * 1024 * 1024;

/// Remark attached to every successfully indexed document.
pub const SUCCESS_REMARK: &str = "Document processed successfully";

static PAGE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/Type\s*/Page[^s]").unwrap());

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Please upload a PDF file")]
    NotPdf,
    #[error("File size exceeds 50MB limit ({0})")]
    TooLarge(String),
    #[error("File is empty")]
    Empty,
    #[error("Error reading file: {0}")]
    Io(#[from] io::Error),
}

/// Count page objects in a PDF body. Returns `None` when none are found,
/// e.g. for compressed object streams.
pub fn estimate_page_count(bytes: &[u8]) -> Option<u32> {
    let count = PAGE_PATTERN.find_iter(bytes).count();
    (count > 0).then_some(count as u32)
}

/// Validate a PDF upload and make it the current document.
///
/// Nothing is written to the store unless validation passes.
pub async fn upload(
    store: &mut CourtIndexStore,
    path: &Path,
) -> Result<CourtIndexDocument, UploadError> {
    if FileKind::from_path(path) != FileKind::Pdf {
        return Err(UploadError::NotPdf);
    }
    let size = tokio::fs::metadata(path).await?.len();
    if size == 0 {
        return Err(UploadError::Empty);
    }
    if size > MAX_DOCUMENT_BYTES {
        return Err(UploadError::TooLarge(format_size(size)));
    }

    let bytes = tokio::fs::read(path).await?;
    if detect_mime(&bytes) != Some("application/pdf") {
        warn!("{} has a .pdf extension but is not a PDF", path.display());
        return Err(UploadError::NotPdf);
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut doc = CourtIndexDocument::new(
        generate_document_id(),
        generate_case_id(),
        file_name,
        Some(DocumentFile {
            path: path.to_path_buf(),
            size,
        }),
    );
    doc.page_count = estimate_page_count(&bytes);

    info!(
        "Uploaded {} as case {} ({})",
        doc.file_name,
        doc.case_id,
        format_size(size)
    );
    store.add_document(doc.clone());
    store.set_current_document(doc.clone());
    Ok(doc)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepId {
    Upload,
    Ocr,
    Index,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl StepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingStep {
    pub id: StepId,
    pub label: &'static str,
    pub status: StepStatus,
}

/// Overall state of a processing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// Step list and progress percentage shown while a document is indexed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingTracker {
    steps: [ProcessingStep; 3],
    progress: u8,
}

impl Default for ProcessingTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingTracker {
    /// The upload step is already complete when processing begins.
    pub fn new() -> Self {
        Self {
            steps: [
                ProcessingStep {
                    id: StepId::Upload,
                    label: "File Upload",
                    status: StepStatus::Completed,
                },
                ProcessingStep {
                    id: StepId::Ocr,
                    label: "Text Extraction",
                    status: StepStatus::Pending,
                },
                ProcessingStep {
                    id: StepId::Index,
                    label: "AI Indexing",
                    status: StepStatus::Pending,
                },
            ],
            progress: 0,
        }
    }

    fn set(&mut self, id: StepId, status: StepStatus) {
        if let Some(step) = self.steps.iter_mut().find(|s| s.id == id) {
            step.status = status;
        }
    }

    pub fn begin(&mut self, id: StepId) {
        self.set(id, StepStatus::Processing);
    }

    pub fn complete(&mut self, id: StepId) {
        self.set(id, StepStatus::Completed);
    }

    /// Mark whichever step is running as failed.
    pub fn fail_active(&mut self) {
        for step in self.steps.iter_mut() {
            if step.status == StepStatus::Processing {
                step.status = StepStatus::Failed;
            }
        }
    }

    pub fn set_progress(&mut self, progress: u8) {
        self.progress = progress.min(100);
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn steps(&self) -> &[ProcessingStep] {
        &self.steps
    }

    pub fn phase(&self) -> Phase {
        if self.steps.iter().any(|s| s.status == StepStatus::Failed) {
            Phase::Failed
        } else if self.steps.iter().all(|s| s.status == StepStatus::Completed) {
            Phase::Completed
        } else if self.steps.iter().any(|s| s.status == StepStatus::Processing) {
            Phase::Processing
        } else {
            Phase::Pending
        }
    }
}

async fn run_steps<I, F>(
    file: &DocumentFile,
    indexer: &I,
    tracker: &mut ProcessingTracker,
    observe: &mut F,
) -> Result<(String, String), WorkflowError>
where
    I: DocumentIndexer + ?Sized,
    F: FnMut(&ProcessingTracker),
{
    tracker.begin(StepId::Ocr);
    tracker.set_progress(10);
    observe(tracker);

    let original = encode_file(&file.path).await?;
    tracker.set_progress(30);
    observe(tracker);

    tracker.complete(StepId::Ocr);
    tracker.begin(StepId::Index);
    tracker.set_progress(50);
    observe(tracker);

    let processed = indexer.index_document(&original).await?;
    tracker.set_progress(90);
    observe(tracker);

    tracker.complete(StepId::Index);
    tracker.set_progress(100);
    observe(tracker);

    Ok((original, processed))
}

/// Index the current document.
///
/// Progress is reported through `observe` after every step change. On
/// failure the running step is marked failed and the document records
/// the error; there is no retry.
pub async fn process_current<I, F>(
    store: &mut CourtIndexStore,
    indexer: &I,
    mut observe: F,
) -> Result<CourtIndexDocument, WorkflowError>
where
    I: DocumentIndexer + ?Sized,
    F: FnMut(&ProcessingTracker),
{
    let doc = store
        .current_document()
        .cloned()
        .ok_or(WorkflowError::NoDocument)?;

    let Some(file) = doc.file.clone() else {
        warn!("Document {} has no file attached", doc.id);
        store.update_document(&doc.id, &DocumentUpdate::failed("No file found"));
        return Err(WorkflowError::NoFile);
    };

    let mut tracker = ProcessingTracker::new();
    match run_steps(&file, indexer, &mut tracker, &mut observe).await {
        Ok((original, processed)) => {
            store.update_document(
                &doc.id,
                &DocumentUpdate {
                    status: Some(DocumentStatus::Completed),
                    original_base64: Some(original),
                    processed_base64: Some(processed),
                    index_data: Some(IndexData {
                        entries: Vec::new(),
                        remarks: Some(SUCCESS_REMARK.to_string()),
                    }),
                    ..Default::default()
                },
            );
            info!("Indexed {} ({})", doc.file_name, doc.case_id);
        }
        Err(e) => {
            tracker.fail_active();
            observe(&tracker);
            warn!("Processing {} failed: {}", doc.id, e);
            store.update_document(&doc.id, &DocumentUpdate::failed(e.to_string()));
            return Err(e);
        }
    }

    store
        .current_document()
        .cloned()
        .ok_or(WorkflowError::NoDocument)
}

/// Render index entries as CSV: a bare header row, then fully quoted cells.
pub fn index_csv(entries: &[IndexEntry]) -> String {
    let quote = |s: &str| format!("\"{}\"", s.replace('"', "\"\""));
    let mut lines = vec!["Section,Description,Page".to_string()];
    lines.extend(entries.iter().map(|e| {
        [
            quote(&e.section),
            quote(&e.description),
            quote(&e.page.to_string()),
        ]
        .join(",")
    }));
    lines.join("\n")
}

fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf, WorkflowError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(name);
    fs::write(&path, bytes)?;
    debug!("Wrote {}", path.display());
    Ok(path)
}

/// Save the indexed PDF as `{case_id}_indexed_{file_name}`.
pub fn download_processed(doc: &CourtIndexDocument, dir: &Path) -> Result<PathBuf, WorkflowError> {
    let payload = doc
        .processed_base64
        .as_deref()
        .ok_or(WorkflowError::Precondition("No processed document available"))?;
    write_file(dir, &doc.processed_file_name(), &decode_payload(payload)?)
}

/// Save the original PDF under its uploaded name.
pub fn download_original(doc: &CourtIndexDocument, dir: &Path) -> Result<PathBuf, WorkflowError> {
    let payload = doc
        .original_base64
        .as_deref()
        .ok_or(WorkflowError::Precondition("No original document available"))?;
    write_file(dir, &doc.file_name, &decode_payload(payload)?)
}

/// Save the index table as `{case_id}_index.csv`.
pub fn download_index_csv(doc: &CourtIndexDocument, dir: &Path) -> Result<PathBuf, WorkflowError> {
    let entries = doc.index_entries();
    if entries.is_empty() {
        return Err(WorkflowError::Precondition("No index entries to export"));
    }
    write_file(dir, &doc.index_csv_file_name(), index_csv(entries).as_bytes())
}

/// Attempt every download; each result stands alone.
pub fn download_all(
    doc: &CourtIndexDocument,
    dir: &Path,
) -> Vec<Result<PathBuf, WorkflowError>> {
    vec![
        download_processed(doc, dir),
        download_original(doc, dir),
        download_index_csv(doc, dir),
    ]
}
