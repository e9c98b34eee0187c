//! Court-index wizard against a mocked indexing backend.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use truverizen::api::{encode_payload, ApiClient};
use truverizen::models::DocumentStatus;
use truverizen::store::CourtIndexStore;
use truverizen::workflow::court_index::{self, Phase, UploadError};

const PDF: &[u8] = b"%PDF-1.5\n1 0 obj << /Type /Page >>\n%%EOF\n";

fn write_pdf(dir: &Path) -> PathBuf {
    let path = dir.join("writ-petition.pdf");
    fs::write(&path, PDF).unwrap();
    path
}

#[tokio::test]
async fn upload_process_and_download() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/get_ai_indexing_processed"))
        .and(body_json(json!({"base_64": encode_payload(PDF)})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "processed_base64": encode_payload(b"%PDF-1.5 indexed")
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let api = ApiClient::new(&server.uri(), Duration::from_secs(5)).unwrap();
    let mut store = CourtIndexStore::new();

    let uploaded = court_index::upload(&mut store, &write_pdf(dir.path()))
        .await
        .unwrap();
    assert_eq!(uploaded.page_count, Some(1));

    let mut progress = Vec::new();
    let doc = court_index::process_current(&mut store, &api, |t| progress.push(t.progress()))
        .await
        .unwrap();
    assert_eq!(progress.last(), Some(&100));
    assert_eq!(doc.status, DocumentStatus::Completed);
    assert_eq!(store.documents()[0].status, DocumentStatus::Completed);

    let out = dir.path().join("downloads");
    let results = court_index::download_all(&doc, &out);
    let processed = results[0].as_ref().unwrap();
    assert_eq!(
        processed.file_name().unwrap().to_string_lossy(),
        format!("{}_indexed_writ-petition.pdf", doc.case_id)
    );
    assert_eq!(fs::read(processed).unwrap(), b"%PDF-1.5 indexed");
    assert_eq!(fs::read(results[1].as_ref().unwrap()).unwrap(), PDF);
    assert_eq!(
        results[2].as_ref().unwrap_err().to_string(),
        "No index entries to export"
    );

    store.clear_current();
    assert!(store.current_document().is_none());
    assert_eq!(store.documents().len(), 1);
}

#[tokio::test]
async fn backend_error_fails_document() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/get_ai_indexing_processed"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model offline"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let api = ApiClient::new(&server.uri(), Duration::from_secs(5)).unwrap();
    let mut store = CourtIndexStore::new();
    court_index::upload(&mut store, &write_pdf(dir.path()))
        .await
        .unwrap();

    let mut phase = Phase::Pending;
    let err = court_index::process_current(&mut store, &api, |t| phase = t.phase())
        .await
        .unwrap_err();

    assert_eq!(phase, Phase::Failed);
    assert!(err.to_string().contains("HTTP 500"));
    let doc = store.current_document().unwrap();
    assert_eq!(doc.status, DocumentStatus::Failed);
    assert!(doc.error.as_deref().unwrap().contains("model offline"));
    assert!(doc.processed_base64.is_none());
}

#[tokio::test]
async fn missing_processed_payload_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/get_ai_indexing_processed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let api = ApiClient::new(&server.uri(), Duration::from_secs(5)).unwrap();
    let mut store = CourtIndexStore::new();
    court_index::upload(&mut store, &write_pdf(dir.path()))
        .await
        .unwrap();

    let err = court_index::process_current(&mut store, &api, |_| {})
        .await
        .unwrap_err();
    assert!(err.to_string().contains("processed_base64"));
}

#[tokio::test]
async fn wrong_type_never_reaches_store() {
    let dir = tempfile::tempdir().unwrap();
    let docx = dir.path().join("brief.docx");
    fs::write(&docx, b"PK\x03\x04").unwrap();

    let mut store = CourtIndexStore::new();
    let err = court_index::upload(&mut store, &docx).await.unwrap_err();
    assert!(matches!(err, UploadError::NotPdf));
    assert!(store.documents().is_empty());
}
