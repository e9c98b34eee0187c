//! AI indexing: base64 transport helpers and the indexer seam.

use std::path::Path;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::{ApiClient, ApiError};

/// A service that turns a base64 document into its indexed counterpart.
#[async_trait]
pub trait DocumentIndexer: Send + Sync {
    /// Index a base64-encoded document, returning the processed document as base64.
    async fn index_document(&self, base64: &str) -> Result<String, ApiError>;
}

#[async_trait]
impl DocumentIndexer for ApiClient {
    async fn index_document(&self, base64: &str) -> Result<String, ApiError> {
        self.process_document(base64).await
    }
}

/// Encode raw bytes for JSON transport.
pub fn encode_payload(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode a base64 payload, tolerating a `data:...;base64,` prefix.
pub fn decode_payload(payload: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let data = match payload.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => payload,
    };
    STANDARD.decode(data.trim())
}

/// Read a file and encode its content.
pub async fn encode_file(path: &Path) -> std::io::Result<String> {
    let bytes = tokio::fs::read(path).await?;
    Ok(encode_payload(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_strips_data_url_prefix() {
        let encoded = encode_payload(b"%PDF-1.7");
        let with_prefix = format!("data:application/pdf;base64,{}", encoded);
        assert_eq!(decode_payload(&with_prefix).unwrap(), b"%PDF-1.7");
        assert_eq!(decode_payload(&encoded).unwrap(), b"%PDF-1.7");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_payload("not*base64").is_err());
    }

    #[tokio::test]
    async fn test_encode_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, b"hello").unwrap();
        assert_eq!(encode_file(&path).await.unwrap(), "aGVsbG8=");
    }
}
