//! Identifier generation.

use chrono::Utc;
use uuid::Uuid;

const SUFFIX_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Opaque unique id for records such as conflict rules and saved
/// configurations.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Id for an uploaded court document: `DOC-{millis}-{short uuid}`.
pub fn generate_document_id() -> String {
    let simple = Uuid::new_v4().simple().to_string();
    format!("DOC-{}-{}", Utc::now().timestamp_millis(), &simple[..7])
}

/// Human-facing case id: `TRV-{last 8 digits of millis}-{4 chars}`.
pub fn generate_case_id() -> String {
    let millis = Utc::now().timestamp_millis().to_string();
    let tail = &millis[millis.len().saturating_sub(8)..];
    let suffix: String = Uuid::new_v4()
        .as_bytes()
        .iter()
        .take(4)
        .map(|b| SUFFIX_CHARS[*b as usize % SUFFIX_CHARS.len()] as char)
        .collect();
    format!("TRV-{}-{}", tail, suffix)
}
