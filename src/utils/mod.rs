//! Shared utility functions.
//!
//! - `ids`: document, case and record identifiers
//! - `format`: human-readable sizes
//! - `mime`: upload type checks by extension and magic bytes

mod format;
mod ids;
mod mime;

pub use format::format_size;
pub use ids::{generate_case_id, generate_document_id, generate_id};
pub use mime::{detect_mime, extension_of, FileKind};
