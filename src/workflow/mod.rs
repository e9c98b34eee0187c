//! Wizards that drive the workflow stores.
//!
//! The court-index wizard moves one PDF through upload, AI indexing and
//! download. The deduplication wizard moves a spreadsheet through upload,
//! configuration, processing and export.

pub mod court_index;
pub mod dedup;

use std::io;

use thiserror::Error;

use crate::api::ApiError;
use crate::dedup::SpreadsheetError;

/// Errors raised while a wizard runs.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("No document selected")]
    NoDocument,
    #[error("No file found")]
    NoFile,
    #[error("{0}")]
    Precondition(&'static str),
    #[error("Failed to read or write file: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Invalid document payload: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error(transparent)]
    Spreadsheet(#[from] SpreadsheetError),
}
