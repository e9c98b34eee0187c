//! Truverizen - document processing workflows and platform administration.
//!
//! Court-index AI indexing, master spreadsheet deduplication, processing
//! history and user/company administration against the Truverizen backend.

pub mod api;
pub mod cli;
pub mod config;
pub mod dedup;
pub mod models;
pub mod routes;
pub mod session;
pub mod workspace;
pub mod store;
pub mod utils;
pub mod workflow;
