//! Client-side workflow stores.
//!
//! Each store is a plain owned value with action methods. Commands own
//! the stores they drive; only the auth session and saved deduplication
//! configurations are persisted between runs.

mod auth;
mod court_index;
mod master_dedup;
mod persist;
mod ui;

pub use auth::AuthStore;
pub use court_index::CourtIndexStore;
pub use master_dedup::{MasterDedupStore, DEFAULT_SIMILARITY_THRESHOLD};
pub use persist::{read_json, write_json, StoreError};
pub use ui::{AppStore, SidebarStore, NARROW_TERMINAL_COLUMNS};
