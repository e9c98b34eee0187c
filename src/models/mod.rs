//! Data models for Truverizen.

mod dedup;
mod document;
mod history;
mod user;

pub use dedup::{
    CellValue, ColumnInfo, ColumnType, ConfigurationStatus, ConflictRule, FileMetadata,
    FilterValue, MatchColumn, OutputColumn, Row, SavedConfiguration, UploadedFile,
};
pub use document::{CourtIndexDocument, DocumentFile, DocumentStatus, DocumentUpdate, IndexData, IndexEntry};
pub use history::{HistoryItem, HistoryQuery, HistoryStatus, HistoryTotals, SortBy, SortOrder};
pub use user::{AccountRole, Company, CompanyStatus, Role, SessionUser, User, UserStatus};
