//! Master-deduplication models: parsed spreadsheet data and the
//! user-authored matching configuration.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Empty,
}

impl CellValue {
    /// Parse a raw text cell, recognising numbers the way spreadsheet
    /// readers do.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return CellValue::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => CellValue::Number(n),
            _ => CellValue::Text(raw.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, CellValue::Number(_))
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CellValue::Empty => Ok(()),
        }
    }
}

/// A parsed data row: column name to cell. Empty cells are absent.
pub type Row = BTreeMap<String, CellValue>;

/// Detected column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Number,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

/// Shape of an uploaded dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub rows: usize,
    pub columns: usize,
}

/// Handle on the uploaded spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
}

impl UploadedFile {
    /// File name without its extension, used to name exports.
    pub fn stem(&self) -> &str {
        match self.name.rfind('.') {
            Some(idx) if idx > 0 => &self.name[..idx],
            _ => &self.name,
        }
    }
}

/// Substring filter on one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterValue {
    pub column: String,
    pub value: String,
}

/// A column compared when looking for duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchColumn {
    pub column: String,
    pub enabled: bool,
}

/// A column kept in the deduplicated output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputColumn {
    pub column: String,
    pub enabled: bool,
}

/// A keyword pair that must never be treated as the same record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictRule {
    pub id: String,
    pub left_term: String,
    pub right_term: String,
}

/// Whether the live configuration matches a saved one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfigurationStatus {
    #[default]
    Draft,
    Saved,
    AutoLoaded,
}

impl ConfigurationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Saved => "saved",
            Self::AutoLoaded => "auto-loaded",
        }
    }
}

/// Named snapshot of a deduplication configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedConfiguration {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub auto_apply: bool,
    #[serde(default)]
    pub filters: Vec<FilterValue>,
    #[serde(default)]
    pub match_columns: Vec<MatchColumn>,
    #[serde(default)]
    pub output_columns: Vec<OutputColumn>,
    #[serde(default)]
    pub conflict_rules: Vec<ConflictRule>,
    pub similarity_threshold: f64,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_parse() {
        assert_eq!(CellValue::parse("42"), CellValue::Number(42.0));
        assert_eq!(CellValue::parse(" 3.5 "), CellValue::Number(3.5));
        assert_eq!(CellValue::parse("   "), CellValue::Empty);
        assert_eq!(CellValue::parse("Acme"), CellValue::Text("Acme".into()));
        assert_eq!(CellValue::parse("NaN"), CellValue::Text("NaN".into()));
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(CellValue::Number(42.0).to_string(), "42");
        assert_eq!(CellValue::Number(2.25).to_string(), "2.25");
        assert_eq!(CellValue::Bool(true).to_string(), "TRUE");
        assert_eq!(CellValue::Empty.to_string(), "");
    }

    #[test]
    fn test_uploaded_file_stem() {
        let file = UploadedFile {
            name: "customers.2024.xlsx".into(),
            path: PathBuf::from("customers.2024.xlsx"),
            size: 10,
        };
        assert_eq!(file.stem(), "customers.2024");
    }

    #[test]
    fn test_status_serializes_kebab() {
        let json = serde_json::to_string(&ConfigurationStatus::AutoLoaded).unwrap();
        assert_eq!(json, "\"auto-loaded\"");
    }
}
