//! Processing history as shown to users.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::ApiHistoryItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HistoryStatus {
    Completed,
    Processing,
    Failed,
}

impl HistoryStatus {
    /// Map free-form backend status text onto a history status.
    pub fn from_api(status: Option<&str>) -> Self {
        let lower = status.unwrap_or_default().to_lowercase();
        if lower.contains("completed") || lower.contains("success") {
            Self::Completed
        } else if lower.contains("fail") || lower.contains("error") {
            Self::Failed
        } else {
            Self::Processing
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Processing => "processing",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: String,
    pub tool: String,
    pub document_name: String,
    pub processed_time: String,
    pub status: HistoryStatus,
    pub original_document: String,
    pub processed_document: String,
}

impl From<ApiHistoryItem> for HistoryItem {
    fn from(api: ApiHistoryItem) -> Self {
        let status = HistoryStatus::from_api(api.status.as_deref());
        let document_name = api
            .document_name
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "Untitled".to_string());
        Self {
            id: api.id,
            tool: api
                .tool
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "Unknown Tool".to_string()),
            processed_time: api
                .processed_time
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| Utc::now().to_rfc3339()),
            status,
            original_document: document_name.clone(),
            processed_document: format!("processed_{}", document_name),
            document_name,
        }
    }
}

impl HistoryItem {
    fn parsed_time(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.processed_time)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                chrono::NaiveDateTime::parse_from_str(&self.processed_time, "%Y-%m-%d %H:%M:%S")
                    .ok()
                    .map(|n| n.and_utc())
            })
    }

    /// Processed time formatted for display; unparseable values pass through.
    pub fn display_time(&self) -> String {
        self.parsed_time()
            .map(|dt| dt.format("%d/%m/%Y, %H:%M").to_string())
            .unwrap_or_else(|| self.processed_time.clone())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SortBy {
    #[default]
    Date,
    Name,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Search, filter and sort options for the history list.
#[derive(Debug, Clone, Default)]
pub struct HistoryQuery {
    pub search: Option<String>,
    pub tool: Option<String>,
    pub status: Option<HistoryStatus>,
    pub sort_by: SortBy,
    pub order: SortOrder,
}

impl HistoryQuery {
    pub fn apply<'a>(&self, items: &'a [HistoryItem]) -> Vec<&'a HistoryItem> {
        let search = self.search.as_ref().map(|s| s.to_lowercase());
        let mut out: Vec<&HistoryItem> = items
            .iter()
            .filter(|item| {
                search.as_ref().map_or(true, |q| {
                    item.document_name.to_lowercase().contains(q)
                        || item.tool.to_lowercase().contains(q)
                })
            })
            .filter(|item| {
                self.tool
                    .as_ref()
                    .map_or(true, |t| item.tool.eq_ignore_ascii_case(t))
            })
            .filter(|item| self.status.map_or(true, |s| item.status == s))
            .collect();

        out.sort_by(|a, b| {
            let ord = match self.sort_by {
                SortBy::Date => compare_times(a, b),
                SortBy::Name => a.document_name.cmp(&b.document_name),
            };
            match self.order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });
        out
    }
}

fn compare_times(a: &HistoryItem, b: &HistoryItem) -> Ordering {
    match (a.parsed_time(), b.parsed_time()) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => a.processed_time.cmp(&b.processed_time),
    }
}

/// Completed/failed totals over a history list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryTotals {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
}

impl HistoryTotals {
    pub fn from_items(items: &[HistoryItem]) -> Self {
        Self {
            total: items.len(),
            completed: items
                .iter()
                .filter(|i| i.status == HistoryStatus::Completed)
                .count(),
            failed: items
                .iter()
                .filter(|i| i.status == HistoryStatus::Failed)
                .count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, tool: &str, name: &str, time: &str, status: &str) -> HistoryItem {
        HistoryItem::from(ApiHistoryItem {
            id: id.into(),
            tool: Some(tool.into()),
            document_name: Some(name.into()),
            processed_time: Some(time.into()),
            status: Some(status.into()),
            original_document: None,
            processed_document: None,
        })
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(HistoryStatus::from_api(Some("Completed")), HistoryStatus::Completed);
        assert_eq!(HistoryStatus::from_api(Some("SUCCESS")), HistoryStatus::Completed);
        assert_eq!(HistoryStatus::from_api(Some("Failed")), HistoryStatus::Failed);
        assert_eq!(HistoryStatus::from_api(Some("server error")), HistoryStatus::Failed);
        assert_eq!(HistoryStatus::from_api(Some("queued")), HistoryStatus::Processing);
        assert_eq!(HistoryStatus::from_api(None), HistoryStatus::Processing);
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let item = HistoryItem::from(ApiHistoryItem {
            id: "9".into(),
            tool: None,
            document_name: None,
            processed_time: None,
            status: None,
            original_document: None,
            processed_document: None,
        });
        assert_eq!(item.tool, "Unknown Tool");
        assert_eq!(item.document_name, "Untitled");
        assert_eq!(item.processed_document, "processed_Untitled");
    }

    #[test]
    fn test_query_filters_and_sorts() {
        let items = vec![
            item("1", "Court Index", "b.pdf", "2025-01-02T10:00:00Z", "completed"),
            item("2", "Master Dedup", "a.csv", "2025-01-03T10:00:00Z", "failed"),
            item("3", "Court Index", "c.pdf", "2025-01-01T10:00:00Z", "completed"),
        ];

        let query = HistoryQuery {
            tool: Some("court index".into()),
            ..Default::default()
        };
        let ids: Vec<_> = query.apply(&items).iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);

        let query = HistoryQuery {
            sort_by: SortBy::Name,
            order: SortOrder::Asc,
            ..Default::default()
        };
        let ids: Vec<_> = query.apply(&items).iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1", "3"]);

        let query = HistoryQuery {
            search: Some("DEDUP".into()),
            ..Default::default()
        };
        assert_eq!(query.apply(&items).len(), 1);

        let totals = HistoryTotals::from_items(&items);
        assert_eq!(totals.completed, 2);
        assert_eq!(totals.failed, 1);
    }

    #[test]
    fn test_display_time_passthrough() {
        let i = item("1", "t", "n", "yesterday", "completed");
        assert_eq!(i.display_time(), "yesterday");
        let i = item("1", "t", "n", "2025-03-04 05:06:07", "completed");
        assert_eq!(i.display_time(), "04/03/2025, 05:06");
    }
}
