//! Deduplication processing.
//!
//! A pass filters the uploaded rows, drops duplicates with the selected
//! strategy and projects what is left onto the enabled output columns.

mod similarity;
pub mod spreadsheet;

pub use similarity::{find_unique, similarity};
pub use spreadsheet::{ParsedSheet, SpreadsheetError};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::{CellValue, ConflictRule, FilterValue, MatchColumn, OutputColumn, Row};
use crate::store::MasterDedupStore;

/// Share of filtered rows the simulated strategy reports as duplicates.
pub const SIMULATED_DUPLICATE_RATIO: f64 = 0.15;

/// How duplicates are identified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DedupStrategy {
    /// Drop the trailing 15% of filtered rows.
    #[default]
    Simulated,
    /// Jaro-Winkler matching across the enabled match columns.
    Similarity,
}

impl fmt::Display for DedupStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Simulated => "simulated",
            Self::Similarity => "similarity",
        })
    }
}

impl FromStr for DedupStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simulated" => Ok(Self::Simulated),
            "similarity" | "fuzzy" => Ok(Self::Similarity),
            other => Err(format!("unknown dedup strategy '{}'", other)),
        }
    }
}

/// Inputs of one processing pass.
#[derive(Debug, Clone, Copy)]
pub struct DedupRequest<'a> {
    pub rows: &'a [Row],
    pub filters: &'a [FilterValue],
    pub match_columns: &'a [MatchColumn],
    pub output_columns: &'a [OutputColumn],
    pub conflict_rules: &'a [ConflictRule],
    pub threshold: f64,
    pub strategy: DedupStrategy,
}

impl<'a> DedupRequest<'a> {
    /// Borrow the live configuration and data of `store`.
    pub fn from_store(store: &'a MasterDedupStore, strategy: DedupStrategy) -> Self {
        Self {
            rows: store.raw_data(),
            filters: store.filters(),
            match_columns: store.match_columns(),
            output_columns: store.output_columns(),
            conflict_rules: store.conflict_rules(),
            threshold: store.similarity_threshold(),
            strategy,
        }
    }

    pub fn enabled_match_columns(&self) -> Vec<&'a str> {
        self.match_columns
            .iter()
            .filter(|c| c.enabled)
            .map(|c| c.column.as_str())
            .collect()
    }

    pub fn enabled_output_columns(&self) -> Vec<&'a str> {
        enabled_output_columns(self.output_columns)
    }
}

/// Names of the enabled output columns, in configured order.
pub fn enabled_output_columns(columns: &[OutputColumn]) -> Vec<&str> {
    columns
        .iter()
        .filter(|c| c.enabled)
        .map(|c| c.column.as_str())
        .collect()
}

/// Result of a processing pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DedupOutcome {
    pub rows: Vec<Row>,
    pub duplicates: usize,
}

/// Text a cell is matched against. Zero, `false` and missing cells all
/// read as empty text.
fn filter_text(cell: Option<&CellValue>) -> String {
    match cell {
        Some(CellValue::Number(n)) if *n == 0.0 || n.is_nan() => String::new(),
        Some(CellValue::Bool(false)) | Some(CellValue::Empty) | None => String::new(),
        Some(v) => v.to_string().to_lowercase(),
    }
}

/// Keep rows whose cells contain every filter value, case-insensitively.
pub fn apply_filters<'r>(rows: &'r [Row], filters: &[FilterValue]) -> Vec<&'r Row> {
    let needles: Vec<(&str, String)> = filters
        .iter()
        .filter(|f| !f.value.is_empty())
        .map(|f| (f.column.as_str(), f.value.to_lowercase()))
        .collect();

    rows.iter()
        .filter(|row| {
            needles.iter().all(|(column, needle)| {
                filter_text(row.get(*column)).contains(needle.as_str())
            })
        })
        .collect()
}

/// Project a row onto `columns`. Every output row carries exactly these keys.
pub fn project(row: &Row, columns: &[&str]) -> Row {
    columns
        .iter()
        .map(|c| {
            (
                c.to_string(),
                row.get(*c).cloned().unwrap_or(CellValue::Empty),
            )
        })
        .collect()
}

/// Run one deduplication pass.
pub fn process(request: &DedupRequest<'_>) -> DedupOutcome {
    let filtered = apply_filters(request.rows, request.filters);
    let outputs = request.enabled_output_columns();

    let kept: Vec<&Row> = match request.strategy {
        DedupStrategy::Simulated => {
            let duplicates =
                (filtered.len() as f64 * SIMULATED_DUPLICATE_RATIO).floor() as usize;
            filtered[..filtered.len() - duplicates].to_vec()
        }
        DedupStrategy::Similarity => {
            let owned: Vec<Row> = filtered.iter().map(|r| (*r).clone()).collect();
            find_unique(
                &owned,
                &request.enabled_match_columns(),
                request.conflict_rules,
                request.threshold,
            )
            .into_iter()
            .map(|idx| filtered[idx])
            .collect()
        }
    };

    let duplicates = filtered.len() - kept.len();
    info!(
        "Dedup ({}): {} rows after filters, {} duplicates removed",
        request.strategy,
        filtered.len(),
        duplicates
    );

    DedupOutcome {
        rows: kept.into_iter().map(|r| project(r, &outputs)).collect(),
        duplicates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(n: usize) -> Vec<Row> {
        (0..n)
            .map(|i| {
                let mut r = Row::new();
                r.insert("id".into(), CellValue::Number(i as f64));
                r.insert("name".into(), CellValue::Text(format!("Name {}", i)));
                r.insert(
                    "city".into(),
                    CellValue::Text(if i % 2 == 0 { "Pune" } else { "Delhi" }.into()),
                );
                r
            })
            .collect()
    }

    fn col(name: &str) -> OutputColumn {
        OutputColumn {
            column: name.into(),
            enabled: true,
        }
    }

    fn request<'a>(
        data: &'a [Row],
        filters: &'a [FilterValue],
        outputs: &'a [OutputColumn],
    ) -> DedupRequest<'a> {
        DedupRequest {
            rows: data,
            filters,
            match_columns: &[],
            output_columns: outputs,
            conflict_rules: &[],
            threshold: 0.8,
            strategy: DedupStrategy::Simulated,
        }
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!("Similarity".parse::<DedupStrategy>(), Ok(DedupStrategy::Similarity));
        assert!("other".parse::<DedupStrategy>().is_err());
        assert_eq!(DedupStrategy::default().to_string(), "simulated");
    }

    #[test]
    fn test_filters_case_insensitive() {
        let data = rows(10);
        let filters = vec![FilterValue {
            column: "city".into(),
            value: "PUN".into(),
        }];
        assert_eq!(apply_filters(&data, &filters).len(), 5);

        let missing = vec![FilterValue {
            column: "nope".into(),
            value: "x".into(),
        }];
        assert!(apply_filters(&data, &missing).is_empty());
    }

    #[test]
    fn test_filters_treat_zero_and_false_as_empty() {
        let mut data = rows(3);
        data[0].insert("stock".into(), CellValue::Number(0.0));
        data[0].insert("active".into(), CellValue::Bool(false));
        data[1].insert("stock".into(), CellValue::Number(10.0));
        data[1].insert("active".into(), CellValue::Bool(true));

        let by = |column: &str, value: &str| {
            let filters = vec![FilterValue {
                column: column.into(),
                value: value.into(),
            }];
            apply_filters(&data, &filters)
                .iter()
                .map(|r| r["id"].to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(by("stock", "0"), vec!["1"]);
        assert!(by("active", "false").is_empty());
        assert_eq!(by("active", "true"), vec!["1"]);
    }

    #[test]
    fn test_simulated_counts() {
        let data = rows(20);
        let outputs = vec![col("name")];
        let outcome = process(&request(&data, &[], &outputs));
        assert_eq!(outcome.duplicates, 3);
        assert_eq!(outcome.rows.len(), 17);
        assert!(outcome.rows.iter().all(|r| r.len() == 1));
        assert_eq!(
            outcome.rows[0].get("name"),
            Some(&CellValue::Text("Name 0".into()))
        );
    }

    #[test]
    fn test_simulated_after_filter() {
        let data = rows(14);
        let filters = vec![FilterValue {
            column: "city".into(),
            value: "delhi".into(),
        }];
        let outputs = vec![col("id"), col("city")];
        let outcome = process(&request(&data, &filters, &outputs));
        // 7 rows survive the filter, floor(7 * 0.15) = 1
        assert_eq!(outcome.duplicates, 1);
        assert_eq!(outcome.rows.len(), 6);
    }

    #[test]
    fn test_small_input_has_no_duplicates() {
        let data = rows(6);
        let outputs = vec![col("id")];
        let outcome = process(&request(&data, &[], &outputs));
        assert_eq!(outcome.duplicates, 0);
        assert_eq!(outcome.rows.len(), 6);
    }

    #[test]
    fn test_projection_fills_missing_and_skips_disabled() {
        let data = rows(1);
        let outputs = vec![
            col("name"),
            col("email"),
            OutputColumn {
                column: "city".into(),
                enabled: false,
            },
        ];
        let outcome = process(&request(&data, &[], &outputs));
        let row = &outcome.rows[0];
        assert_eq!(row.len(), 2);
        assert_eq!(row.get("email"), Some(&CellValue::Empty));
        assert!(row.get("city").is_none());
    }

    #[test]
    fn test_similarity_strategy() {
        let mut data = rows(3);
        data[1].insert("name".into(), CellValue::Text("name 0".into()));
        data[1].insert("city".into(), CellValue::Text("Pune".into()));
        data[2].insert("name".into(), CellValue::Text("Zenith Traders".into()));
        let outputs = vec![col("id")];
        let matches = vec![
            MatchColumn {
                column: "name".into(),
                enabled: true,
            },
            MatchColumn {
                column: "city".into(),
                enabled: true,
            },
        ];
        let req = DedupRequest {
            match_columns: &matches,
            strategy: DedupStrategy::Similarity,
            ..request(&data, &[], &outputs)
        };
        let outcome = process(&req);
        assert_eq!(outcome.duplicates, 1);
        let ids: Vec<_> = outcome.rows.iter().map(|r| r["id"].to_string()).collect();
        assert_eq!(ids, vec!["0", "2"]);
    }
}
