//! Fuzzy duplicate detection over the enabled match columns.

use tracing::debug;

use crate::models::{ConflictRule, Row};

/// Lower-case, trim and collapse internal whitespace.
fn normalize(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn cell_text(row: &Row, column: &str) -> String {
    row.get(column)
        .map(|v| normalize(&v.to_string()))
        .unwrap_or_default()
}

/// Jaro-Winkler similarity of two already-normalized values.
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::jaro_winkler(a, b)
}

/// Whether any rule separates `a` from `b` in the given column values.
fn conflicts(rules: &[ConflictRule], a: &[String], b: &[String]) -> bool {
    rules.iter().any(|rule| {
        let left = normalize(&rule.left_term);
        let right = normalize(&rule.right_term);
        if left.is_empty() || right.is_empty() {
            return false;
        }
        a.iter().zip(b).any(|(x, y)| {
            (x.contains(&left) && y.contains(&right)) || (x.contains(&right) && y.contains(&left))
        })
    })
}

/// Compare two rows' match keys. Columns empty on both sides are ignored,
/// and at least one column must carry a value.
fn keys_match(a: &[String], b: &[String], threshold: f64) -> bool {
    let mut compared = 0;
    for (x, y) in a.iter().zip(b) {
        if x.is_empty() && y.is_empty() {
            continue;
        }
        if x.is_empty() || y.is_empty() || similarity(x, y) < threshold {
            return false;
        }
        compared += 1;
    }
    compared > 0
}

/// Keep the first row of every group of similar rows.
///
/// Returns the indices of rows to keep, in input order.
pub fn find_unique(
    rows: &[Row],
    match_columns: &[&str],
    conflict_rules: &[ConflictRule],
    threshold: f64,
) -> Vec<usize> {
    let keys: Vec<Vec<String>> = rows
        .iter()
        .map(|row| match_columns.iter().map(|c| cell_text(row, c)).collect())
        .collect();

    let mut kept: Vec<usize> = Vec::new();
    for (idx, key) in keys.iter().enumerate() {
        let duplicate_of = kept.iter().copied().find(|&k| {
            keys_match(&keys[k], key, threshold) && !conflicts(conflict_rules, &keys[k], key)
        });
        match duplicate_of {
            Some(k) => debug!("Row {} duplicates row {}", idx, k),
            None => kept.push(idx),
        }
    }
    kept
}
