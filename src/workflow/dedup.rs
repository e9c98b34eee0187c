//! Deduplication wizard: upload, configure, process and export.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::WorkflowError;
use crate::dedup::spreadsheet::{
    read_sheet, validate_upload, write_csv_file, write_xlsx, PROCESSED_SHEET_NAME,
};
use crate::dedup::{self, DedupOutcome, DedupRequest, DedupStrategy, SpreadsheetError};
use crate::models::FileMetadata;
use crate::store::MasterDedupStore;

/// Where the wizard stands, derived from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardPhase {
    NoFile,
    Configuring,
    Processing,
    Previewing,
}

impl WizardPhase {
    pub fn of(store: &MasterDedupStore) -> Self {
        if store.uploaded_file().is_none() {
            Self::NoFile
        } else if store.is_processing() {
            Self::Processing
        } else if !store.processed_data().is_empty() || store.duplicates_found() > 0 {
            Self::Previewing
        } else {
            Self::Configuring
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoFile => "no-file",
            Self::Configuring => "configuring",
            Self::Processing => "processing",
            Self::Previewing => "previewing",
        }
    }
}

/// Output format for processed data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

/// Validate and parse a spreadsheet, then install it in the store,
/// replacing any file already loaded.
///
/// The store is untouched when validation or parsing fails.
pub fn upload(store: &mut MasterDedupStore, path: &Path) -> Result<FileMetadata, WorkflowError> {
    let file = validate_upload(path)?;
    let sheet = read_sheet(path)?;
    let metadata = sheet.metadata();
    match store.uploaded_file() {
        Some(previous) => {
            debug!("Replacing {} with {}", previous.name, file.name);
            store.replace_file(file, metadata, sheet.columns, sheet.rows);
        }
        None => store.set_uploaded_file(file, metadata, sheet.columns, sheet.rows),
    }
    Ok(metadata)
}

/// Check that the live configuration can be processed.
pub fn check_ready(store: &MasterDedupStore) -> Result<(), WorkflowError> {
    if store.raw_data().is_empty() {
        return Err(WorkflowError::Precondition("No data to process"));
    }
    if !store.match_columns().iter().any(|c| c.enabled) {
        return Err(WorkflowError::Precondition(
            "Please select at least one match criteria column",
        ));
    }
    if !store.output_columns().iter().any(|c| c.enabled) {
        return Err(WorkflowError::Precondition(
            "Please select at least one output column",
        ));
    }
    Ok(())
}

/// Run one processing pass and store the result.
pub fn process(
    store: &mut MasterDedupStore,
    strategy: DedupStrategy,
) -> Result<DedupOutcome, WorkflowError> {
    check_ready(store)?;
    store.start_processing();
    let outcome = dedup::process(&DedupRequest::from_store(store, strategy));
    store.set_processed_data(outcome.rows.clone(), outcome.duplicates);
    Ok(outcome)
}

fn export_stem(store: &MasterDedupStore) -> String {
    store
        .uploaded_file()
        .map(|f| f.stem().to_string())
        .unwrap_or_else(|| "data".to_string())
}

/// Write the uploaded rows as `raw_{stem}.csv`.
pub fn export_raw(store: &MasterDedupStore, dir: &Path) -> Result<PathBuf, WorkflowError> {
    if store.raw_data().is_empty() {
        return Err(SpreadsheetError::NoData("No data to export").into());
    }
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("raw_{}.csv", export_stem(store)));
    let columns: Vec<String> = store.columns().iter().map(|c| c.name.clone()).collect();
    write_csv_file(&path, &columns, store.raw_data())?;
    info!("Exported {} raw rows to {}", store.raw_data().len(), path.display());
    Ok(path)
}

/// Write the processed rows as `deduplicated_{stem}.xlsx` or `.csv`.
pub fn export_processed(
    store: &MasterDedupStore,
    dir: &Path,
    format: ExportFormat,
) -> Result<PathBuf, WorkflowError> {
    if store.processed_data().is_empty() {
        return Err(SpreadsheetError::NoData("No processed data to export").into());
    }
    fs::create_dir_all(dir)?;
    let columns: Vec<String> = dedup::enabled_output_columns(store.output_columns())
        .into_iter()
        .map(String::from)
        .collect();
    if columns.is_empty() {
        warn!("No enabled output columns; exporting empty header");
    }

    let stem = export_stem(store);
    let path = match format {
        ExportFormat::Xlsx => {
            let path = dir.join(format!("deduplicated_{}.xlsx", stem));
            write_xlsx(&path, PROCESSED_SHEET_NAME, &columns, store.processed_data())?;
            path
        }
        ExportFormat::Csv => {
            let path = dir.join(format!("deduplicated_{}.csv", stem));
            write_csv_file(&path, &columns, store.processed_data())?;
            path
        }
    };
    info!(
        "Exported {} processed rows to {}",
        store.processed_data().len(),
        path.display()
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_csv(dir: &Path, name: &str, rows: usize) -> PathBuf {
        let mut body = String::from("name,email,city,phone\n");
        for i in 0..rows {
            body.push_str(&format!("Person {i},p{i}@acme.in,Pune,{}\n", 9000 + i));
        }
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_upload_rejects_before_store() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("data.json");
        fs::write(&bad, "{}").unwrap();
        let mut store = MasterDedupStore::new();

        let err = upload(&mut store, &bad).unwrap_err();
        assert_eq!(err.to_string(), "Please upload a CSV, XLS, or XLSX file");
        assert_eq!(WizardPhase::of(&store), WizardPhase::NoFile);
    }

    #[test]
    fn test_upload_replaces_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = MasterDedupStore::new();
        upload(&mut store, &write_csv(dir.path(), "first.csv", 20)).unwrap();
        store.add_match_column("email");
        store.add_output_column("name");
        process(&mut store, DedupStrategy::Simulated).unwrap();
        assert_eq!(WizardPhase::of(&store), WizardPhase::Previewing);

        let meta = upload(&mut store, &write_csv(dir.path(), "second.csv", 4)).unwrap();
        assert_eq!(meta.rows, 4);
        assert_eq!(store.uploaded_file().map(|f| f.name.as_str()), Some("second.csv"));
        assert_eq!(store.raw_data().len(), 4);
        assert!(store.match_columns().is_empty());
        assert!(store.processed_data().is_empty());
        assert_eq!(WizardPhase::of(&store), WizardPhase::Configuring);
    }

    #[test]
    fn test_process_preconditions() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = MasterDedupStore::new();
        assert_eq!(
            process(&mut store, DedupStrategy::Simulated).unwrap_err().to_string(),
            "No data to process"
        );

        upload(&mut store, &write_csv(dir.path(), "people.csv", 5)).unwrap();
        assert_eq!(WizardPhase::of(&store), WizardPhase::Configuring);
        assert_eq!(
            process(&mut store, DedupStrategy::Simulated).unwrap_err().to_string(),
            "Please select at least one match criteria column"
        );

        store.add_match_column("email");
        assert_eq!(
            process(&mut store, DedupStrategy::Simulated).unwrap_err().to_string(),
            "Please select at least one output column"
        );
    }

    #[test]
    fn test_process_and_export() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = MasterDedupStore::new();
        upload(&mut store, &write_csv(dir.path(), "people.csv", 20)).unwrap();
        store.add_match_column("email");
        store.add_output_column("name");
        store.add_output_column("phone");

        assert!(export_processed(&store, dir.path(), ExportFormat::Csv).is_err());

        let outcome = process(&mut store, DedupStrategy::Simulated).unwrap();
        assert_eq!(outcome.duplicates, 3);
        assert_eq!(WizardPhase::of(&store), WizardPhase::Previewing);
        assert!(!store.is_processing());

        let out = dir.path().join("out");
        let raw = export_raw(&store, &out).unwrap();
        assert!(raw.ends_with("raw_people.csv"));
        assert_eq!(fs::read_to_string(&raw).unwrap().lines().count(), 21);

        let csv = export_processed(&store, &out, ExportFormat::Csv).unwrap();
        let text = fs::read_to_string(&csv).unwrap();
        assert!(csv.ends_with("deduplicated_people.csv"));
        assert_eq!(text.lines().next(), Some("name,phone"));
        assert_eq!(text.lines().count(), 18);

        let xlsx = export_processed(&store, &out, ExportFormat::Xlsx).unwrap();
        assert!(xlsx.ends_with("deduplicated_people.xlsx"));
        assert_eq!(read_sheet(&xlsx).unwrap().rows.len(), 17);
    }
}
