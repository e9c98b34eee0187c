//! Master-deduplication workflow store.
//!
//! Holds the uploaded dataset, the live matching configuration, saved
//! configurations and the last processing result. Every configuration
//! edit moves the status back to draft.

use std::path::Path;

use chrono::Utc;
use tracing::{debug, info};

use super::persist::{read_json, write_json, StoreError};
use crate::models::{
    ColumnInfo, ConfigurationStatus, ConflictRule, FileMetadata, FilterValue, MatchColumn,
    OutputColumn, Row, SavedConfiguration, UploadedFile,
};
use crate::utils::generate_id;

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone)]
pub struct MasterDedupStore {
    uploaded_file: Option<UploadedFile>,
    file_metadata: Option<FileMetadata>,
    columns: Vec<ColumnInfo>,
    raw_data: Vec<Row>,

    filters: Vec<FilterValue>,
    match_columns: Vec<MatchColumn>,
    output_columns: Vec<OutputColumn>,
    conflict_rules: Vec<ConflictRule>,
    similarity_threshold: f64,
    current_config_id: Option<String>,
    configuration_status: ConfigurationStatus,

    saved_configurations: Vec<SavedConfiguration>,

    is_processing: bool,
    processed_data: Vec<Row>,
    duplicates_found: usize,
}

impl Default for MasterDedupStore {
    fn default() -> Self {
        Self {
            uploaded_file: None,
            file_metadata: None,
            columns: Vec::new(),
            raw_data: Vec::new(),
            filters: Vec::new(),
            match_columns: Vec::new(),
            output_columns: Vec::new(),
            conflict_rules: Vec::new(),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            current_config_id: None,
            configuration_status: ConfigurationStatus::Draft,
            saved_configurations: Vec::new(),
            is_processing: false,
            processed_data: Vec::new(),
            duplicates_found: 0,
        }
    }
}

impl MasterDedupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store seeded with previously saved configurations.
    pub fn with_saved_configurations(saved: Vec<SavedConfiguration>) -> Self {
        Self {
            saved_configurations: saved,
            ..Self::default()
        }
    }

    /// Load saved configurations from `path`; a missing file is empty.
    pub fn load_saved(path: &Path) -> Result<Self, StoreError> {
        let saved: Vec<SavedConfiguration> = read_json(path)?.unwrap_or_default();
        debug!("Loaded {} saved dedup configurations", saved.len());
        Ok(Self::with_saved_configurations(saved))
    }

    /// Write saved configurations to `path`.
    pub fn persist_saved(&self, path: &Path) -> Result<(), StoreError> {
        write_json(path, &self.saved_configurations)
    }

    // Upload

    /// Install a freshly parsed file. Configuration and results are reset,
    /// then the first auto-apply configuration (if any) is loaded.
    pub fn set_uploaded_file(
        &mut self,
        file: UploadedFile,
        metadata: FileMetadata,
        columns: Vec<ColumnInfo>,
        data: Vec<Row>,
    ) {
        info!(
            "Uploaded {} ({} rows, {} columns)",
            file.name, metadata.rows, metadata.columns
        );
        self.uploaded_file = Some(file);
        self.file_metadata = Some(metadata);
        self.columns = columns;
        self.raw_data = data;
        self.match_columns.clear();
        self.output_columns.clear();
        self.filters.clear();
        self.processed_data.clear();
        self.duplicates_found = 0;
        self.configuration_status = ConfigurationStatus::Draft;

        let auto = self
            .saved_configurations
            .iter()
            .find(|c| c.auto_apply)
            .map(|c| c.id.clone());
        if let Some(id) = auto {
            debug!("Auto-applying dedup configuration {}", id);
            self.load_configuration(&id);
            self.configuration_status = ConfigurationStatus::AutoLoaded;
        }
    }

    pub fn replace_file(
        &mut self,
        file: UploadedFile,
        metadata: FileMetadata,
        columns: Vec<ColumnInfo>,
        data: Vec<Row>,
    ) {
        self.set_uploaded_file(file, metadata, columns, data);
    }

    // Configuration edits

    /// Upsert a filter by column; an empty value removes it.
    pub fn update_filter(&mut self, column: &str, value: &str) {
        match self.filters.iter().position(|f| f.column == column) {
            Some(idx) if value.is_empty() => {
                self.filters.remove(idx);
            }
            Some(idx) => self.filters[idx].value = value.to_string(),
            None if value.is_empty() => return,
            None => self.filters.push(FilterValue {
                column: column.to_string(),
                value: value.to_string(),
            }),
        }
        self.mark_draft();
    }

    pub fn reset_filters(&mut self) {
        self.filters.clear();
        self.mark_draft();
    }

    pub fn add_match_column(&mut self, column: &str) {
        if self.match_columns.iter().any(|c| c.column == column) {
            return;
        }
        self.match_columns.push(MatchColumn {
            column: column.to_string(),
            enabled: true,
        });
        self.mark_draft();
    }

    pub fn remove_match_column(&mut self, column: &str) {
        self.match_columns.retain(|c| c.column != column);
        self.mark_draft();
    }

    pub fn add_output_column(&mut self, column: &str) {
        if self.output_columns.iter().any(|c| c.column == column) {
            return;
        }
        self.output_columns.push(OutputColumn {
            column: column.to_string(),
            enabled: true,
        });
        self.mark_draft();
    }

    pub fn remove_output_column(&mut self, column: &str) {
        self.output_columns.retain(|c| c.column != column);
        self.mark_draft();
    }

    /// Add a conflict rule and return its id.
    pub fn add_conflict_rule(&mut self, left_term: &str, right_term: &str) -> String {
        let id = generate_id();
        self.conflict_rules.push(ConflictRule {
            id: id.clone(),
            left_term: left_term.to_string(),
            right_term: right_term.to_string(),
        });
        self.mark_draft();
        id
    }

    pub fn remove_conflict_rule(&mut self, id: &str) {
        self.conflict_rules.retain(|r| r.id != id);
        self.mark_draft();
    }

    pub fn update_conflict_rule(&mut self, id: &str, left_term: &str, right_term: &str) {
        if let Some(rule) = self.conflict_rules.iter_mut().find(|r| r.id == id) {
            rule.left_term = left_term.to_string();
            rule.right_term = right_term.to_string();
        }
        self.mark_draft();
    }

    /// Overwrite the threshold. Range checks belong to the caller.
    pub fn set_similarity_threshold(&mut self, threshold: f64) {
        self.similarity_threshold = threshold;
        self.mark_draft();
    }

    fn mark_draft(&mut self) {
        self.configuration_status = ConfigurationStatus::Draft;
    }

    // Saved configurations

    /// Snapshot the live configuration and return the new id.
    pub fn save_configuration(&mut self, name: &str, tags: Vec<String>, auto_apply: bool) -> String {
        let config = SavedConfiguration {
            id: generate_id(),
            name: name.to_string(),
            tags,
            auto_apply,
            filters: self.filters.clone(),
            match_columns: self.match_columns.clone(),
            output_columns: self.output_columns.clone(),
            conflict_rules: self.conflict_rules.clone(),
            similarity_threshold: self.similarity_threshold,
            created_at: Utc::now(),
        };
        let id = config.id.clone();
        info!("Saved dedup configuration '{}' ({})", name, id);
        self.saved_configurations.push(config);
        self.current_config_id = Some(id.clone());
        self.configuration_status = ConfigurationStatus::Saved;
        id
    }

    /// Copy a saved configuration into the live state. Returns false for
    /// unknown ids, leaving the store untouched.
    pub fn load_configuration(&mut self, id: &str) -> bool {
        let Some(config) = self.saved_configurations.iter().find(|c| c.id == id) else {
            return false;
        };
        self.filters = config.filters.clone();
        self.match_columns = config.match_columns.clone();
        self.output_columns = config.output_columns.clone();
        self.conflict_rules = config.conflict_rules.clone();
        self.similarity_threshold = config.similarity_threshold;
        self.current_config_id = Some(config.id.clone());
        self.configuration_status = ConfigurationStatus::Saved;
        self.processed_data.clear();
        self.duplicates_found = 0;
        true
    }

    pub fn delete_configuration(&mut self, id: &str) {
        self.saved_configurations.retain(|c| c.id != id);
        if self.current_config_id.as_deref() == Some(id) {
            self.current_config_id = None;
        }
    }

    /// Clear the live configuration. Uploaded data is kept.
    pub fn reset_configuration(&mut self) {
        self.filters.clear();
        self.match_columns.clear();
        self.output_columns.clear();
        self.conflict_rules.clear();
        self.similarity_threshold = DEFAULT_SIMILARITY_THRESHOLD;
        self.current_config_id = None;
        self.configuration_status = ConfigurationStatus::Draft;
    }

    /// Clear everything except saved configurations.
    pub fn reset(&mut self) {
        let saved = std::mem::take(&mut self.saved_configurations);
        *self = Self::with_saved_configurations(saved);
    }

    // Processing

    pub fn start_processing(&mut self) {
        self.is_processing = true;
    }

    pub fn set_processed_data(&mut self, data: Vec<Row>, duplicates: usize) {
        self.processed_data = data;
        self.duplicates_found = duplicates;
        self.is_processing = false;
    }

    // Accessors

    pub fn uploaded_file(&self) -> Option<&UploadedFile> {
        self.uploaded_file.as_ref()
    }

    pub fn file_metadata(&self) -> Option<FileMetadata> {
        self.file_metadata
    }

    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    pub fn raw_data(&self) -> &[Row] {
        &self.raw_data
    }

    pub fn filters(&self) -> &[FilterValue] {
        &self.filters
    }

    pub fn match_columns(&self) -> &[MatchColumn] {
        &self.match_columns
    }

    pub fn output_columns(&self) -> &[OutputColumn] {
        &self.output_columns
    }

    pub fn conflict_rules(&self) -> &[ConflictRule] {
        &self.conflict_rules
    }

    pub fn similarity_threshold(&self) -> f64 {
        self.similarity_threshold
    }

    pub fn current_config_id(&self) -> Option<&str> {
        self.current_config_id.as_deref()
    }

    pub fn configuration_status(&self) -> ConfigurationStatus {
        self.configuration_status
    }

    pub fn saved_configurations(&self) -> &[SavedConfiguration] {
        &self.saved_configurations
    }

    pub fn is_processing(&self) -> bool {
        self.is_processing
    }

    pub fn processed_data(&self) -> &[Row] {
        &self.processed_data
    }

    pub fn duplicates_found(&self) -> usize {
        self.duplicates_found
    }
}
