//! Master-data deduplication commands.

use std::path::{Path, PathBuf};

use clap::Args;
use console::style;

use crate::cli::helpers::{parse_key_value, rule, spinner, truncate};
use crate::config::Settings;
use crate::dedup::{enabled_output_columns, DedupStrategy};
use crate::models::{ConfigurationStatus, Row};
use crate::routes::Route;
use crate::workflow::dedup::{self as wizard, ExportFormat};
use crate::workspace::Workspace;

#[derive(Debug, Args)]
pub struct DedupRunArgs {
    /// CSV, XLS or XLSX file
    pub file: PathBuf,

    /// Column compared when looking for duplicates (repeatable)
    #[arg(short = 'm', long = "match")]
    pub match_columns: Vec<String>,

    /// Column kept in the output (repeatable)
    #[arg(short = 'o', long = "output-column")]
    pub output_columns: Vec<String>,

    /// Keep rows whose COLUMN contains VALUE, case-insensitively (repeatable)
    #[arg(short, long = "filter", value_name = "COLUMN=VALUE", value_parser = parse_key_value)]
    pub filters: Vec<(String, String)>,

    /// Terms that must never be merged, e.g. "Ltd=LLP" (repeatable)
    #[arg(long = "conflict", value_name = "LEFT=RIGHT", value_parser = parse_key_value)]
    pub conflicts: Vec<(String, String)>,

    /// Similarity threshold between 0 and 1
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Matching strategy (default from config)
    #[arg(long, value_enum)]
    pub strategy: Option<DedupStrategy>,

    /// Start from a saved configuration
    #[arg(long = "use-config", value_name = "ID")]
    pub use_config: Option<String>,

    /// Save the configuration under this name before processing
    #[arg(long, value_name = "NAME")]
    pub save_as: Option<String>,

    /// Tags for the saved configuration (repeatable)
    #[arg(long = "tag", requires = "save_as")]
    pub tags: Vec<String>,

    /// Apply the saved configuration automatically on future uploads
    #[arg(long, requires = "save_as")]
    pub auto_apply: bool,

    /// Format of the processed export
    #[arg(long, value_enum, default_value = "xlsx")]
    pub format: ExportFormat,

    /// Also export the uploaded rows as CSV
    #[arg(long)]
    pub export_raw: bool,

    /// Skip writing the processed export
    #[arg(long)]
    pub no_export: bool,

    /// Directory for exports (default: exports dir)
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Number of processed rows to preview
    #[arg(long, default_value = "10")]
    pub preview: usize,
}

fn open_app(settings: &Settings) -> anyhow::Result<Workspace> {
    let mut ws = Workspace::open(settings.clone())?;
    ws.navigate(Route::MasterDeduplication.path())?;
    Ok(ws)
}

fn upload(ws: &mut Workspace, file: &Path) -> anyhow::Result<()> {
    let metadata = wizard::upload(&mut ws.dedup, file)?;
    println!(
        "{} Loaded {}: {} rows, {} columns",
        style("✓").green(),
        file.display(),
        metadata.rows,
        metadata.columns
    );
    if ws.dedup.configuration_status() == ConfigurationStatus::AutoLoaded {
        let name = ws
            .dedup
            .current_config_id()
            .and_then(|id| ws.dedup.saved_configurations().iter().find(|c| c.id == id))
            .map(|c| c.name.as_str())
            .unwrap_or_default();
        println!(
            "{} Applied auto-apply configuration '{}'",
            style("→").cyan(),
            name
        );
    }
    Ok(())
}

/// Show the parsed columns of a spreadsheet.
pub async fn cmd_dedup_inspect(settings: &Settings, file: &Path) -> anyhow::Result<()> {
    let mut ws = open_app(settings)?;
    upload(&mut ws, file)?;

    println!("\n{}", style("Columns").bold());
    rule(40);
    for column in ws.dedup.columns() {
        println!("  {:<28} {}", column.name, column.column_type.as_str());
    }
    Ok(())
}

fn warn_unknown_columns(ws: &Workspace, names: &[String]) {
    for name in names {
        if !ws.dedup.columns().iter().any(|c| &c.name == name) {
            println!(
                "{} Column '{}' is not in the uploaded file",
                style("!").yellow(),
                name
            );
        }
    }
}

fn print_preview(columns: &[&str], rows: &[Row], limit: usize) {
    if limit == 0 || rows.is_empty() {
        return;
    }
    let width = 20;
    println!("\n{}", style("Preview").bold());
    rule(columns.len() * (width + 1));
    let header: Vec<String> = columns
        .iter()
        .map(|c| format!("{:<width$}", truncate(c, width - 1)))
        .collect();
    println!("{}", header.join(" "));
    rule(columns.len() * (width + 1));
    for row in rows.iter().take(limit) {
        let cells: Vec<String> = columns
            .iter()
            .map(|c| {
                let value = row.get(*c).map(|v| v.to_string()).unwrap_or_default();
                format!("{:<width$}", truncate(&value, width - 1))
            })
            .collect();
        println!("{}", cells.join(" "));
    }
    if rows.len() > limit {
        println!("{}", style(format!("... {} more rows", rows.len() - limit)).dim());
    }
}

/// Upload, configure, process and export in one pass.
pub async fn cmd_dedup_run(settings: &Settings, args: DedupRunArgs) -> anyhow::Result<()> {
    let mut ws = open_app(settings)?;
    upload(&mut ws, &args.file)?;

    if let Some(ref id) = args.use_config {
        if !ws.dedup.load_configuration(id) {
            anyhow::bail!("Configuration '{}' not found", id);
        }
    }

    warn_unknown_columns(&ws, &args.match_columns);
    warn_unknown_columns(&ws, &args.output_columns);

    for (column, value) in &args.filters {
        ws.dedup.update_filter(column, value);
    }
    for column in &args.match_columns {
        ws.dedup.add_match_column(column);
    }
    for column in &args.output_columns {
        ws.dedup.add_output_column(column);
    }
    for (left, right) in &args.conflicts {
        ws.dedup.add_conflict_rule(left, right);
    }
    if let Some(threshold) = args.threshold {
        if !(0.0..=1.0).contains(&threshold) {
            anyhow::bail!("Threshold must be between 0 and 1, got {}", threshold);
        }
        ws.dedup.set_similarity_threshold(threshold);
    }

    if let Some(ref name) = args.save_as {
        let id = ws
            .dedup
            .save_configuration(name, args.tags.clone(), args.auto_apply);
        ws.save_dedup_configs()?;
        println!("{} Saved configuration '{}' ({})", style("✓").green(), name, id);
    }

    let strategy = args.strategy.unwrap_or(settings.dedup_strategy);
    let pb = spinner(format!("Processing records ({})...", strategy));
    let outcome = wizard::process(&mut ws.dedup, strategy);
    pb.finish_and_clear();
    let outcome = outcome?;

    let total = ws.dedup.raw_data().len();
    println!("\n{}", style("Deduplication Results").bold());
    println!("  Original rows:      {}", total);
    println!("  Duplicates removed: {}", style(outcome.duplicates).yellow());
    println!("  Final rows:         {}", style(outcome.rows.len()).green());

    let columns = enabled_output_columns(ws.dedup.output_columns());
    print_preview(&columns, ws.dedup.processed_data(), args.preview);

    let dir = args
        .out_dir
        .clone()
        .unwrap_or_else(|| settings.output_dir.clone());
    println!();
    if args.export_raw {
        let path = wizard::export_raw(&ws.dedup, &dir)?;
        println!("{} Exported {}", style("✓").green(), path.display());
    }
    if !args.no_export {
        match wizard::export_processed(&ws.dedup, &dir, args.format) {
            Ok(path) => println!("{} Exported {}", style("✓").green(), path.display()),
            Err(e) => println!("{} {}", style("!").yellow(), e),
        }
    }
    Ok(())
}

pub async fn cmd_configs_list(settings: &Settings) -> anyhow::Result<()> {
    let ws = Workspace::open(settings.clone())?;
    let configs = ws.dedup.saved_configurations();

    if configs.is_empty() {
        println!("{} No saved configurations", style("!").yellow());
        return Ok(());
    }

    println!("\n{}", style("Saved Configurations").bold());
    rule(90);
    println!(
        "{:<38} {:<22} {:<6} {:<16} Tags",
        "ID", "Name", "Auto", "Created"
    );
    rule(90);
    for config in configs {
        println!(
            "{:<38} {:<22} {:<6} {:<16} {}",
            config.id,
            truncate(&config.name, 21),
            if config.auto_apply { "yes" } else { "no" },
            config.created_at.format("%Y-%m-%d %H:%M"),
            config.tags.join(", ")
        );
    }
    Ok(())
}

pub async fn cmd_configs_show(settings: &Settings, id: &str) -> anyhow::Result<()> {
    let ws = Workspace::open(settings.clone())?;
    match ws.dedup.saved_configurations().iter().find(|c| c.id == id) {
        Some(config) => println!("{}", serde_json::to_string_pretty(config)?),
        None => println!("{} Configuration '{}' not found", style("✗").red(), id),
    }
    Ok(())
}

pub async fn cmd_configs_delete(settings: &Settings, id: &str) -> anyhow::Result<()> {
    let mut ws = Workspace::open(settings.clone())?;
    if !ws.dedup.saved_configurations().iter().any(|c| c.id == id) {
        println!("{} Configuration '{}' not found", style("✗").red(), id);
        return Ok(());
    }
    ws.dedup.delete_configuration(id);
    ws.save_dedup_configs()?;
    println!("{} Deleted configuration {}", style("✓").green(), id);
    Ok(())
}
