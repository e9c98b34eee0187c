//! Court-index command: upload, AI indexing, result and download.

use std::path::{Path, PathBuf};
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::helpers::step_marker;
use crate::config::Settings;
use crate::models::DocumentStatus;
use crate::routes::{CourtIndexPage, Route};
use crate::utils::format_size;
use crate::workflow::court_index::{self, StepStatus};
use crate::workspace::Workspace;

fn progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Run the whole court-index wizard for one PDF.
pub async fn cmd_court_index(
    settings: &Settings,
    file: &Path,
    output: Option<PathBuf>,
    download: bool,
) -> anyhow::Result<()> {
    let mut ws = Workspace::open(settings.clone())?;
    ws.navigate(Route::CourtIndex(CourtIndexPage::Upload).path())?;

    // Upload
    let doc = court_index::upload(&mut ws.court_index, file).await?;
    println!(
        "{} Uploaded {} ({})",
        style("✓").green(),
        doc.file_name,
        doc.file
            .as_ref()
            .map(|f| format_size(f.size))
            .unwrap_or_default()
    );
    println!("  Case ID: {}", style(&doc.case_id).cyan());
    if let Some(pages) = doc.page_count {
        println!("  Pages:   {}", pages);
    }

    // Processing
    ws.navigate(Route::CourtIndex(CourtIndexPage::Processing).path())?;
    let api = ws.api()?;
    let pb = progress_bar();
    let mut final_steps = Vec::new();
    let result = court_index::process_current(&mut ws.court_index, &api, |tracker| {
        pb.set_position(tracker.progress() as u64);
        if let Some(step) = tracker
            .steps()
            .iter()
            .find(|s| s.status == StepStatus::Processing)
        {
            pb.set_message(step.label);
        }
        final_steps = tracker.steps().to_vec();
    })
    .await;
    pb.finish_and_clear();

    for step in &final_steps {
        println!("  {} {}", step_marker(step), step.label);
    }

    let doc = match result {
        Ok(doc) => doc,
        Err(e) => {
            println!("{} Processing failed: {}", style("✗").red(), e);
            println!("  Upload the document again to retry.");
            ws.court_index.clear_current();
            return Err(e.into());
        }
    };

    // Result
    ws.navigate(Route::CourtIndex(CourtIndexPage::Result).path())?;
    println!("\n{}", style("Document Indexed").bold());
    println!("  Case ID: {}", doc.case_id);
    println!("  File:    {}", doc.file_name);
    println!("  Status:  {}", doc.status.as_str());
    if let Some(remarks) = doc.index_data.as_ref().and_then(|d| d.remarks.as_deref()) {
        println!("  Remarks: {}", remarks);
    }
    println!("  Index entries: {}", doc.index_entries().len());

    // Download
    if download && doc.status == DocumentStatus::Completed {
        ws.navigate(Route::CourtIndex(CourtIndexPage::Download).path())?;
        let dir = output.unwrap_or_else(|| settings.output_dir.clone());
        println!();
        for outcome in court_index::download_all(&doc, &dir) {
            match outcome {
                Ok(path) => println!("{} Saved {}", style("✓").green(), path.display()),
                Err(e) => println!("{} {}", style("!").yellow(), e),
            }
        }
    }

    ws.court_index.clear_current();
    Ok(())
}
