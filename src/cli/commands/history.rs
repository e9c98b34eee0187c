//! Processing history command.

use console::style;

use crate::config::Settings;
use crate::models::{HistoryItem, HistoryQuery, HistoryStatus, HistoryTotals};
use crate::routes::Route;
use crate::workspace::Workspace;

use crate::cli::helpers::{rule, spinner, truncate};

fn status_label(status: HistoryStatus) -> String {
    match status {
        HistoryStatus::Completed => style("completed").green().to_string(),
        HistoryStatus::Failed => style("failed").red().to_string(),
        HistoryStatus::Processing => style("processing").yellow().to_string(),
    }
}

/// Fetch history and print it filtered and sorted by `query`.
pub async fn cmd_history(
    settings: &Settings,
    query: &HistoryQuery,
    json: bool,
) -> anyhow::Result<()> {
    let mut ws = Workspace::open(settings.clone())?;
    ws.navigate(Route::History.path())?;
    let api = ws.api()?;

    let pb = spinner("Loading history...");
    let fetched = api.history().await;
    pb.finish_and_clear();

    let items: Vec<HistoryItem> = fetched?.into_iter().map(HistoryItem::from).collect();
    let shown = query.apply(&items);

    if json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }

    if shown.is_empty() {
        println!("{} No history found", style("!").yellow());
        return Ok(());
    }

    println!("\n{}", style("Processing History").bold());
    rule(90);
    println!(
        "{:<22} {:<34} {:<18} Status",
        "Tool", "Document", "Processed"
    );
    rule(90);
    for item in &shown {
        println!(
            "{:<22} {:<34} {:<18} {}",
            truncate(&item.tool, 21),
            truncate(&item.document_name, 33),
            item.display_time(),
            status_label(item.status)
        );
    }
    rule(90);

    let totals = HistoryTotals::from_items(&items);
    println!(
        "Showing {} of {} ({} completed, {} failed)",
        shown.len(),
        totals.total,
        style(totals.completed).green(),
        style(totals.failed).red()
    );
    Ok(())
}
