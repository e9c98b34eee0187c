//! Initialize command.

use console::style;

use crate::config::Settings;

/// Create the data and export directories.
pub async fn cmd_init(settings: &Settings) -> anyhow::Result<()> {
    settings.ensure_directories()?;

    println!(
        "{} Initialized Truverizen in {}",
        style("✓").green(),
        settings.data_dir.display()
    );
    println!("  Exports are written to {}", settings.output_dir.display());
    println!("  Run 'truv login --email <EMAIL>' to sign in");

    Ok(())
}
