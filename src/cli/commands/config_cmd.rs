//! Configuration inspection.

use console::style;

use crate::config::{Config, Settings};

/// Print the resolved settings and where they came from.
pub async fn cmd_config_show(settings: &Settings, config: &Config) -> anyhow::Result<()> {
    println!("\n{}", style("Configuration").bold());
    match config.source_path {
        Some(ref path) => println!("  Source:          {}", path.display()),
        None => println!("  Source:          {}", style("defaults").dim()),
    }
    println!("  API URL:         {}", settings.api_url);
    println!("  Data dir:        {}", settings.data_dir.display());
    println!("  Output dir:      {}", settings.output_dir.display());
    println!("  Request timeout: {}s", settings.request_timeout);
    println!("  Dedup strategy:  {}", settings.dedup_strategy);
    println!("  Session file:    {}", settings.session_path().display());
    println!("  Saved configs:   {}", settings.dedup_configs_path().display());
    Ok(())
}
