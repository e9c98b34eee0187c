//! Route inspection.

use console::style;

use crate::config::Settings;
use crate::routes::{resolve, visible_nav_items, Resolution};
use crate::workspace::Workspace;

/// Show where `path` leads for the current session, or list the
/// navigation entries when no path is given. `sidebar` overrides the
/// width-based sidebar state.
pub async fn cmd_nav(
    settings: &Settings,
    path: Option<&str>,
    sidebar: Option<bool>,
) -> anyhow::Result<()> {
    let mut ws = Workspace::open(settings.clone())?;
    if let Some(open) = sidebar {
        ws.sidebar.set_open(open);
    }

    let Some(path) = path else {
        println!(
            "\n{} (sidebar {})",
            style("Navigation").bold(),
            if ws.sidebar.is_open { "expanded" } else { "collapsed" }
        );
        for item in visible_nav_items(&ws.auth) {
            println!("  {:<14} {}", item.label, style(item.route.path()).dim());
        }
        return Ok(());
    };

    // show each hop so redirects are visible
    let mut current = path.to_string();
    for _ in 0..4 {
        match resolve(&current, &ws.auth) {
            Resolution::Redirect(next) if next != current => {
                println!("{} {} redirects to {}", style("→").cyan(), current, next);
                current = next;
            }
            _ => break,
        }
    }

    match ws.navigate(path) {
        Ok(route) => {
            println!("{} {}", style("✓").green(), route.path());
            if let Some(app) = ws.apps.current_app() {
                println!("  Application: {}", app);
            }
        }
        Err(e) => println!("{} {}", style("✗").red(), e),
    }
    Ok(())
}
