//! Sign-in and session commands.

use console::style;

use crate::config::Settings;
use crate::routes::visible_nav_items;
use crate::session::{self, SessionError};
use crate::workspace::Workspace;

use crate::cli::helpers::spinner;

/// Validate credentials, authenticate and persist the session.
pub async fn cmd_login(settings: &Settings, email: &str, password: &str) -> anyhow::Result<()> {
    let mut ws = Workspace::open(settings.clone())?;
    let api = ws.api()?;

    let pb = spinner("Signing in...");
    let result = session::login(&api, &mut ws.auth, email.trim(), password).await;
    pb.finish_and_clear();

    match result {
        Ok(user) => {
            println!(
                "{} Signed in as {} <{}>",
                style("✓").green(),
                style(&user.name).bold(),
                user.email
            );
            Ok(())
        }
        Err(SessionError::Validation(errors)) => {
            for error in &errors {
                println!("  {} {}", style("✗").red(), error);
            }
            anyhow::bail!("Login form is invalid")
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn cmd_logout(settings: &Settings) -> anyhow::Result<()> {
    let mut ws = Workspace::open(settings.clone())?;
    if !ws.auth.is_authenticated() {
        println!("{} Not signed in", style("!").yellow());
        return Ok(());
    }
    session::logout(&mut ws.auth)?;
    println!("{} Signed out", style("✓").green());
    Ok(())
}

pub async fn cmd_whoami(settings: &Settings) -> anyhow::Result<()> {
    let ws = Workspace::open(settings.clone())?;
    let Some(user) = ws.auth.user() else {
        println!(
            "{} Not signed in. Run 'truv login' first.",
            style("!").yellow()
        );
        return Ok(());
    };

    println!("\n{}", style(&user.name).bold());
    println!("  Email:   {}", user.email);
    println!("  Role:    {}", user.role.as_str());
    println!("  Backend: {}", settings.api_url);

    let pages: Vec<&str> = visible_nav_items(&ws.auth)
        .iter()
        .map(|item| item.label)
        .collect();
    println!("  Pages:   {}", pages.join(", "));
    Ok(())
}
