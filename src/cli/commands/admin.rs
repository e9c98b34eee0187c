//! User and company administration.

use std::io::{self, Write};

use console::style;

use crate::api::{NewCompanyPayload, NewUserPayload, UpdateUserPayload};
use crate::config::Settings;
use crate::models::{AccountRole, Company, CompanyStatus, User, UserStatus};
use crate::routes::Route;
use crate::session::{validate_email, validate_password};
use crate::workspace::Workspace;

use crate::cli::helpers::{rule, spinner, truncate};

/// Open the workspace on the admin-only users page.
fn admin_workspace(settings: &Settings) -> anyhow::Result<Workspace> {
    let mut ws = Workspace::open(settings.clone())?;
    ws.navigate(Route::Users.path())?;
    Ok(ws)
}

async fn fetch_users(ws: &Workspace) -> anyhow::Result<Vec<User>> {
    let api = ws.api()?;
    let pb = spinner("Loading users...");
    let users = api.users().await;
    pb.finish_and_clear();
    Ok(users?.into_iter().map(User::from).collect())
}

pub async fn cmd_users_list(settings: &Settings, search: Option<&str>) -> anyhow::Result<()> {
    let ws = admin_workspace(settings)?;
    let users = fetch_users(&ws).await?;
    let shown: Vec<&User> = users
        .iter()
        .filter(|u| search.map_or(true, |q| u.matches(q)))
        .collect();

    if shown.is_empty() {
        println!("{} No users found", style("!").yellow());
        return Ok(());
    }

    println!("\n{}", style("Users").bold());
    rule(100);
    println!(
        "{:<8} {:<22} {:<30} {:<18} {:<7} {:<8} Last Login",
        "ID", "Name", "Email", "Company", "Role", "Status"
    );
    rule(100);
    for user in &shown {
        let status = match user.status {
            UserStatus::Active => style("active").green(),
            UserStatus::Revoked => style("revoked").red(),
        };
        println!(
            "{:<8} {:<22} {:<30} {:<18} {:<7} {:<8} {}",
            truncate(&user.id, 8),
            truncate(&user.name, 21),
            truncate(&user.email, 29),
            truncate(&user.company, 17),
            user.role.as_str(),
            status,
            user.last_login.as_deref().unwrap_or("Never")
        );
    }
    println!("\n{} user(s)", shown.len());
    Ok(())
}

pub async fn cmd_user_create(
    settings: &Settings,
    name: String,
    company: String,
    email: String,
    password: String,
    role: AccountRole,
) -> anyhow::Result<()> {
    let ws = admin_workspace(settings)?;
    if let Err(e) = validate_email(&email) {
        anyhow::bail!("{}", e);
    }
    if let Err(e) = validate_password(&password) {
        anyhow::bail!("{}", e);
    }

    let payload = NewUserPayload {
        name,
        company,
        email,
        password,
        role: role.as_str().to_string(),
    };
    ws.api()?.create_user(&payload).await?;
    println!(
        "{} Created user {} <{}>",
        style("✓").green(),
        payload.name,
        payload.email
    );
    Ok(())
}

/// Fields to change on an existing user.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub role: Option<AccountRole>,
}

impl UserChanges {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.company.is_none() && self.email.is_none() && self.role.is_none()
    }

    /// Merge onto `user`, producing the full update body the backend expects.
    fn apply(self, user: &User) -> UpdateUserPayload {
        UpdateUserPayload {
            name: self.name.unwrap_or_else(|| user.name.clone()),
            company: self.company.unwrap_or_else(|| user.company.clone()),
            email: self.email.unwrap_or_else(|| user.email.clone()),
            role: self.role.unwrap_or(user.role).as_str().to_string(),
        }
    }
}

pub async fn cmd_user_update(
    settings: &Settings,
    id: &str,
    changes: UserChanges,
) -> anyhow::Result<()> {
    if changes.is_empty() {
        println!("{} Nothing to update", style("!").yellow());
        return Ok(());
    }
    if let Some(Err(e)) = changes.email.as_deref().map(validate_email) {
        anyhow::bail!("{}", e);
    }

    let ws = admin_workspace(settings)?;
    let users = fetch_users(&ws).await?;
    let Some(user) = users.iter().find(|u| u.id == id) else {
        println!("{} User '{}' not found", style("✗").red(), id);
        return Ok(());
    };

    let payload = changes.apply(user);
    ws.api()?.update_user(id, &payload).await?;
    println!("{} Updated user {}", style("✓").green(), payload.name);
    Ok(())
}

pub async fn cmd_user_delete(settings: &Settings, id: &str, yes: bool) -> anyhow::Result<()> {
    let ws = admin_workspace(settings)?;

    if !yes {
        print!("Delete user {}? [y/N] ", id);
        io::stdout().flush()?;
        let mut answer = String::new();
        io::stdin().read_line(&mut answer)?;
        if !answer.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled");
            return Ok(());
        }
    }

    ws.api()?.delete_user(id).await?;
    println!("{} Deleted user {}", style("✓").green(), id);
    Ok(())
}

pub async fn cmd_companies_list(settings: &Settings, search: Option<&str>) -> anyhow::Result<()> {
    let ws = admin_workspace(settings)?;
    let api = ws.api()?;

    let pb = spinner("Loading companies...");
    let fetched = api.companies().await;
    pb.finish_and_clear();

    let companies: Vec<Company> = fetched?.into_iter().map(Company::from).collect();
    let shown: Vec<&Company> = companies
        .iter()
        .filter(|c| search.map_or(true, |q| c.matches(q)))
        .collect();

    if shown.is_empty() {
        println!("{} No companies found", style("!").yellow());
        return Ok(());
    }

    println!("\n{}", style("Companies").bold());
    rule(100);
    println!(
        "{:<24} {:<20} {:<15} {:<16} {:<12} {:<8} Users",
        "Company", "Contact", "Phone", "Location", "Validity", "Status"
    );
    rule(100);
    for company in &shown {
        let status = match company.status {
            CompanyStatus::Active => style("active").green(),
            CompanyStatus::Expired => style("expired").red(),
        };
        println!(
            "{:<24} {:<20} {:<15} {:<16} {:<12} {:<8} {}",
            truncate(&company.name, 23),
            truncate(&company.poc_name, 19),
            truncate(&company.poc_mobile, 14),
            truncate(&company.location, 15),
            truncate(&company.validity, 11),
            status,
            company.total_users
        );
    }
    println!("\n{} companies", shown.len());
    Ok(())
}

pub async fn cmd_company_add(
    settings: &Settings,
    name: String,
    poc_name: String,
    poc_contact: String,
    location: String,
    validity: String,
) -> anyhow::Result<()> {
    let ws = admin_workspace(settings)?;
    let payload = NewCompanyPayload::new(name, poc_name, poc_contact, location, validity);
    ws.api()?.add_company(&payload).await?;
    println!(
        "{} Added company {}",
        style("✓").green(),
        payload.company_name
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: "4".into(),
            name: "Asha Rao".into(),
            email: "asha@acme.in".into(),
            company: "Acme".into(),
            role: AccountRole::Normal,
            status: UserStatus::Active,
            last_login: None,
        }
    }

    #[test]
    fn test_changes_keep_unset_fields() {
        let changes = UserChanges {
            role: Some(AccountRole::Admin),
            ..Default::default()
        };
        assert!(!changes.is_empty());
        let payload = changes.apply(&user());
        assert_eq!(payload.name, "Asha Rao");
        assert_eq!(payload.company, "Acme");
        assert_eq!(payload.role, "admin");
    }

    #[test]
    fn test_empty_changes() {
        assert!(UserChanges::default().is_empty());
    }
}
