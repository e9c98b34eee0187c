//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod admin;
mod auth;
mod config_cmd;
mod court_index;
mod dedup;
mod history;
mod init;
mod nav;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings_with_options, LoadOptions};
use crate::models::{AccountRole, HistoryQuery, HistoryStatus, SortBy, SortOrder};

#[derive(Parser)]
#[command(name = "truv")]
#[command(about = "Truverizen document workflows and platform administration")]
#[command(version)]
pub struct Cli {
    /// Data directory holding the session and saved configurations
    /// (overrides config file and TRUVERIZEN_DATA_DIR)
    #[arg(long, short = 'd', global = true)]
    data: Option<PathBuf>,

    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Resolve relative paths from current working directory instead of config file location
    #[arg(long, global = true)]
    cwd: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data and export directories
    Init,

    /// Sign in to the platform
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,
        /// Account password
        #[arg(short, long, env = "TRUVERIZEN_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out and clear the saved session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Resolve a page path through the route guards, or list navigation
    Nav {
        /// Path to open, e.g. /apps/court-index
        path: Option<String>,
        /// Show the sidebar expanded regardless of terminal width
        #[arg(long, conflicts_with = "collapse")]
        expand: bool,
        /// Show the sidebar collapsed regardless of terminal width
        #[arg(long)]
        collapse: bool,
    },

    /// Show processing history
    History {
        /// Search document names and tools
        #[arg(short, long)]
        search: Option<String>,
        /// Only show this tool
        #[arg(short, long)]
        tool: Option<String>,
        /// Only show this status
        #[arg(long, value_enum)]
        status: Option<HistoryStatus>,
        /// Sort field
        #[arg(long, value_enum, default_value = "date")]
        sort_by: SortBy,
        /// Sort direction
        #[arg(long, value_enum, default_value = "desc")]
        order: SortOrder,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage platform users (admin only)
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Manage customer companies (admin only)
    Companies {
        #[command(subcommand)]
        command: CompanyCommands,
    },

    /// Index a court document: upload, AI indexing and download
    CourtIndex {
        /// PDF to index
        file: PathBuf,
        /// Directory for downloaded files (default: exports dir)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Skip writing the processed files
        #[arg(long)]
        no_download: bool,
    },

    /// Master-data deduplication
    Dedup {
        #[command(subcommand)]
        command: DedupCommands,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// List users
    List {
        /// Filter by name or email
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Create a user
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        company: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "TRUVERIZEN_NEW_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, value_enum, default_value = "normal")]
        role: AccountRole,
    },
    /// Update a user; omitted fields keep their current value
    Update {
        /// User ID
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long, value_enum)]
        role: Option<AccountRole>,
    },
    /// Delete a user
    Delete {
        /// User ID
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum CompanyCommands {
    /// List companies
    List {
        /// Filter by company or contact name
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Register a company
    Add {
        #[arg(long)]
        name: String,
        /// Point-of-contact name
        #[arg(long)]
        poc_name: String,
        /// Point-of-contact phone number
        #[arg(long)]
        poc_contact: String,
        #[arg(long)]
        location: String,
        /// Contract validity, e.g. 2026-12-31
        #[arg(long)]
        validity: String,
    },
}

#[derive(Subcommand)]
enum DedupCommands {
    /// Show the columns of a spreadsheet
    Inspect {
        /// CSV, XLS or XLSX file
        file: PathBuf,
    },
    /// Configure and run a deduplication pass, then export
    Run(dedup::DedupRunArgs),
    /// Manage saved configurations
    Configs {
        #[command(subcommand)]
        command: DedupConfigCommands,
    },
}

#[derive(Subcommand)]
enum DedupConfigCommands {
    /// List saved configurations
    List,
    /// Show a saved configuration as JSON
    Show {
        /// Configuration ID
        id: String,
    },
    /// Delete a saved configuration
    Delete {
        /// Configuration ID
        id: String,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the resolved settings
    Show,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        use_cwd: cli.cwd,
        data: cli.data,
    };
    let (settings, config) = load_settings_with_options(options).await;

    match cli.command {
        Commands::Init => init::cmd_init(&settings).await,
        Commands::Login { email, password } => {
            auth::cmd_login(&settings, &email, &password).await
        }
        Commands::Logout => auth::cmd_logout(&settings).await,
        Commands::Whoami => auth::cmd_whoami(&settings).await,
        Commands::Nav {
            path,
            expand,
            collapse,
        } => {
            let sidebar = match (expand, collapse) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            nav::cmd_nav(&settings, path.as_deref(), sidebar).await
        }
        Commands::History {
            search,
            tool,
            status,
            sort_by,
            order,
            json,
        } => {
            let query = HistoryQuery {
                search,
                tool,
                status,
                sort_by,
                order,
            };
            history::cmd_history(&settings, &query, json).await
        }
        Commands::Users { command } => match command {
            UserCommands::List { search } => {
                admin::cmd_users_list(&settings, search.as_deref()).await
            }
            UserCommands::Create {
                name,
                company,
                email,
                password,
                role,
            } => admin::cmd_user_create(&settings, name, company, email, password, role).await,
            UserCommands::Update {
                id,
                name,
                company,
                email,
                role,
            } => {
                let changes = admin::UserChanges {
                    name,
                    company,
                    email,
                    role,
                };
                admin::cmd_user_update(&settings, &id, changes).await
            }
            UserCommands::Delete { id, yes } => admin::cmd_user_delete(&settings, &id, yes).await,
        },
        Commands::Companies { command } => match command {
            CompanyCommands::List { search } => {
                admin::cmd_companies_list(&settings, search.as_deref()).await
            }
            CompanyCommands::Add {
                name,
                poc_name,
                poc_contact,
                location,
                validity,
            } => {
                admin::cmd_company_add(&settings, name, poc_name, poc_contact, location, validity)
                    .await
            }
        },
        Commands::CourtIndex {
            file,
            output,
            no_download,
        } => court_index::cmd_court_index(&settings, &file, output, !no_download).await,
        Commands::Dedup { command } => match command {
            DedupCommands::Inspect { file } => dedup::cmd_dedup_inspect(&settings, &file).await,
            DedupCommands::Run(args) => dedup::cmd_dedup_run(&settings, args).await,
            DedupCommands::Configs { command } => match command {
                DedupConfigCommands::List => dedup::cmd_configs_list(&settings).await,
                DedupConfigCommands::Show { id } => dedup::cmd_configs_show(&settings, &id).await,
                DedupConfigCommands::Delete { id } => {
                    dedup::cmd_configs_delete(&settings, &id).await
                }
            },
        },
        Commands::Config { command } => match command {
            ConfigCommands::Show => config_cmd::cmd_config_show(&settings, &config).await,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_dedup_run() {
        let cli = Cli::try_parse_from([
            "truv",
            "dedup",
            "run",
            "vendors.csv",
            "--match",
            "name",
            "--match",
            "email",
            "--output-column",
            "name",
            "--filter",
            "city=Pune",
            "--threshold",
            "0.9",
        ])
        .unwrap();
        match cli.command {
            Commands::Dedup {
                command: DedupCommands::Run(args),
            } => {
                assert_eq!(args.match_columns, vec!["name", "email"]);
                assert_eq!(args.filters, vec![("city".to_string(), "Pune".to_string())]);
                assert_eq!(args.threshold, Some(0.9));
            }
            _ => panic!("expected dedup run"),
        }
    }

    #[test]
    fn test_parse_nav_sidebar_flags() {
        let cli = Cli::try_parse_from(["truv", "nav", "--collapse"]).unwrap();
        match cli.command {
            Commands::Nav {
                path,
                expand,
                collapse,
            } => {
                assert!(path.is_none());
                assert!(!expand);
                assert!(collapse);
            }
            _ => panic!("expected nav"),
        }
        assert!(Cli::try_parse_from(["truv", "nav", "--expand", "--collapse"]).is_err());
    }

    #[test]
    fn test_parse_history_defaults() {
        let cli = Cli::try_parse_from(["truv", "history", "--status", "failed"]).unwrap();
        match cli.command {
            Commands::History {
                status,
                sort_by,
                order,
                ..
            } => {
                assert_eq!(status, Some(HistoryStatus::Failed));
                assert_eq!(sort_by, SortBy::Date);
                assert_eq!(order, SortOrder::Desc);
            }
            _ => panic!("expected history"),
        }
    }
}
