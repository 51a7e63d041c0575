//! CondoGuard CLI
//!
//! Command-line interface for CondoGuard - resident access register.

use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use condoguard_core::{AccessLevel, Config, ResidentStore};

mod auth;
mod commands;
mod editor;
mod output;
mod tui;

use commands::resident::ResidentDetails;
use output::{Output, OutputFormat};

/// Environment variable that enables logging and sets its filter
const LOG_ENV: &str = "CONDOGUARD_LOG";

#[derive(Parser)]
#[command(name = "condoguard")]
#[command(about = "CondoGuard - Resident and service provider access register")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Admin password (or set CONDOGUARD_PASSWORD); omit for read-only access
    #[arg(long, global = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the TUI interface
    Tui,
    /// Manage residents
    Resident {
        #[command(subcommand)]
        command: ResidentCommands,
    },
    /// Generate a resident's authorization card (PDF)
    Card {
        /// Resident ID (e.g. 7, 007 or #007)
        id: String,
        /// Directory to write the PDF to
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Open the PDF after writing it
        #[arg(long)]
        open: bool,
    },
    /// Generate the periodic report (PDF)
    Report {
        /// Directory to write the PDF to
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Open the PDF after writing it
        #[arg(long)]
        open: bool,
    },
    /// Show register usage and access level
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum ResidentCommands {
    /// Register a new resident
    #[command(alias = "create")]
    Add {
        /// Resident name
        #[arg(long)]
        name: String,
        /// House or unit number
        #[arg(long)]
        house: String,
        #[command(flatten)]
        details: ResidentDetails,
        /// Also generate the authorization card
        #[arg(long)]
        card: bool,
    },
    /// Edit a resident
    Edit {
        /// Resident ID (e.g. 7, 007 or #007)
        id: String,
        /// Resident name
        #[arg(long)]
        name: Option<String>,
        /// House or unit number
        #[arg(long)]
        house: Option<String>,
        #[command(flatten)]
        details: ResidentDetails,
        /// Status (active or inactive)
        #[arg(long)]
        status: Option<String>,
    },
    /// List residents
    #[command(alias = "ls")]
    List {
        /// Filter by name or house number
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show resident details
    Show {
        /// Resident ID (e.g. 7, 007 or #007)
        id: String,
    },
    /// Delete a resident
    #[command(alias = "rm")]
    Delete {
        /// Resident ID (e.g. 7, 007 or #007)
        id: String,
    },
    /// Switch a resident between active and inactive
    Toggle {
        /// Resident ID (e.g. 7, 007 or #007)
        id: String,
    },
    /// Permanently remove all inactive residents
    Purge,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, output_dir, admin_password, capacity, ...)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands work on the file directly
    if let Some(Commands::Config { command }) = &cli.command {
        return handle_config_command(command.clone(), cli.config.as_ref(), &output);
    }

    let config =
        Config::load_with_cli_override(cli.config.as_ref()).context("Failed to load configuration")?;
    init_logging(&config);

    let password = auth::supplied_password(cli.password);
    let access = auth::resolve(&config, password.as_deref())?;
    let store = ResidentStore::open(&config);

    let Some(command) = cli.command else {
        return tui::run(store, config, access);
    };

    match command {
        Commands::Tui => tui::run(store, config, access),
        Commands::Resident { command } => {
            handle_resident_command(command, &store, &config, access, &output)
        }
        Commands::Card { id, out, open } => {
            auth::require_admin(access, "generating cards")?;
            commands::document::card(&store, &config, id, out, open, &output)
        }
        Commands::Report { out, open } => {
            auth::require_admin(access, "generating reports")?;
            commands::document::report(&store, &config, out, open, &output)
        }
        Commands::Status => commands::status::show(&store, &config, access, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_resident_command(
    command: ResidentCommands,
    store: &ResidentStore<condoguard_core::FileStore>,
    config: &Config,
    access: AccessLevel,
    output: &Output,
) -> Result<()> {
    match command {
        ResidentCommands::Add {
            name,
            house,
            details,
            card,
        } => {
            auth::require_admin(access, "adding residents")?;
            commands::resident::add(store, config, name, house, details, card, output)
        }
        ResidentCommands::Edit {
            id,
            name,
            house,
            details,
            status,
        } => {
            auth::require_admin(access, "editing residents")?;
            commands::resident::edit(store, id, name, house, details, status, output)
        }
        ResidentCommands::List { search } => commands::resident::list(store, search, output),
        ResidentCommands::Show { id } => commands::resident::show(store, id, output),
        ResidentCommands::Delete { id } => {
            auth::require_admin(access, "deleting residents")?;
            commands::resident::delete(store, id, output)
        }
        ResidentCommands::Toggle { id } => {
            auth::require_admin(access, "changing status")?;
            commands::resident::toggle(store, id, output)
        }
        ResidentCommands::Purge => {
            auth::require_admin(access, "purging residents")?;
            commands::resident::purge(store, output)
        }
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Initialize file-based logging
///
/// Only initializes if CONDOGUARD_LOG is set; its value is the filter
/// (e.g. `debug` or `condoguard_core=trace`). Logs go to `log_file` or
/// `{data_dir}/debug.log` so they never interleave with command output
/// or the TUI.
fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var(LOG_ENV) else {
        return;
    };

    let log_path = config.log_path();
    let log_file = match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    tracing::info!(path = ?log_path, "Logging initialized");
}
