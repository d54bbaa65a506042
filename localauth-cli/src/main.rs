//! localauth CLI - demo user directory and session store in your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{config, log_event, logs, session, users, Reported, StoreOptions};
use localauth_core::config::StorageBackend;
use localauth_core::{LogEvent, LoggingService};

/// localauth - demo-grade local login and user management
#[derive(Parser)]
#[command(name = "localauth", version, about, long_about = None)]
struct Cli {
    /// Storage backend (file, duckdb, memory); overrides settings.json
    #[arg(long, global = true)]
    storage: Option<StorageBackend>,

    /// Keep everything in memory for this run
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and start the session
    Login {
        email: String,
        /// Password (prompted when omitted)
        #[arg(short, long)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// End the active session
    Logout {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the active session
    Session {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print whether the active session is an admin
    IsAdmin {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Require a session; exits 1 with the redirect target when logged out
    Guard {
        /// Where to send unauthenticated callers
        #[arg(long)]
        redirect_to: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage users
    Users {
        #[command(subcommand)]
        command: users::UsersCommands,
    },

    /// Show or change settings
    Config {
        #[command(subcommand)]
        command: config::ConfigCommands,
    },

    /// View and manage the event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

impl Commands {
    /// Name recorded in the event log
    fn name(&self) -> &'static str {
        match self {
            Commands::Login { .. } => "login",
            Commands::Logout { .. } => "logout",
            Commands::Session { .. } => "session",
            Commands::IsAdmin { .. } => "is-admin",
            Commands::Guard { .. } => "guard",
            Commands::Users { command } => match command {
                users::UsersCommands::List { .. } => "users list",
                users::UsersCommands::Add { .. } => "users add",
                users::UsersCommands::Update { .. } => "users update",
                users::UsersCommands::Delete { .. } => "users delete",
            },
            Commands::Config { command } => match command {
                config::ConfigCommands::Show { .. } => "config show",
                config::ConfigCommands::Set { .. } => "config set",
            },
            Commands::Logs { .. } => "logs",
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOCALAUTH_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let command_name = cli.command.name();
    let logger = if matches!(cli.command, Commands::Logs { .. }) {
        None
    } else {
        commands::get_logger()
    };
    let storage = cli
        .storage
        .map(|s| s.as_str())
        .unwrap_or(if cli.ephemeral { "memory" } else { "configured" });
    log_event(
        &logger,
        LogEvent::new("command_executed")
            .with_command(command_name)
            .with_storage(storage),
    );

    finish(&logger, command_name, run(cli))
}

/// Record a failed command and turn the outcome into an exit code
fn finish(logger: &Option<LoggingService>, command_name: &str, result: Result<()>) -> ExitCode {
    let Err(e) = result else {
        return ExitCode::SUCCESS;
    };

    log_event(
        logger,
        LogEvent::new("command_failed")
            .with_command(command_name)
            .with_error(e.to_string())
            .with_error_details(format!("{:#}", e)),
    );
    if e.downcast_ref::<Reported>().is_none() {
        output::error(&format!("{:#}", e));
    }
    ExitCode::FAILURE
}

fn run(cli: Cli) -> Result<()> {
    let options = StoreOptions {
        storage: cli.storage,
        ephemeral: cli.ephemeral,
    };

    match cli.command {
        Commands::Login { email, password, json } => session::login(&options, &email, password, json),
        Commands::Logout { json } => session::logout(&options, json),
        Commands::Session { json } => session::show(&options, json),
        Commands::IsAdmin { json } => session::is_admin(&options, json),
        Commands::Guard { redirect_to, json } => {
            session::guard(&options, redirect_to.as_deref(), json)
        }
        Commands::Users { command } => users::run(&options, command),
        Commands::Config { command } => config::run(command),
        Commands::Logs { command } => logs::run(command),
    }
}
