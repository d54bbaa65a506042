//! Config command - show or change settings.json

use anyhow::{bail, Result};
use clap::Subcommand;
use colored::Colorize;
use localauth_core::config::{Config, StorageBackend, SETTINGS_FILE};

use super::get_app_dir;
use crate::output;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective settings (environment overrides applied)
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change persisted settings
    Set {
        /// Storage backend to use from now on
        #[arg(long)]
        storage: Option<StorageBackend>,
        /// Page `guard` redirects to when nobody is logged in
        #[arg(long)]
        login_page: Option<String>,
    },
}

pub fn run(command: ConfigCommands) -> Result<()> {
    let app_dir = get_app_dir()?;
    std::fs::create_dir_all(&app_dir)?;

    match command {
        ConfigCommands::Show { json } => {
            let config = Config::load(&app_dir)?;
            let settings_path = app_dir.join(SETTINGS_FILE);

            if json {
                return output::json(&serde_json::json!({
                    "storage": config.storage,
                    "loginPage": config.login_page,
                    "settingsPath": settings_path.to_string_lossy(),
                }));
            }

            println!("{}", "Settings".bold());
            println!("  Storage: {}", config.storage);
            println!("  Login page: {}", config.login_page);
            println!("  File: {}", settings_path.display());
        }
        ConfigCommands::Set {
            storage,
            login_page,
        } => {
            if storage.is_none() && login_page.is_none() {
                bail!("Nothing to change: pass --storage and/or --login-page");
            }

            // Environment overrides are per-run and must not end up on disk
            let mut config = Config::load_file(&app_dir)?;
            if let Some(storage) = storage {
                config.storage = storage;
            }
            if let Some(page) = login_page {
                config.login_page = page;
            }
            config.save(&app_dir)?;

            output::success(&format!(
                "Saved: storage = {}, login page = {}",
                config.storage, config.login_page
            ));
        }
    }

    Ok(())
}
