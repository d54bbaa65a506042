//! Users commands - list and manage the user directory

use anyhow::Result;
use clap::Subcommand;
use dialoguer::{Confirm, Password};
use localauth_core::{OperationResult, UserChanges};
use serde::Serialize;

use super::{get_context, Reported, StoreOptions};
use crate::output;

#[derive(Subcommand)]
pub enum UsersCommands {
    /// List all users
    List {
        /// Include plain-text passwords
        #[arg(long)]
        show_passwords: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a user
    Add {
        email: String,
        /// Password (prompted when omitted)
        #[arg(short, long)]
        password: Option<String>,
        /// Role: admin or user
        #[arg(long, default_value = "user")]
        role: String,
        /// Display name (defaults to the part of the email before '@')
        #[arg(long)]
        name: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change a user's password, role or name
    Update {
        email: String,
        #[arg(short, long)]
        password: Option<String>,
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        name: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a user (ends their session if they are logged in)
    Delete {
        email: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct UserRow<'a> {
    email: &'a str,
    name: &'a str,
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
}

/// Print the outcome of a write; a failed outcome becomes a [`Reported`] error
fn report(result: &OperationResult<()>, success_msg: &str, json: bool) -> Result<()> {
    let failure = (!result.is_ok()).then(|| result.message().unwrap_or("Operation failed"));

    if json {
        output::json(result)?;
    } else if let Some(message) = failure {
        output::error(message);
    } else {
        output::success(success_msg);
    }

    match failure {
        Some(message) => Err(Reported(message.to_string()).into()),
        None => Ok(()),
    }
}

pub fn run(options: &StoreOptions, command: UsersCommands) -> Result<()> {
    let cli = get_context(options)?;
    let auth = &cli.ctx.auth_service;

    match command {
        UsersCommands::List { show_passwords, json } => {
            let users = auth.get_users()?;
            let rows: Vec<UserRow> = users
                .iter()
                .map(|(email, user)| UserRow {
                    email,
                    name: &user.name,
                    role: user.role.as_str(),
                    password: show_passwords.then_some(user.password.as_str()),
                })
                .collect();

            if json {
                return output::json(&rows);
            }

            let mut table = output::create_table();
            let mut header = vec!["Email", "Name", "Role"];
            if show_passwords {
                header.push("Password");
            }
            table.set_header(header);
            for row in &rows {
                let mut cells = vec![row.email, row.name, row.role];
                if let Some(password) = row.password {
                    cells.push(password);
                }
                table.add_row(cells);
            }
            println!("{}", table);
            output::info(&format!("{} user(s) in {} storage", rows.len(), cli.ctx.config.storage));
            Ok(())
        }
        UsersCommands::Add {
            email,
            password,
            role,
            name,
            json,
        } => {
            let password = match password {
                Some(p) => p,
                None => Password::new()
                    .with_prompt("Password")
                    .with_confirmation("Repeat password", "Passwords do not match")
                    .interact()?,
            };
            let result = auth.add_user(&email, &password, Some(&role), name.as_deref())?;
            report(&result, &format!("Added {}", email), json)
        }
        UsersCommands::Update {
            email,
            password,
            role,
            name,
            json,
        } => {
            let changes = UserChanges {
                password,
                role,
                name,
            };
            let result = auth.update_user(&email, &changes)?;
            report(&result, &format!("Updated {}", email), json)
        }
        UsersCommands::Delete { email, force, json } => {
            if !force && !json {
                let confirmed = Confirm::new()
                    .with_prompt(format!("Delete user {}?", email))
                    .default(false)
                    .interact()?;
                if !confirmed {
                    println!("Cancelled.");
                    return Ok(());
                }
            }
            let result = auth.delete_user(&email)?;
            report(&result, &format!("Deleted {}", email), json)
        }
    }
}
