//! Session commands - login, logout, session, is-admin, guard

use anyhow::Result;
use colored::Colorize;
use dialoguer::Password;
use localauth_core::Session;

use super::{get_context, Reported, StoreOptions};
use crate::output;

fn print_session(session: &Session) {
    let mut table = output::create_table();
    let logged_in = session
        .logged_at_utc()
        .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| session.logged_at.clone());
    table.set_header(vec!["Email", "Name", "Role", "Logged in"]);
    table.add_row(vec![
        session.email.clone(),
        session.name.clone(),
        session.role.to_string(),
        logged_in,
    ]);
    println!("{}", table);
}

pub fn login(options: &StoreOptions, email: &str, password: Option<String>, json: bool) -> Result<()> {
    let cli = get_context(options)?;

    let password = match password {
        Some(p) => p,
        None => Password::new().with_prompt("Password").interact()?,
    };

    let result = cli.ctx.auth_service.login(email, &password)?;

    if json {
        output::json(&result)?;
    } else if let Some(session) = &result.data {
        println!(
            "{} Logged in as {} ({})",
            "✓".green(),
            session.name.as_str().bold(),
            session.role
        );
    } else {
        output::error(result.message().unwrap_or("Login failed"));
    }

    if !result.is_ok() {
        let message = result.message.unwrap_or_else(|| "Login failed".to_string());
        return Err(Reported(message).into());
    }
    Ok(())
}

pub fn logout(options: &StoreOptions, json: bool) -> Result<()> {
    let cli = get_context(options)?;
    cli.ctx.auth_service.logout()?;

    if json {
        output::json(&serde_json::json!({ "ok": true }))?;
    } else {
        output::success("Logged out");
    }
    Ok(())
}

pub fn show(options: &StoreOptions, json: bool) -> Result<()> {
    let cli = get_context(options)?;
    let session = cli.ctx.auth_service.get_session()?;

    if json {
        return output::json(&session);
    }

    match session {
        Some(session) => print_session(&session),
        None => output::warning("Not logged in"),
    }
    Ok(())
}

pub fn is_admin(options: &StoreOptions, json: bool) -> Result<()> {
    let cli = get_context(options)?;
    let admin = cli.ctx.auth_service.is_admin()?;

    if json {
        output::json(&serde_json::json!({ "admin": admin }))?;
    } else {
        println!("{}", admin);
    }
    Ok(())
}

/// Succeed with the session, or fail after printing the redirect target
pub fn guard(options: &StoreOptions, redirect_to: Option<&str>, json: bool) -> Result<()> {
    let cli = get_context(options)?;
    let session = cli.ctx.auth_service.require_auth(redirect_to)?;
    let redirect = cli.navigator.last_redirect();

    if json {
        output::json(&serde_json::json!({ "session": session, "redirect": redirect }))?;
    } else if let Some(session) = &session {
        output::success(&format!("Authenticated as {}", session.email));
    } else if let Some(target) = &redirect {
        output::warning(&format!("Not logged in. Redirect to: {}", target));
    }

    if session.is_none() {
        return Err(Reported("Not logged in".to_string()).into());
    }
    Ok(())
}
