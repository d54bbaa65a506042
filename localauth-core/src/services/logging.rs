//! Event log - privacy-safe record of what the tools did, kept in DuckDB
//!
//! Entries carry an event name, the command that ran, the storage backend and
//! error text. Emails, names, passwords and session contents never go in.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use chrono::Utc;
use duckdb::Connection;
use serde::{Deserialize, Serialize};

use crate::log_migrations::LOG_MIGRATIONS;
use crate::services::MigrationService;

/// File name used inside the app directory
pub const LOG_DB_FILE: &str = "logs.duckdb";

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Millisecond timestamp in the high bits, a rolling sequence in the low 16
fn next_id(timestamp_ms: i64) -> u64 {
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed) & 0xFFFF;
    ((timestamp_ms as u64) << 16) | seq
}

fn platform() -> &'static str {
    match std::env::consts::OS {
        "macos" | "windows" | "linux" => std::env::consts::OS,
        _ => "unknown",
    }
}

/// Something worth recording
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogEvent {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
}

impl LogEvent {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            ..Self::default()
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Storage backend the command ran against
    pub fn with_storage(mut self, storage: impl Into<String>) -> Self {
        self.storage = Some(storage.into());
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn with_error_details(mut self, details: impl Into<String>) -> Self {
        self.error_details = Some(details.into());
        self
    }
}

/// A stored event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub timestamp: i64,
    pub entry_point: String,
    pub app_version: String,
    pub platform: String,
    pub event: String,
    pub command: Option<String>,
    pub storage: Option<String>,
    pub error_message: Option<String>,
    pub error_details: Option<String>,
}

impl LogEntry {
    fn from_row(row: &duckdb::Row) -> duckdb::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            timestamp: row.get(1)?,
            entry_point: row.get(2)?,
            app_version: row.get(3)?,
            platform: row.get(4)?,
            event: row.get(5)?,
            command: row.get(6)?,
            storage: row.get(7)?,
            error_message: row.get(8)?,
            error_details: row.get(9)?,
        })
    }
}

/// Totals for `logs stats`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LogStats {
    pub total: u64,
    pub errors: u64,
}

pub struct LoggingService {
    conn: Mutex<Connection>,
    db_path: PathBuf,
    entry_point: String,
    app_version: String,
}

impl LoggingService {
    /// Open or create `logs.duckdb` in `app_dir`
    ///
    /// `entry_point` names the front end writing the events, e.g. `cli`.
    pub fn new(
        app_dir: &Path,
        entry_point: impl Into<String>,
        app_version: impl Into<String>,
    ) -> Result<Self> {
        let db_path = app_dir.join(LOG_DB_FILE);
        let conn = Connection::open(&db_path)?;
        MigrationService::with_migrations(&conn, LOG_MIGRATIONS).run_pending()?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
            entry_point: entry_point.into(),
            app_version: app_version.into(),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))
    }

    pub fn log(&self, event: LogEvent) -> Result<()> {
        let now = Utc::now().timestamp_millis();
        self.lock()?.execute(
            "INSERT INTO sys_logs (
                id, timestamp, entry_point, app_version, platform,
                event, command, storage, error_message, error_details
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            duckdb::params![
                next_id(now),
                now,
                &self.entry_point,
                &self.app_version,
                platform(),
                &event.event,
                &event.command,
                &event.storage,
                &event.error_message,
                &event.error_details,
            ],
        )?;
        Ok(())
    }

    fn query(&self, filter: &str, limit: usize) -> Result<Vec<LogEntry>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT id, timestamp, entry_point, app_version, platform,
                    event, command, storage, error_message, error_details
             FROM sys_logs {} ORDER BY timestamp DESC, id DESC LIMIT ?",
            filter
        ))?;
        let entries = stmt
            .query_map([limit as i64], LogEntry::from_row)?
            .collect::<duckdb::Result<Vec<_>>>()?;
        Ok(entries)
    }

    /// Newest entries first
    pub fn get_recent(&self, limit: usize) -> Result<Vec<LogEntry>> {
        self.query("", limit)
    }

    /// Newest failures first
    pub fn get_errors(&self, limit: usize) -> Result<Vec<LogEntry>> {
        self.query("WHERE error_message IS NOT NULL", limit)
    }

    pub fn stats(&self) -> Result<LogStats> {
        let conn = self.lock()?;
        let (total, errors): (i64, i64) = conn.query_row(
            "SELECT COUNT(*), COUNT(error_message) FROM sys_logs",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(LogStats {
            total: total as u64,
            errors: errors as u64,
        })
    }

    /// Drop entries older than `timestamp_ms`; returns how many went
    pub fn delete_before(&self, timestamp_ms: i64) -> Result<u64> {
        let deleted = self
            .lock()?
            .execute("DELETE FROM sys_logs WHERE timestamp < ?", [timestamp_ms])?;
        Ok(deleted as u64)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}
