//! SQLite persistence layer.
//!
//! `FleetDb` owns one connection to the fleet database at
//! `~/.fleetmate/fleetmate.db`. Rows go in and out as the plain structs in
//! [`types`]; domain rules live in the service layers on top. Migrations run
//! on every open and WAL is always enabled.

use std::path::PathBuf;

use chrono::Utc;
use rusqlite::{params, Connection};

pub mod types;
pub use types::*;

pub mod actions;
pub mod finance;
pub mod jobs;
pub mod modules;
pub mod suggestions;

pub struct FleetDb {
    conn: Connection,
}

impl FleetDb {
    /// Borrow the underlying connection for ad-hoc queries.
    pub fn conn_ref(&self) -> &Connection {
        &self.conn
    }

    /// Execute a closure within a SQLite transaction.
    /// Commits on Ok, rolls back on Err.
    pub fn with_transaction<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Self) -> Result<T, DbError>,
    {
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        match f(self) {
            Ok(val) => {
                self.conn.execute_batch("COMMIT")?;
                Ok(val)
            }
            Err(e) => {
                let _ = self.conn.execute_batch("ROLLBACK");
                Err(e)
            }
        }
    }

    /// Open (or create) the database at the default path and apply the schema.
    pub fn open() -> Result<Self, DbError> {
        let path = Self::db_path()?;
        Self::open_at(path)
    }

    /// Resolve the default database path: `~/.fleetmate/fleetmate.db`.
    pub fn db_path() -> Result<PathBuf, DbError> {
        let home = dirs::home_dir().ok_or(DbError::HomeDirNotFound)?;
        Ok(home.join(".fleetmate").join("fleetmate.db"))
    }

    /// Open a database at an explicit path. Used by tests and the analysis
    /// worker, which keeps its own handle.
    pub(crate) fn open_at(path: PathBuf) -> Result<Self, DbError> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(DbError::CreateDir)?;
            }
        }

        let conn = Connection::open(&path)?;

        // WAL for concurrent reads while the worker writes.
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        crate::migrations::run_migrations(&conn).map_err(DbError::Migration)?;

        // FK enforcement goes on after migrations so schema rebuilds can
        // recreate tables freely.
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        Ok(Self { conn })
    }
}

// =============================================================================
// Shared test utilities
// =============================================================================


// =============================================================================
// Tests
// =============================================================================
