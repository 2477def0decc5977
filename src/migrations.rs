//! Embedded schema migrations.
//!
//! Migrations run automatically on every database open, in version order.
//! Before any pending migration is applied, the database file is backed up
//! next to itself so a bad upgrade never eats the only copy of the data.

use rusqlite::Connection;

struct Migration {
    version: i32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("migrations/001_baseline.sql"),
}];

/// Apply all pending migrations. Returns how many were applied.
pub fn run_migrations(conn: &Connection) -> Result<usize, String> {
    ensure_schema_version_table(conn)?;
    let current = current_version(conn)?;

    let latest = MIGRATIONS.iter().map(|m| m.version).max().unwrap_or(0);
    if current > latest {
        return Err(format!(
            "Database schema version ({current}) is newer than this version of Fleetmate supports ({latest}). Update the app before opening this database."
        ));
    }

    let pending: Vec<&Migration> = MIGRATIONS
        .iter()
        .filter(|m| m.version > current)
        .collect();
    if pending.is_empty() {
        return Ok(0);
    }

    backup_before_migration(conn)?;

    let mut applied = 0;
    for migration in pending {
        conn.execute_batch(migration.sql)
            .map_err(|e| format!("Migration v{} failed: {e}", migration.version))?;
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [migration.version],
        )
        .map_err(|e| format!("Failed to record migration v{}: {e}", migration.version))?;
        log::info!("Applied migration v{}", migration.version);
        applied += 1;
    }

    Ok(applied)
}

fn ensure_schema_version_table(conn: &Connection) -> Result<(), String> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
    )
    .map_err(|e| format!("Failed to create schema_version table: {e}"))
}

fn current_version(conn: &Connection) -> Result<i32, String> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .map_err(|e| format!("Failed to read schema version: {e}"))
}

/// Copy the database file aside before touching the schema. In-memory
/// databases have no file and are skipped.
fn backup_before_migration(conn: &Connection) -> Result<(), String> {
    let db_path: String = conn
        .query_row("PRAGMA database_list", [], |row| row.get(2))
        .map_err(|e| format!("Failed to resolve database path: {e}"))?;

    if db_path.is_empty() || db_path == ":memory:" {
        return Ok(());
    }

    let backup_path = format!("{db_path}.pre-migration.bak");
    let mut backup_conn = Connection::open(&backup_path)
        .map_err(|e| format!("Failed to open backup target: {e}"))?;
    let backup = rusqlite::backup::Backup::new(conn, &mut backup_conn)
        .map_err(|e| format!("Failed to start backup: {e}"))?;
    backup
        .step(-1)
        .map_err(|e| format!("Backup failed: {e}"))?;
    drop(backup);

    log::info!("Pre-migration backup written to {backup_path}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_temp_conn() -> (Connection, std::path::PathBuf) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("fleetmate.db");
        std::mem::forget(dir);
        let conn = Connection::open(&path).expect("open db");
        (conn, path)
    }

    #[test]
    fn test_fresh_db_applies_baseline() {
        let (conn, _) = open_temp_conn();
        let applied = run_migrations(&conn).expect("run migrations");
        assert_eq!(applied, MIGRATIONS.len());

        // Spot-check a few tables from the baseline.
        for table in ["jobs", "user_actions", "behavior_patterns", "suggestions"] {
            let count: i32 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [table],
                    |row| row.get(0),
                )
                .expect("query sqlite_master");
            assert_eq!(count, 1, "expected table {table} to exist");
        }
    }

    #[test]
    fn test_second_run_is_a_no_op() {
        let (conn, _) = open_temp_conn();
        run_migrations(&conn).expect("first run");
        let applied = run_migrations(&conn).expect("second run");
        assert_eq!(applied, 0);
    }

    #[test]
    fn test_newer_schema_version_is_rejected() {
        let (conn, _) = open_temp_conn();
        run_migrations(&conn).expect("run migrations");
        conn.execute("INSERT INTO schema_version (version) VALUES (999)", [])
            .expect("insert future version");

        let err = run_migrations(&conn).expect_err("should refuse newer schema");
        assert!(err.contains("newer than this version"));
    }

    #[test]
    fn test_backup_file_written_before_migrating() {
        let (conn, path) = open_temp_conn();
        run_migrations(&conn).expect("run migrations");

        let backup = std::path::PathBuf::from(format!("{}.pre-migration.bak", path.display()));
        assert!(backup.exists(), "expected {} to exist", backup.display());
    }
}
