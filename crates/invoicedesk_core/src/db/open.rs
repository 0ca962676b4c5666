//! Connection bootstrap for the invoice store.
//!
//! # Invariants
//! - Returned connections enforce foreign keys.
//! - Returned connections are at `migrations::latest_version()`.

use super::migrations::{apply_migrations, MigrationReport};
use super::DbResult;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::Instant;

/// Opens (or creates) a file-backed store at `path`.
///
/// The dashboard runs on `open_db_in_memory`; this is for keeping a store
/// between runs.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_with("file", || Connection::open(path))
}

/// Opens a fresh private in-memory store.
///
/// # Side effects
/// - Emits `db_open` events with duration and migration count.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with("memory", Connection::open_in_memory)
}

fn open_with(
    mode: &'static str,
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();

    let result = connect()
        .map_err(Into::into)
        .and_then(|mut conn| prepare(&mut conn).map(|report| (conn, report)));

    match result {
        Ok((conn, report)) => {
            info!(
                "event=db_open module=db status=ok mode={mode} schema_version={} migrations_applied={} duration_ms={}",
                report.to_version,
                report.applied.len(),
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            );
            Err(err)
        }
    }
}

fn prepare(conn: &mut Connection) -> DbResult<MigrationReport> {
    conn.pragma_update(None, "foreign_keys", true)?;
    apply_migrations(conn)
}
