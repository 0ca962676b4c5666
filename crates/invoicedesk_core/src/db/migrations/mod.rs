//! Numbered schema migrations for the invoice store.
//!
//! # Invariants
//! - Versions are strictly increasing and never renumbered once released.
//! - Pending migrations run in one transaction; `user_version` is bumped
//!   after each script inside it.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;
use std::time::Instant;

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "init",
        sql: include_str!("0001_init.sql"),
    },
    Migration {
        version: 2,
        name: "activity_invoice_link",
        sql: include_str!("0002_activity_invoice_link.sql"),
    },
];

/// What `apply_migrations` did to a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub from_version: u32,
    pub to_version: u32,
    /// Names of the scripts run, in order.
    pub applied: Vec<&'static str>,
}

impl MigrationReport {
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    MIGRATIONS
        .iter()
        .map(|migration| migration.version)
        .max()
        .unwrap_or(0)
}

/// Brings the store up to `latest_version()`.
///
/// # Errors
/// - `SchemaTooNew` when the store is ahead of this build.
/// - `Migration` naming the failing script; nothing from the batch is kept.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<MigrationReport> {
    let from_version = current_user_version(conn)?;
    let supported = latest_version();
    if from_version > supported {
        return Err(DbError::SchemaTooNew {
            found: from_version,
            supported,
        });
    }

    let mut report = MigrationReport {
        from_version,
        to_version: from_version,
        applied: Vec::new(),
    };
    let mut pending = MIGRATIONS
        .iter()
        .filter(|migration| migration.version > from_version)
        .peekable();
    if pending.peek().is_none() {
        return Ok(report);
    }

    let tx = conn.transaction()?;
    for migration in pending {
        let started_at = Instant::now();
        tx.execute_batch(migration.sql)
            .and_then(|()| tx.pragma_update(None, "user_version", migration.version))
            .map_err(|source| DbError::Migration {
                version: migration.version,
                name: migration.name,
                source,
            })?;
        debug!(
            "event=db_migrate_step module=db status=ok version={} name={} duration_ms={}",
            migration.version,
            migration.name,
            started_at.elapsed().as_millis()
        );
        report.to_version = migration.version;
        report.applied.push(migration.name);
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={} applied={}",
        report.from_version,
        report.to_version,
        report.applied.len()
    );
    Ok(report)
}

/// Schema version recorded on `conn`; `0` for a blank store.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}
